//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Route every event to stderr; stdout carries only the response
//! - Raise this crate to debug in verbose mode
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON lines or human-readable text, chosen in the config file
//! - RUST_LOG, when set, replaces the configured level; verbose mode still
//!   raises this crate on top of it

use tracing_subscriber::filter::Directive;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

const VERBOSE_DIRECTIVE: &str = "wirecraft=debug";

/// Filter directives used when RUST_LOG is unset.
pub fn default_directives(config: &LoggingConfig, verbose: bool) -> String {
    if verbose {
        format!("{},{}", config.level, VERBOSE_DIRECTIVE)
    } else {
        config.level.clone()
    }
}

/// Install the global subscriber.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<(), TryInitError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => with_verbose(filter, verbose),
        Err(_) => EnvFilter::new(default_directives(config, verbose)),
    };

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
}

/// Add the crate's debug directive to an externally supplied filter.
fn with_verbose(filter: EnvFilter, verbose: bool) -> EnvFilter {
    if !verbose {
        return filter;
    }
    match VERBOSE_DIRECTIVE.parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}
