//! Top-level error taxonomy.
//!
//! Every failure is fatal: the binary prints the message on one line and
//! exits with status 1.

use thiserror::Error;

use crate::config::ConfigError;
use crate::dispatch::DispatchError;
use crate::output::ProjectError;
use crate::overrides::OverrideError;
use crate::request::{MaterializeError, ParseError};

/// Any fatal condition of a run.
#[derive(Debug, Error)]
pub enum CraftError {
    /// Malformed override argument.
    #[error(transparent)]
    Override(#[from] OverrideError),

    /// The request source could not be read.
    #[error("could not read request from {source_name}: {source}")]
    Input {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    /// The input is not a valid HTTP request.
    #[error("could not parse http request: {0}")]
    Parse(#[from] ParseError),

    /// Overrides or body substitute could not be applied (includes base64 failures).
    #[error(transparent)]
    Materialize(#[from] MaterializeError),

    /// DNS, connect, TLS, write or response errors.
    #[error("could not make request: {0}")]
    Transport(#[from] DispatchError),

    /// Reading the body, JSON encoding or writing stdout failed.
    #[error(transparent)]
    Output(#[from] ProjectError),

    #[error("could not load config: {0}")]
    Config(#[from] ConfigError),

    #[error("could not build TLS configuration: {0}")]
    Tls(#[source] std::io::Error),
}

pub type CraftResult<T> = Result<T, CraftError>;
