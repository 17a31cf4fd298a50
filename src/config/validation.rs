//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referenced files exist
//! - Check the log level is a usable filter directive
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CraftConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use tracing_subscriber::EnvFilter;

use crate::config::schema::CraftConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `tls.ca_file`.
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &CraftConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(path) = &config.tls.ca_file {
        if !path.is_file() {
            errors.push(ValidationError {
                field: "tls.ca_file".to_string(),
                message: format!("no such file: {}", path.display()),
            });
        }
    }

    if let Err(e) = EnvFilter::try_new(&config.logging.level) {
        errors.push(ValidationError {
            field: "logging.level".to_string(),
            message: format!("invalid filter {:?}: {}", config.logging.level, e),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
