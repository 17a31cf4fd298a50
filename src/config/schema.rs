//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::net::Scheme;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct CraftConfig {
    /// Request defaults.
    pub request: RequestConfig,

    /// Output defaults.
    pub output: OutputConfig,

    /// TLS trust settings.
    pub tls: TlsConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Request defaults.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RequestConfig {
    /// Scheme used when `-p` is not given.
    pub scheme: Scheme,
}

/// Output defaults. Each flag can still be switched on from the command line.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Emit a JSON record instead of the wire echo.
    pub json: bool,

    /// Include the TLS session summary (JSON only).
    pub tls_info: bool,

    /// Leave the body out (JSON only).
    pub omit_body: bool,
}

/// TLS trust configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct TlsConfig {
    /// PEM bundle of additional trusted roots.
    pub ca_file: Option<PathBuf>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when RUST_LOG is unset.
    pub level: String,

    /// Text or JSON lines on stderr.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}
