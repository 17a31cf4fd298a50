//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ResolvedRequest (scheme, host, port)
//!     → connector.rs (TCP connect)
//!     → tls.rs (optional TLS handshake, session summary)
//!     → Hand off to dispatch (HTTP/1 exchange)
//! ```
//!
//! # Design Decisions
//! - One connection per run; nothing is pooled or reused
//! - TLS is negotiated with rustls, ALPN pinned to http/1.1

pub mod connector;
pub mod tls;

pub use connector::{connect_plain, connect_tls, ConnectError};
pub use tls::{build_client_config, TlsSummary};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Protocol used to reach the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            other => Err(format!("unsupported scheme '{}' (expected http or https)", other)),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
