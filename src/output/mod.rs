//! Response projection subsystem.
//!
//! # Data Flow
//! ```text
//! ReceivedResponse (head + unread body)
//!     → projector.rs
//!         wire mode:       drain body → wire.rs → stdout + "\n"
//!         structured mode: drain or drop body → ProjectedResponse → JSON + "\n"
//! ```
//!
//! # Design Decisions
//! - Mode and field policy arrive as an explicit ProjectionConfig
//! - The body stream is consumed exactly once

pub mod projector;
pub mod wire;

pub use projector::{project, render, ProjectError, ProjectedResponse};

/// How the response is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Echo the response in HTTP/1.x wire format.
    #[default]
    Wire,
    /// One JSON record.
    Structured,
}

/// Field inclusion policy for the projector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectionConfig {
    pub mode: OutputMode,
    /// Leave the body out of structured output.
    pub omit_body: bool,
    /// Put the TLS summary into structured output.
    pub include_tls: bool,
}
