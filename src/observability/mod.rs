//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields)
//!     → logging.rs subscriber (EnvFilter + fmt layer)
//!     → stderr (text or JSON lines)
//! ```
//!
//! # Design Decisions
//! - Structured fields over formatted strings
//! - stdout is reserved for the response

pub mod logging;

pub use logging::init_logging;
