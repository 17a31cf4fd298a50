//! Header and query overrides supplied on the command line.
//!
//! # Data Flow
//! ```text
//! positional arguments ("X-Test: v", "page? 2")
//!     → parser.rs (one argument → Override)
//!     → OverrideSet (headers + queries, last write wins)
//!     → request::materialize
//! ```
//!
//! # Design Decisions
//! - The kind of an override is decided by the last character of its first word
//! - Values are split off once, so they may contain ':' and '?' freely
//! - No escaping

pub mod parser;

pub use parser::{parse_override, Override, OverrideError, OverrideSet};
