//! Raw request handling.
//!
//! # Data Flow
//! ```text
//! stdin / file
//!     → source.rs (read the whole input)
//!     → parser.rs (HTTP/1.x head + framed body → RawRequest)
//!     → materialize.rs (+ OverrideSet, scheme, body substitute → ResolvedRequest)
//!         → query.rs (query override merge)
//!     → dispatch
//! ```
//!
//! # Design Decisions
//! - Malformed input never yields a RawRequest
//! - The target is always treated as path + query; scheme and host are recombined
//! - The replacement body discards the original body and its framing

pub mod materialize;
pub mod parser;
pub mod query;
pub mod source;

pub use materialize::{materialize, BodySubstitute, MaterializeError, ResolvedRequest};
pub use parser::{parse_request, ParseError, RawRequest};
pub use source::InputSource;
