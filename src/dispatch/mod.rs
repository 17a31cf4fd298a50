//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! ResolvedRequest
//!     → client.rs (log resolved request, connect, HTTP/1 handshake)
//!     → net::connector (TCP, optional TLS + summary)
//!     → hyper send_request
//!     → response.rs (ReceivedResponse: head + unread body stream)
//!     → output (projection)
//! ```
//!
//! # Design Decisions
//! - Single outbound attempt: no retry, no redirects, transport default timeouts
//! - The body stream is handed over unread; the projector decides to drain or drop it

pub mod client;
pub mod response;

pub use client::{DispatchError, Dispatcher, DispatchOptions};
pub use response::ReceivedResponse;
