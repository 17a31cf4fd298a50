//! Hand-crafted HTTP/1.1 requests with declarative overrides.
//!
//! Reads a raw request, patches headers, query parameters and body from
//! command-line overrides, sends it once, and prints the response either as
//! wire text or as a JSON record.
//!
//! # Architecture Overview
//!
//! ```text
//!   override args ──▶ overrides ──┐
//!                                 ▼
//!   stdin / file ──▶ request::parser ──▶ request::materialize ──▶ dispatch ──▶ output ──▶ stdout
//!                                                                   │
//!                                                              net (TCP/TLS)
//!
//!   Cross-cutting: config (TOML defaults), observability (tracing → stderr), error
//! ```

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod net;
pub mod observability;
pub mod output;
pub mod overrides;
pub mod pipeline;
pub mod request;

pub use config::CraftConfig;
pub use error::CraftError;
pub use pipeline::{execute, RunSettings};
