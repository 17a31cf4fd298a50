//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CraftConfig (validated, immutable)
//!     → cli.rs merges command-line flags on top → RunSettings
//! ```
//!
//! # Design Decisions
//! - All fields have defaults, so an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks
//! - Command-line flags always win over the file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{CraftConfig, LogFormat, LoggingConfig, OutputConfig, RequestConfig, TlsConfig};
