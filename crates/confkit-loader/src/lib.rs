//! Document parsing for confkit.
//!
//! This crate handles parsing, validation, and canonical serialization of:
//! - Logging topology documents (INI-style keyed sections)
//! - CI pipeline documents (YAML)
//! - Environment-assignment strings shared by both loaders

pub mod env;
pub mod error;
pub mod ini;
pub mod logging;
pub mod pipeline;

pub use error::{ConfigError, ConfigResult};
pub use logging::{parse_logging, serialize_logging};
pub use pipeline::{parse_pipeline, serialize_pipeline};
