//! Core document models for confkit.
//!
//! This crate contains:
//! - Severity levels for the logging dialect
//! - Logging topology declarations and reference resolution
//! - CI pipeline document model and build-matrix expansion

pub mod error;
pub mod level;
pub mod logging;
pub mod pipeline;

pub use error::{Error, Result};
pub use level::Level;
