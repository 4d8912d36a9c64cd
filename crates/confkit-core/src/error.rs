//! Error types for confkit models.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("unknown level: {0}")]
    UnknownLevel(String),

    #[error("duplicate {category} name: {name}")]
    DuplicateName { category: &'static str, name: String },

    #[error("handler '{handler}' references unknown formatter '{formatter}'")]
    UnresolvedFormatter { handler: String, formatter: String },

    #[error("logger '{logger}' references unknown handler '{handler}'")]
    UnresolvedHandler { logger: String, handler: String },
}

pub type Result<T> = std::result::Result<T, Error>;
