//! Configuration parsing errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("missing section: [{0}]")]
    MissingSection(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("duplicate definition: {0}")]
    Duplicate(String),

    #[error("undeclared section: {0}")]
    Undeclared(String),

    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<confkit_core::Error> for ConfigError {
    fn from(err: confkit_core::Error) -> Self {
        use confkit_core::Error;

        match err {
            Error::UnknownLevel(token) => ConfigError::InvalidValue {
                field: "level".to_string(),
                message: format!("unknown level: {token}"),
            },
            Error::DuplicateName { category, name } => {
                ConfigError::Duplicate(format!("{category} '{name}'"))
            }
            Error::UnresolvedFormatter { handler, formatter } => ConfigError::InvalidReference(
                format!("handler '{handler}' references unknown formatter '{formatter}'"),
            ),
            Error::UnresolvedHandler { logger, handler } => ConfigError::InvalidReference(
                format!("logger '{logger}' references unknown handler '{handler}'"),
            ),
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
