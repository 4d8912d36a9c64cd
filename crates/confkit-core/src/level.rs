//! Severity levels for the logging dialect.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Severity of a logger or handler.
///
/// Ordered from least to most severe. `Audit` is part of the observed
/// dialect and sits between `Info` and `Warning`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize,
    Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    #[default]
    #[display("NOTSET")]
    Notset,
    #[display("DEBUG")]
    Debug,
    #[display("INFO")]
    Info,
    #[display("AUDIT")]
    Audit,
    #[display("WARNING")]
    Warning,
    #[display("ERROR")]
    Error,
    #[display("CRITICAL")]
    Critical,
}

impl std::str::FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NOTSET" => Ok(Level::Notset),
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "AUDIT" => Ok(Level::Audit),
            "WARNING" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            "CRITICAL" => Ok(Level::Critical),
            _ => Err(Error::UnknownLevel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_spelling() {
        assert_eq!("DEBUG".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("AUDIT".parse::<Level>().unwrap(), Level::Audit);
        assert_eq!("CRITICAL".parse::<Level>().unwrap(), Level::Critical);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("debug".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("Warning".parse::<Level>().unwrap(), Level::Warning);
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let err = "TRACE".parse::<Level>().unwrap_err();
        assert_eq!(err, Error::UnknownLevel("TRACE".to_string()));
    }

    #[test]
    fn test_display_round_trips() {
        for level in [
            Level::Notset,
            Level::Debug,
            Level::Info,
            Level::Audit,
            Level::Warning,
            Level::Error,
            Level::Critical,
        ] {
            assert_eq!(level.to_string().parse::<Level>().unwrap(), level);
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Audit);
        assert!(Level::Audit < Level::Warning);
        assert!(Level::Error < Level::Critical);
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let json = serde_json::to_string(&Level::Audit).unwrap();
        assert_eq!(json, "\"AUDIT\"");
        let back: Level = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Level::Audit);
    }
}
