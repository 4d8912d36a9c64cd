//! Logging topology declarations.
//!
//! Mirrors the section document: formatters, handlers, and loggers wired
//! together by name. Declaration order is insertion order from the source
//! document and is preserved.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{Error, Level, Result};

/// A constructor argument in a handler declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgValue {
    /// A quoted string literal, e.g. a log file path.
    Str(String),
    /// A bare identifier resolved by the host runtime, e.g. `sys.stdout`.
    Ident(String),
}

/// A formatter declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatterDecl {
    pub name: String,
    /// Formatter class path, resolved by the host runtime.
    pub class: Option<String>,
    /// Record template string.
    pub format: String,
    /// Timestamp template, when the host default is not used.
    pub datefmt: Option<String>,
}

/// A handler declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerDecl {
    pub name: String,
    /// Handler class path, resolved by the host runtime.
    pub class: String,
    pub level: Level,
    /// Name of the formatter this handler renders records with.
    pub formatter: String,
    /// Constructor arguments passed to the handler class.
    pub args: Vec<ArgValue>,
}

/// A logger declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerDecl {
    pub name: String,
    pub level: Level,
    /// Names of the handlers this logger fans out to, in order.
    pub handlers: Vec<String>,
}

/// The full logging document model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub formatters: Vec<FormatterDecl>,
    pub handlers: Vec<HandlerDecl>,
    pub loggers: Vec<LoggerDecl>,
}

impl LoggingConfig {
    /// Look up a formatter by name.
    pub fn formatter(&self, name: &str) -> Option<&FormatterDecl> {
        self.formatters.iter().find(|f| f.name == name)
    }

    /// Look up a handler by name.
    pub fn handler(&self, name: &str) -> Option<&HandlerDecl> {
        self.handlers.iter().find(|h| h.name == name)
    }

    /// Look up a logger by name.
    pub fn logger(&self, name: &str) -> Option<&LoggerDecl> {
        self.loggers.iter().find(|l| l.name == name)
    }

    /// Check that names are unique within each category.
    pub fn ensure_unique_names(&self) -> Result<()> {
        ensure_unique("formatter", self.formatters.iter().map(|f| f.name.as_str()))?;
        ensure_unique("handler", self.handlers.iter().map(|h| h.name.as_str()))?;
        ensure_unique("logger", self.loggers.iter().map(|l| l.name.as_str()))?;
        Ok(())
    }

    /// Wire every name reference, failing on the first dangling one.
    ///
    /// Handlers no logger references still need a valid formatter.
    pub fn resolve(&self) -> Result<ResolvedTopology<'_>> {
        let mut loggers = Vec::with_capacity(self.loggers.len());
        for logger in &self.loggers {
            let mut handlers = Vec::with_capacity(logger.handlers.len());
            for handler_name in &logger.handlers {
                let handler = self.handler(handler_name).ok_or_else(|| Error::UnresolvedHandler {
                    logger: logger.name.clone(),
                    handler: handler_name.clone(),
                })?;
                handlers.push(self.wire_handler(handler)?);
            }
            loggers.push(WiredLogger { logger, handlers });
        }
        for handler in &self.handlers {
            self.wire_handler(handler)?;
        }
        Ok(ResolvedTopology { loggers })
    }

    fn wire_handler<'a>(&'a self, handler: &'a HandlerDecl) -> Result<WiredHandler<'a>> {
        let formatter =
            self.formatter(&handler.formatter)
                .ok_or_else(|| Error::UnresolvedFormatter {
                    handler: handler.name.clone(),
                    formatter: handler.formatter.clone(),
                })?;
        Ok(WiredHandler { handler, formatter })
    }
}

fn ensure_unique<'a>(
    category: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(Error::DuplicateName {
                category,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// A handler wired to its formatter.
#[derive(Debug, Clone)]
pub struct WiredHandler<'a> {
    pub handler: &'a HandlerDecl,
    pub formatter: &'a FormatterDecl,
}

/// A logger wired to its handlers, in declaration order.
#[derive(Debug, Clone)]
pub struct WiredLogger<'a> {
    pub logger: &'a LoggerDecl,
    pub handlers: Vec<WiredHandler<'a>>,
}

/// The fully wired view over a [`LoggingConfig`].
#[derive(Debug, Clone)]
pub struct ResolvedTopology<'a> {
    loggers: Vec<WiredLogger<'a>>,
}

impl<'a> ResolvedTopology<'a> {
    /// Look up a wired logger by name.
    pub fn logger(&self, name: &str) -> Option<&WiredLogger<'a>> {
        self.loggers.iter().find(|w| w.logger.name == name)
    }

    /// All wired loggers, in declaration order.
    pub fn loggers(&self) -> &[WiredLogger<'a>] {
        &self.loggers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LoggingConfig {
        LoggingConfig {
            formatters: vec![
                FormatterDecl {
                    name: "console".to_string(),
                    class: None,
                    format: "%(asctime)s %(levelname)s [-] %(message)s".to_string(),
                    datefmt: None,
                },
                FormatterDecl {
                    name: "verbose".to_string(),
                    class: Some("logfmt.VerboseFormatter".to_string()),
                    format: "%(asctime)s %(process)d %(levelname)s %(name)s %(message)s"
                        .to_string(),
                    datefmt: None,
                },
            ],
            handlers: vec![
                HandlerDecl {
                    name: "stdout".to_string(),
                    class: "StreamHandler".to_string(),
                    level: Level::Debug,
                    formatter: "console".to_string(),
                    args: vec![ArgValue::Ident("sys.stdout".to_string())],
                },
                HandlerDecl {
                    name: "file".to_string(),
                    class: "FileHandler".to_string(),
                    level: Level::Info,
                    formatter: "verbose".to_string(),
                    args: vec![ArgValue::Str("logs/service.log".to_string())],
                },
            ],
            loggers: vec![LoggerDecl {
                name: "root".to_string(),
                level: Level::Debug,
                handlers: vec!["stdout".to_string(), "file".to_string()],
            }],
        }
    }

    #[test]
    fn test_lookups_by_name() {
        let config = sample();
        assert!(config.formatter("console").is_some());
        assert!(config.handler("file").is_some());
        assert!(config.logger("root").is_some());
        assert!(config.formatter("nope").is_none());
    }

    #[test]
    fn test_resolve_wires_handlers_in_order() {
        let config = sample();
        let topology = config.resolve().unwrap();
        let root = topology.logger("root").unwrap();
        assert_eq!(root.handlers.len(), 2);
        assert_eq!(root.handlers[0].handler.name, "stdout");
        assert_eq!(root.handlers[0].formatter.name, "console");
        assert_eq!(root.handlers[1].formatter.name, "verbose");
    }

    #[test]
    fn test_resolve_rejects_unknown_handler() {
        let mut config = sample();
        config.loggers[0].handlers.push("syslog".to_string());
        let err = config.resolve().unwrap_err();
        assert_eq!(
            err,
            Error::UnresolvedHandler {
                logger: "root".to_string(),
                handler: "syslog".to_string(),
            }
        );
    }

    #[test]
    fn test_resolve_rejects_unknown_formatter() {
        let mut config = sample();
        config.handlers[1].formatter = "gelf".to_string();
        let err = config.resolve().unwrap_err();
        assert_eq!(
            err,
            Error::UnresolvedFormatter {
                handler: "file".to_string(),
                formatter: "gelf".to_string(),
            }
        );
    }

    #[test]
    fn test_unreferenced_handler_still_needs_formatter() {
        let mut config = sample();
        config.handlers.push(HandlerDecl {
            name: "audit".to_string(),
            class: "FileHandler".to_string(),
            level: Level::Audit,
            formatter: "missing".to_string(),
            args: Vec::new(),
        });
        // no logger references "audit", the dangling formatter still fails
        assert!(config.resolve().is_err());
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut config = sample();
        let dup = config.handlers[0].clone();
        config.handlers.push(dup);
        let err = config.ensure_unique_names().unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateName {
                category: "handler",
                name: "stdout".to_string(),
            }
        );
    }
}
