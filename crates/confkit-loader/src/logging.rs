//! Logging document parsing.
//!
//! The document declares its names in three index sections (`[loggers]`,
//! `[handlers]`, `[formatters]`), then carries one body section per
//! declared name. Both directions are cross-checked: a declared name
//! without a body section and a body section without a declaration are
//! errors.

use confkit_core::Level;
use confkit_core::logging::{ArgValue, FormatterDecl, HandlerDecl, LoggerDecl, LoggingConfig};

use crate::ini::{Section, SectionDoc};
use crate::{ConfigError, ConfigResult};

/// Parse a logging topology document.
pub fn parse_logging(input: &str) -> ConfigResult<LoggingConfig> {
    let doc = SectionDoc::parse(input)?;
    if doc.sections.is_empty() {
        return Err(ConfigError::MissingSection("loggers".to_string()));
    }
    check_duplicate_sections(&doc)?;

    let logger_names = index_keys(&doc, "loggers")?;
    let handler_names = index_keys(&doc, "handlers")?;
    let formatter_names = index_keys(&doc, "formatters")?;

    check_declared(&doc, "logger", &logger_names)?;
    check_declared(&doc, "handler", &handler_names)?;
    check_declared(&doc, "formatter", &formatter_names)?;

    let config = LoggingConfig {
        formatters: formatter_names
            .iter()
            .map(|name| parse_formatter(&doc, name))
            .collect::<ConfigResult<Vec<_>>>()?,
        handlers: handler_names
            .iter()
            .map(|name| parse_handler(&doc, name))
            .collect::<ConfigResult<Vec<_>>>()?,
        loggers: logger_names
            .iter()
            .map(|name| parse_logger(&doc, name))
            .collect::<ConfigResult<Vec<_>>>()?,
    };

    config.ensure_unique_names()?;
    config.resolve()?;
    Ok(config)
}

/// Serialize a logging topology back to the section dialect.
///
/// Index sections first, then body sections, everything in declaration
/// order. `parse_logging(serialize_logging(c)) == c`.
pub fn serialize_logging(config: &LoggingConfig) -> String {
    let mut doc = SectionDoc::default();

    let mut index = Section::new("loggers");
    index.push("keys", join_names(config.loggers.iter().map(|l| l.name.as_str())));
    doc.push(index);

    let mut index = Section::new("handlers");
    index.push("keys", join_names(config.handlers.iter().map(|h| h.name.as_str())));
    doc.push(index);

    let mut index = Section::new("formatters");
    index.push("keys", join_names(config.formatters.iter().map(|f| f.name.as_str())));
    doc.push(index);

    for logger in &config.loggers {
        let mut section = Section::new(format!("logger_{}", logger.name));
        section.push("level", logger.level.to_string());
        section.push("handlers", join_names(logger.handlers.iter().map(String::as_str)));
        doc.push(section);
    }

    for handler in &config.handlers {
        let mut section = Section::new(format!("handler_{}", handler.name));
        section.push("class", handler.class.clone());
        section.push("level", handler.level.to_string());
        section.push("formatter", handler.formatter.clone());
        if !handler.args.is_empty() {
            section.push("args", render_args(&handler.args));
        }
        doc.push(section);
    }

    for formatter in &config.formatters {
        let mut section = Section::new(format!("formatter_{}", formatter.name));
        if let Some(class) = &formatter.class {
            section.push("class", class.clone());
        }
        section.push("format", formatter.format.clone());
        if let Some(datefmt) = &formatter.datefmt {
            section.push("datefmt", datefmt.clone());
        }
        doc.push(section);
    }

    doc.to_string()
}

fn check_duplicate_sections(doc: &SectionDoc) -> ConfigResult<()> {
    for (idx, section) in doc.sections.iter().enumerate() {
        if doc.sections[..idx].iter().any(|s| s.name == section.name) {
            return Err(ConfigError::Duplicate(format!("section '[{}]'", section.name)));
        }
    }
    Ok(())
}

fn index_keys(doc: &SectionDoc, index: &str) -> ConfigResult<Vec<String>> {
    let section = doc
        .section(index)
        .ok_or_else(|| ConfigError::MissingSection(index.to_string()))?;
    let keys = section
        .get("keys")
        .ok_or_else(|| ConfigError::MissingField(format!("keys in [{index}]")))?;
    Ok(split_names(keys))
}

/// Reject body sections whose name was never declared in the index.
fn check_declared(doc: &SectionDoc, category: &str, declared: &[String]) -> ConfigResult<()> {
    let prefix = format!("{category}_");
    for section in &doc.sections {
        if let Some(name) = section.name.strip_prefix(&prefix) {
            if !declared.iter().any(|d| d == name) {
                return Err(ConfigError::Undeclared(format!("{category} '{name}'")));
            }
        }
    }
    Ok(())
}

fn parse_formatter(doc: &SectionDoc, name: &str) -> ConfigResult<FormatterDecl> {
    let section = body_section(doc, "formatter", name)?;
    let format = section
        .get("format")
        .ok_or_else(|| ConfigError::MissingField(format!("format for formatter '{name}'")))?;
    Ok(FormatterDecl {
        name: name.to_string(),
        class: section.get("class").map(str::to_string),
        format: format.to_string(),
        // an empty datefmt value means the host default
        datefmt: section.get("datefmt").filter(|v| !v.is_empty()).map(str::to_string),
    })
}

fn parse_handler(doc: &SectionDoc, name: &str) -> ConfigResult<HandlerDecl> {
    let section = body_section(doc, "handler", name)?;
    let class = section
        .get("class")
        .ok_or_else(|| ConfigError::MissingField(format!("class for handler '{name}'")))?;
    let formatter = section
        .get("formatter")
        .ok_or_else(|| ConfigError::MissingField(format!("formatter for handler '{name}'")))?;
    let level = match section.get("level") {
        Some(value) => value.parse()?,
        None => Level::Notset,
    };
    let args = match section.get("args") {
        Some(raw) => parse_args(name, raw)?,
        None => Vec::new(),
    };
    Ok(HandlerDecl {
        name: name.to_string(),
        class: class.to_string(),
        level,
        formatter: formatter.to_string(),
        args,
    })
}

fn parse_logger(doc: &SectionDoc, name: &str) -> ConfigResult<LoggerDecl> {
    let section = body_section(doc, "logger", name)?;
    let level: Level = section
        .get("level")
        .ok_or_else(|| ConfigError::MissingField(format!("level for logger '{name}'")))?
        .parse()?;
    let handlers = section
        .get("handlers")
        .ok_or_else(|| ConfigError::MissingField(format!("handlers for logger '{name}'")))?;
    Ok(LoggerDecl {
        name: name.to_string(),
        level,
        handlers: split_names(handlers),
    })
}

fn body_section<'a>(doc: &'a SectionDoc, category: &str, name: &str) -> ConfigResult<&'a Section> {
    let section_name = format!("{category}_{name}");
    doc.section(&section_name)
        .ok_or(ConfigError::MissingSection(section_name))
}

fn split_names(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

/// Parse a parenthesized constructor-argument tuple.
fn parse_args(handler: &str, raw: &str) -> ConfigResult<Vec<ArgValue>> {
    let invalid = |message: String| ConfigError::InvalidValue {
        field: format!("args for handler '{handler}'"),
        message,
    };
    let inner = raw
        .trim()
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| invalid("expected a parenthesized tuple".to_string()))?;

    let mut args = Vec::new();
    for part in split_tuple(inner) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some(body) = strip_quotes(part, '"').or_else(|| strip_quotes(part, '\'')) {
            args.push(ArgValue::Str(body.to_string()));
        } else if part.starts_with('"') || part.starts_with('\'') {
            return Err(invalid(format!("unterminated string literal: {part}")));
        } else {
            args.push(ArgValue::Ident(part.to_string()));
        }
    }
    Ok(args)
}

/// Split tuple contents at commas outside string literals.
fn split_tuple(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    for (idx, ch) in inner.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch == ',' => {
                parts.push(&inner[start..idx]);
                start = idx + 1;
            }
            None => {}
        }
    }
    parts.push(&inner[start..]);
    parts
}

fn strip_quotes(part: &str, quote: char) -> Option<&str> {
    if part.len() >= 2 {
        part.strip_prefix(quote)?.strip_suffix(quote)
    } else {
        None
    }
}

fn render_args(args: &[ArgValue]) -> String {
    let body = args
        .iter()
        .map(|arg| match arg {
            ArgValue::Str(s) => format!("\"{s}\""),
            ArgValue::Ident(i) => i.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ");
    // one-tuples keep the dialect's trailing comma
    if args.len() == 1 {
        format!("({body},)")
    } else {
        format!("({body})")
    }
}
