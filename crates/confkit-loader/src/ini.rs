//! Line-oriented reader for the keyed-section dialect.
//!
//! The dialect is the minimal one the logging document uses: `[name]`
//! headers, `key=value` entries, `#`/`;` comments. No interpolation and no
//! multi-line values.

use std::fmt;

use crate::{ConfigError, ConfigResult};

/// One `[name]` section with its entries in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub entries: Vec<(String, String)>,
    /// Line the header appeared on, for diagnostics.
    pub line: usize,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            line: 0,
        }
    }

    /// First value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }
}

/// A parsed section document, order preserving.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionDoc {
    pub sections: Vec<Section>,
}

impl SectionDoc {
    pub fn parse(input: &str) -> ConfigResult<Self> {
        let mut sections: Vec<Section> = Vec::new();

        for (idx, raw) in input.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(rest) = line.strip_prefix('[') {
                let Some(name) = rest.strip_suffix(']') else {
                    return Err(ConfigError::Syntax {
                        line: line_no,
                        message: "unterminated section header".to_string(),
                    });
                };
                let name = name.trim();
                if name.is_empty() {
                    return Err(ConfigError::Syntax {
                        line: line_no,
                        message: "empty section name".to_string(),
                    });
                }
                sections.push(Section {
                    name: name.to_string(),
                    entries: Vec::new(),
                    line: line_no,
                });
                continue;
            }
            let Some(section) = sections.last_mut() else {
                return Err(ConfigError::Syntax {
                    line: line_no,
                    message: "entry before first section header".to_string(),
                });
            };
            let Some((key, value)) = split_entry(line) else {
                return Err(ConfigError::Syntax {
                    line: line_no,
                    message: "expected key=value".to_string(),
                });
            };
            section.entries.push((key.to_string(), value.to_string()));
        }

        Ok(Self { sections })
    }

    /// Look up a section by name (first match).
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }
}

impl fmt::Display for SectionDoc {
    /// Canonical serialization: header, entries in order, one blank line
    /// between sections.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, section) in self.sections.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            writeln!(f, "[{}]", section.name)?;
            for (key, value) in &section.entries {
                writeln!(f, "{key}={value}")?;
            }
        }
        Ok(())
    }
}

/// Split an entry line at the earliest `=` or `:` separator.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let eq = line.find('=');
    let colon = line.find(':');
    let pos = match (eq, colon) {
        (Some(e), Some(c)) => e.min(c),
        (Some(e), None) => e,
        (None, Some(c)) => c,
        (None, None) => return None,
    };
    let key = line[..pos].trim();
    if key.is_empty() {
        return None;
    }
    Some((key, line[pos + 1..].trim()))
}
