//! Environment-assignment strings.
//!
//! Matrix and global env entries in the pipeline document are shell-style
//! assignment lists, e.g. `TASK="ci-unit" NODE=4.2`.

use regex::Regex;
use std::sync::LazyLock;

use confkit_core::pipeline::EnvVar;

use crate::{ConfigError, ConfigResult};

// One assignment anchored at the start of the remaining input: a name,
// `=`, then a double-quoted, single-quoted, or bare value.
static ASSIGN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([A-Za-z_][A-Za-z0-9_]*)=(?:"([^"]*)"|'([^']*)'|(\S*))"#).unwrap()
});

/// Parse an assignment list into individual variables.
///
/// Rejects empty input and any token that is not a `NAME=value`
/// assignment.
pub fn parse_assignments(input: &str) -> ConfigResult<Vec<EnvVar>> {
    let mut rest = input.trim();
    if rest.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "env".to_string(),
            message: "empty assignment list".to_string(),
        });
    }

    let mut vars = Vec::new();
    while !rest.is_empty() {
        let caps = ASSIGN_REGEX
            .captures(rest)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "env".to_string(),
                message: format!("expected NAME=value at '{rest}'"),
            })?;
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str())
            .unwrap_or("");
        vars.push(EnvVar::new(&caps[1], value));
        rest = rest[caps[0].len()..].trim_start();
    }
    Ok(vars)
}

/// Render variables back to the canonical assignment-list form.
///
/// Values containing whitespace (or nothing at all) are double-quoted.
/// Round-trip stable through [`parse_assignments`].
pub fn render_assignments(vars: &[EnvVar]) -> String {
    vars.iter()
        .map(|var| {
            if var.value.is_empty() || var.value.chars().any(char::is_whitespace) {
                format!("{}=\"{}\"", var.name, var.value)
            } else {
                var.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_assignment() {
        let vars = parse_assignments("TASK=ci-unit").unwrap();
        assert_eq!(vars, vec![EnvVar::new("TASK", "ci-unit")]);
    }

    #[test]
    fn test_multiple_assignments() {
        let vars = parse_assignments("TASK=ci-unit NODE=4.2").unwrap();
        assert_eq!(
            vars,
            vec![EnvVar::new("TASK", "ci-unit"), EnvVar::new("NODE", "4.2")]
        );
    }

    #[test]
    fn test_quoted_values() {
        let vars = parse_assignments(r#"TASK="ci unit" MODE='a b'"#).unwrap();
        assert_eq!(
            vars,
            vec![EnvVar::new("TASK", "ci unit"), EnvVar::new("MODE", "a b")]
        );
    }

    #[test]
    fn test_empty_quoted_value() {
        let vars = parse_assignments(r#"EMPTY="""#).unwrap();
        assert_eq!(vars, vec![EnvVar::new("EMPTY", "")]);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(parse_assignments("   ").is_err());
    }

    #[test]
    fn test_bare_word_is_rejected() {
        let err = parse_assignments("TASK=ok notanassignment").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_render_quotes_whitespace() {
        let rendered = render_assignments(&[
            EnvVar::new("A", "plain"),
            EnvVar::new("B", "two words"),
            EnvVar::new("C", ""),
        ]);
        assert_eq!(rendered, r#"A=plain B="two words" C="""#);
    }

    #[test]
    fn test_render_parse_round_trip() {
        let vars = vec![
            EnvVar::new("TASK", "ci-unit"),
            EnvVar::new("FLAGS", "-v --fast"),
        ];
        assert_eq!(parse_assignments(&render_assignments(&vars)).unwrap(), vars);
    }
}
