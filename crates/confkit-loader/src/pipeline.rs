//! Pipeline document parsing.
//!
//! The raw serde structs mirror the YAML surface one field per top-level
//! key; parsing lowers them into the core model and validation runs on the
//! way down. Unknown top-level keys are rejected rather than dropped: a
//! typo'd phase name that silently disappears would still validate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use confkit_core::pipeline::{
    BranchFilter, CachePolicy, Matrix, MatrixEntry, Phase, PipelineConfig,
};

use crate::env::{parse_assignments, render_assignments};
use crate::{ConfigError, ConfigResult};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct RawPipeline {
    #[serde(skip_serializing_if = "Option::is_none")]
    sudo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branches: Option<RawBranches>,
    #[serde(skip_serializing_if = "Option::is_none")]
    env: Option<RawEnv>,
    #[serde(skip_serializing_if = "Option::is_none")]
    matrix: Option<RawMatrix>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    addons: BTreeMap<String, RawScalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    services: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    install: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    before_script: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    script: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    after_success: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    before_cache: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache: Option<RawCache>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct RawBranches {
    only: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct RawEnv {
    global: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct RawMatrix {
    include: Vec<RawMatrixEntry>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct RawMatrixEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    python: Option<RawScalar>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct RawCache {
    #[serde(skip_serializing_if = "Option::is_none")]
    pip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    directories: Option<Vec<String>>,
}

/// A scalar the document may spell as a string or a bare number
/// (`python: 2.7`). Normalized to its string form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Str(String),
    Num(f64),
}

impl RawScalar {
    fn into_string(self) -> String {
        match self {
            RawScalar::Str(s) => s,
            RawScalar::Num(n) => format!("{n}"),
        }
    }
}

/// Parse a CI pipeline document.
pub fn parse_pipeline(input: &str) -> ConfigResult<PipelineConfig> {
    let raw: RawPipeline = serde_yaml::from_str(input)?;

    for phase in Phase::ORDER {
        check_phase(phase, raw_phase(&raw, phase))?;
    }

    let mut global_env = Vec::new();
    if let Some(env) = &raw.env {
        for entry in &env.global {
            global_env.extend(parse_assignments(entry)?);
        }
    }

    let mut include = Vec::new();
    if let Some(matrix) = &raw.matrix {
        for (idx, entry) in matrix.include.iter().enumerate() {
            let env_str = entry.env.as_deref().ok_or_else(|| {
                ConfigError::MissingField(format!("env for matrix entry {}", idx + 1))
            })?;
            include.push(MatrixEntry {
                env: parse_assignments(env_str)?,
                python: entry.python.clone().map(RawScalar::into_string),
            });
        }
    }

    let cache = raw.cache.map(|c| {
        let directories = c.directories.unwrap_or_default();
        CachePolicy {
            pip: c.pip.unwrap_or(false),
            directories,
        }
    });
    if let Some(cache) = &cache {
        if cache.directories.iter().any(|d| d.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "cache.directories".to_string(),
                message: "blank directory path".to_string(),
            });
        }
    }

    Ok(PipelineConfig {
        sudo: raw.sudo,
        dist: raw.dist,
        language: raw.language,
        branches: raw.branches.map(|b| BranchFilter { only: b.only }),
        global_env,
        matrix: Matrix { include },
        addons: raw
            .addons
            .into_iter()
            .map(|(name, value)| (name, value.into_string()))
            .collect(),
        services: raw.services.unwrap_or_default(),
        install: raw.install.unwrap_or_default(),
        before_script: raw.before_script.unwrap_or_default(),
        script: raw.script.unwrap_or_default(),
        after_success: raw.after_success.unwrap_or_default(),
        before_cache: raw.before_cache.unwrap_or_default(),
        cache,
    })
}

/// Serialize a pipeline back to YAML in canonical key order.
///
/// `parse_pipeline(serialize_pipeline(c)?) == c`.
pub fn serialize_pipeline(config: &PipelineConfig) -> ConfigResult<String> {
    let raw = RawPipeline {
        sudo: config.sudo,
        dist: config.dist.clone(),
        language: config.language.clone(),
        branches: config.branches.as_ref().map(|b| RawBranches {
            only: b.only.clone(),
        }),
        env: if config.global_env.is_empty() {
            None
        } else {
            Some(RawEnv {
                global: config
                    .global_env
                    .iter()
                    .map(|var| render_assignments(std::slice::from_ref(var)))
                    .collect(),
            })
        },
        matrix: if config.matrix.include.is_empty() {
            None
        } else {
            Some(RawMatrix {
                include: config
                    .matrix
                    .include
                    .iter()
                    .map(|entry| RawMatrixEntry {
                        env: Some(render_assignments(&entry.env)),
                        python: entry.python.clone().map(RawScalar::Str),
                    })
                    .collect(),
            })
        },
        addons: config
            .addons
            .iter()
            .map(|(name, value)| (name.clone(), RawScalar::Str(value.clone())))
            .collect(),
        services: non_empty(&config.services),
        install: non_empty(&config.install),
        before_script: non_empty(&config.before_script),
        script: non_empty(&config.script),
        after_success: non_empty(&config.after_success),
        before_cache: non_empty(&config.before_cache),
        cache: config.cache.as_ref().map(|c| RawCache {
            pip: c.pip.then_some(true),
            directories: non_empty(&c.directories),
        }),
    };
    Ok(serde_yaml::to_string(&raw)?)
}

fn raw_phase<'a>(raw: &'a RawPipeline, phase: Phase) -> Option<&'a Vec<String>> {
    match phase {
        Phase::Install => raw.install.as_ref(),
        Phase::BeforeScript => raw.before_script.as_ref(),
        Phase::Script => raw.script.as_ref(),
        Phase::AfterSuccess => raw.after_success.as_ref(),
        Phase::BeforeCache => raw.before_cache.as_ref(),
    }
}

/// A present phase list must be a non-empty sequence of non-blank commands.
fn check_phase(phase: Phase, commands: Option<&Vec<String>>) -> ConfigResult<()> {
    let Some(commands) = commands else {
        return Ok(());
    };
    if commands.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: phase.as_key().to_string(),
            message: "phase command list is empty".to_string(),
        });
    }
    if commands.iter().any(|c| c.trim().is_empty()) {
        return Err(ConfigError::InvalidValue {
            field: phase.as_key().to_string(),
            message: "blank command".to_string(),
        });
    }
    Ok(())
}

fn non_empty(list: &[String]) -> Option<Vec<String>> {
    if list.is_empty() {
        None
    } else {
        Some(list.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confkit_core::pipeline::EnvVar;

    const SAMPLE: &str = r#"sudo: false
dist: trusty
language: python
branches:
  only:
    - master
    - /^v[0-9]+\.[0-9]+$/
env:
  global:
    - CACHE_DIR=/tmp/cache
    - PYLINT_CONCURRENCY=2
matrix:
  include:
    - env: TASK="ci-checks ci-packs-tests"
      python: 2.7
    - env: TASK=ci-unit
      python: "3.6"
addons:
  postgresql: "9.4"
services:
  - mongodb
  - rabbitmq
install:
  - pip install --upgrade pip
  - make requirements
before_script:
  - mkdir -p ~/.service
script:
  - make $TASK
after_success:
  - coveralls
cache:
  pip: true
  directories:
    - ~/.cache/pip
    - node_modules
before_cache:
  - rm -f ~/.cache/pip/log/debug.log
"#;

    #[test]
    fn test_parse_full_document() {
        let config = parse_pipeline(SAMPLE).unwrap();
        assert_eq!(config.sudo, Some(false));
        assert_eq!(config.dist.as_deref(), Some("trusty"));
        assert_eq!(config.language.as_deref(), Some("python"));
        assert_eq!(
            config.branches.as_ref().unwrap().only,
            ["master", r"/^v[0-9]+\.[0-9]+$/"]
        );
        assert_eq!(
            config.global_env,
            vec![
                EnvVar::new("CACHE_DIR", "/tmp/cache"),
                EnvVar::new("PYLINT_CONCURRENCY", "2"),
            ]
        );
        assert_eq!(config.services, ["mongodb", "rabbitmq"]);
        assert_eq!(config.addons.get("postgresql").map(String::as_str), Some("9.4"));
        assert_eq!(
            config.commands(Phase::Install),
            ["pip install --upgrade pip".to_string(), "make requirements".to_string()]
        );
        let cache = config.cache.as_ref().unwrap();
        assert!(cache.pip);
        assert_eq!(cache.directories, ["~/.cache/pip", "node_modules"]);
    }

    #[test]
    fn test_matrix_entries() {
        let config = parse_pipeline(SAMPLE).unwrap();
        assert_eq!(config.matrix.include.len(), 2);
        assert_eq!(
            config.matrix.include[0].env,
            vec![EnvVar::new("TASK", "ci-checks ci-packs-tests")]
        );
        // a bare YAML number normalizes to its string form
        assert_eq!(config.matrix.include[0].python.as_deref(), Some("2.7"));
        assert_eq!(config.matrix.include[1].python.as_deref(), Some("3.6"));
    }

    #[test]
    fn test_round_trip() {
        let config = parse_pipeline(SAMPLE).unwrap();
        let serialized = serialize_pipeline(&config).unwrap();
        let reparsed = parse_pipeline(&serialized).unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn test_matrix_entry_without_env_is_rejected() {
        let source = "matrix:\n  include:\n    - python: \"3.6\"\n";
        let err = parse_pipeline(source).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(field) if field.contains("matrix entry 1")));
    }

    #[test]
    fn test_matrix_entry_with_empty_env_is_rejected() {
        let source = "matrix:\n  include:\n    - env: \"\"\n";
        let err = parse_pipeline(source).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_present_empty_phase_is_rejected() {
        let err = parse_pipeline("install: []\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { field, .. } if field == "install"
        ));
    }

    #[test]
    fn test_blank_command_is_rejected() {
        let err = parse_pipeline("script:\n  - make test\n  - \"  \"\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { field, .. } if field == "script"
        ));
    }

    #[test]
    fn test_unknown_top_level_key_is_rejected() {
        let err = parse_pipeline("scrpit:\n  - make test\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_multi_assignment_global_entry_is_flattened() {
        let source = "env:\n  global:\n    - A=1 B=2\n";
        let config = parse_pipeline(source).unwrap();
        assert_eq!(
            config.global_env,
            vec![EnvVar::new("A", "1"), EnvVar::new("B", "2")]
        );
        // canonical form re-emits one assignment per item, model unchanged
        let reparsed = parse_pipeline(&serialize_pipeline(&config).unwrap()).unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn test_blank_cache_directory_is_rejected() {
        let source = "cache:\n  directories:\n    - \"\"\n";
        let err = parse_pipeline(source).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { field, .. } if field == "cache.directories"
        ));
    }

    #[test]
    fn test_empty_document_parses_to_default() {
        let config = parse_pipeline("{}\n").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }
}
