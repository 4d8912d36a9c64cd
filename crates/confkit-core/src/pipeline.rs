//! CI pipeline document model.
//!
//! Matrix entries are independent parameterized runs; phase ordering is
//! fixed and enforced by the external runner, the model only records it.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One environment-variable assignment.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[display("{name}={value}")]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Branch filter for pipeline activation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchFilter {
    /// Branch names or `/regex/` patterns, in declaration order.
    pub only: Vec<String>,
}

/// One independent parameterized run of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixEntry {
    /// Entry-specific environment, never empty.
    pub env: Vec<EnvVar>,
    /// Interpreter version provisioned for this entry.
    pub python: Option<String>,
}

/// The build matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    pub include: Vec<MatrixEntry>,
}

/// The fixed pipeline phases, in the order the external runner executes
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Install,
    BeforeScript,
    Script,
    AfterSuccess,
    BeforeCache,
}

impl Phase {
    pub const ORDER: [Phase; 5] = [
        Phase::Install,
        Phase::BeforeScript,
        Phase::Script,
        Phase::AfterSuccess,
        Phase::BeforeCache,
    ];

    /// The document key for this phase.
    pub const fn as_key(self) -> &'static str {
        match self {
            Phase::Install => "install",
            Phase::BeforeScript => "before_script",
            Phase::Script => "script",
            Phase::AfterSuccess => "after_success",
            Phase::BeforeCache => "before_cache",
        }
    }
}

/// Cache policy for dependency directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicy {
    /// Package-manager cache flag.
    pub pip: bool,
    /// Cacheable directory paths.
    pub directories: Vec<String>,
}

/// The full pipeline document model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub sudo: Option<bool>,
    pub dist: Option<String>,
    pub language: Option<String>,
    pub branches: Option<BranchFilter>,
    /// Environment shared by every matrix entry.
    pub global_env: Vec<EnvVar>,
    pub matrix: Matrix,
    /// Addon name to requested version.
    pub addons: BTreeMap<String, String>,
    /// Services the runner provisions before any phase.
    pub services: Vec<String>,
    pub install: Vec<String>,
    pub before_script: Vec<String>,
    pub script: Vec<String>,
    pub after_success: Vec<String>,
    pub before_cache: Vec<String>,
    pub cache: Option<CachePolicy>,
}

impl PipelineConfig {
    /// Command list for a phase, in declaration order.
    pub fn commands(&self, phase: Phase) -> &[String] {
        match phase {
            Phase::Install => &self.install,
            Phase::BeforeScript => &self.before_script,
            Phase::Script => &self.script,
            Phase::AfterSuccess => &self.after_success,
            Phase::BeforeCache => &self.before_cache,
        }
    }

    /// Expand the build matrix into concrete job plans.
    ///
    /// Each entry's environment is merged over the global environment; the
    /// entry wins on a name collision. Entries stay independent of each
    /// other.
    pub fn jobs(&self) -> Vec<JobPlan> {
        self.matrix
            .include
            .iter()
            .enumerate()
            .map(|(index, entry)| JobPlan {
                index: index + 1,
                env: merge_env(&self.global_env, &entry.env),
                python: entry.python.clone(),
            })
            .collect()
    }
}

fn merge_env(global: &[EnvVar], entry: &[EnvVar]) -> Vec<EnvVar> {
    let mut merged: Vec<EnvVar> = global.to_vec();
    for var in entry {
        match merged.iter_mut().find(|m| m.name == var.name) {
            Some(existing) => existing.value = var.value.clone(),
            None => merged.push(var.clone()),
        }
    }
    merged
}

/// One expanded build-matrix job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPlan {
    /// 1-based position in the matrix.
    pub index: usize,
    /// Effective environment for this job.
    pub env: Vec<EnvVar>,
    pub python: Option<String>,
}

impl JobPlan {
    /// Short one-line name, e.g. `#1 python=2.7 TASK=ci-unit`.
    pub fn display_name(&self) -> String {
        let mut parts = vec![format!("#{}", self.index)];
        if let Some(python) = &self.python {
            parts.push(format!("python={python}"));
        }
        parts.extend(self.env.iter().map(ToString::to_string));
        parts.join(" ")
    }
}
