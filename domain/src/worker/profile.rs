//! Worker profiles as stored in the worker registry.

use crate::core::ids::WorkerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Kind of external executor a worker wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    /// Claude Code CLI (`claude -p ... --output-format json`)
    #[default]
    Claude,
    /// Any command reading the prompt on stdin
    Generic,
}

impl ExecutorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutorKind::Claude => "claude",
            ExecutorKind::Generic => "generic",
        }
    }
}

impl std::fmt::Display for ExecutorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ExecutorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" => Ok(ExecutorKind::Claude),
            "generic" => Ok(ExecutorKind::Generic),
            other => Err(format!("unknown executor kind: {}", other)),
        }
    }
}

/// How to launch a worker's executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub kind: ExecutorKind,
    /// Launch command (required for `generic`, overrides `claude`)
    pub command: Option<String>,
    pub extra_args: Vec<String>,
    /// Extra environment for the child process (e.g. proxies)
    pub env: BTreeMap<String, String>,
    /// Upper bound for a single call, independent of the group timeout
    pub timeout_seconds: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            kind: ExecutorKind::default(),
            command: None,
            extra_args: Vec::new(),
            env: BTreeMap::new(),
            timeout_seconds: 300,
        }
    }
}

/// Registry record for a worker (Entity)
///
/// Each worker owns a workspace directory; its executor runs there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerProfile {
    pub id: WorkerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role_prompt: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub workspace_dir: PathBuf,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_max_output_tokens() -> u32 {
    2000
}

impl WorkerProfile {
    pub fn new(id: impl Into<WorkerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role_prompt: String::new(),
            skills: Vec::new(),
            workspace_dir: PathBuf::from("."),
            executor: ExecutorConfig::default(),
            max_output_tokens: default_max_output_tokens(),
        }
    }

    pub fn with_role_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.role_prompt = prompt.into();
        self
    }

    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = skills;
        self
    }

    pub fn with_workspace(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workspace_dir = dir.into();
        self
    }

    pub fn with_executor(mut self, executor: ExecutorConfig) -> Self {
        self.executor = executor;
        self
    }

    /// Name shown in transcripts, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }
}
