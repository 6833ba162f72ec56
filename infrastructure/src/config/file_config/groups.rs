//! `[[groups]]` section.

use huddle_domain::{DomainError, Group, GroupConfig, Member, MemberKind, WorkerId};
use serde::{Deserialize, Serialize};

/// Kind of a configured group member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileMemberKind {
    Human,
    #[default]
    Worker,
}

/// A member entry of a group
///
/// ```toml
/// [[groups.members]]
/// id = "alice"
/// kind = "human"
///
/// [[groups.members]]
/// id = "reviewer"
/// worker = "bot2"   # defaults to `id`
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMemberConfig {
    pub id: String,
    pub name: Option<String>,
    pub kind: FileMemberKind,
    /// Registry worker backing this member
    pub worker: Option<String>,
}

impl FileMemberConfig {
    pub fn worker_id(&self) -> Option<WorkerId> {
        match self.kind {
            FileMemberKind::Human => None,
            FileMemberKind::Worker => {
                Some(WorkerId::new(self.worker.clone().unwrap_or_else(|| self.id.clone())))
            }
        }
    }

    fn to_member(&self, worker_name: impl Fn(&WorkerId) -> Option<String>) -> Member {
        match self.worker_id() {
            None => Member::human(self.id.clone(), self.name.clone().unwrap_or_default()),
            Some(worker_id) => {
                let name = self
                    .name
                    .clone()
                    .or_else(|| worker_name(&worker_id))
                    .unwrap_or_default();
                Member {
                    id: self.id.clone().into(),
                    display_name: name,
                    kind: MemberKind::Worker { worker_id },
                }
            }
        }
    }
}

/// Per-group overrides of the `[defaults]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGroupOverrides {
    pub max_responders: Option<usize>,
    pub turn_timeout_seconds: Option<u64>,
    pub chain_depth_limit: Option<u32>,
    pub re_invoke_already_replied: Option<bool>,
    pub supervisor: Option<String>,
    pub auto_summary_interval: Option<usize>,
}

impl FileGroupOverrides {
    pub fn apply(&self, defaults: &GroupConfig) -> GroupConfig {
        GroupConfig {
            max_responders: self.max_responders.unwrap_or(defaults.max_responders),
            turn_timeout_seconds: self
                .turn_timeout_seconds
                .unwrap_or(defaults.turn_timeout_seconds),
            chain_depth_limit: self.chain_depth_limit.unwrap_or(defaults.chain_depth_limit),
            re_invoke_already_replied: self
                .re_invoke_already_replied
                .unwrap_or(defaults.re_invoke_already_replied),
            supervisor: self
                .supervisor
                .clone()
                .map(WorkerId::new)
                .or_else(|| defaults.supervisor.clone()),
            auto_summary_interval: self
                .auto_summary_interval
                .unwrap_or(defaults.auto_summary_interval),
        }
    }
}

/// A configured group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGroupConfig {
    pub id: String,
    pub name: Option<String>,
    pub members: Vec<FileMemberConfig>,
    pub config: FileGroupOverrides,
}

impl FileGroupConfig {
    /// Build the domain group, falling back to `defaults` for unset settings.
    pub fn to_group(
        &self,
        defaults: &GroupConfig,
        worker_name: impl Fn(&WorkerId) -> Option<String>,
    ) -> Result<Group, DomainError> {
        let members = self
            .members
            .iter()
            .map(|m| m.to_member(&worker_name))
            .collect();
        Group::new(
            self.id.clone(),
            self.name.clone().unwrap_or_else(|| self.id.clone()),
            members,
            self.config.apply(defaults),
        )
    }
}
