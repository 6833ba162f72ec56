//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.
//!
//! ```toml
//! [defaults]
//! max_responders = 3
//! chain_depth_limit = 4
//!
//! [[workers]]
//! id = "bot1"
//! name = "Builder"
//! workspace_dir = "~/work/bot1"
//!
//! [[groups]]
//! id = "dev"
//! members = [{ id = "alice", kind = "human" }, { id = "bot1" }]
//! ```

mod groups;
mod logging;
mod memory;

pub use groups::{FileGroupConfig, FileGroupOverrides, FileMemberConfig, FileMemberKind};
pub use logging::FileLoggingConfig;
pub use memory::FileMemoryConfig;

use huddle_domain::{
    ConfigIssue, ConfigIssueCode, DomainError, ExecutorKind, Group, GroupConfig, WorkerProfile,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Group settings used when a group does not override them
    pub defaults: GroupConfig,
    /// Worker registry
    pub workers: Vec<WorkerProfile>,
    pub groups: Vec<FileGroupConfig>,
    pub logging: FileLoggingConfig,
    pub memory: FileMemoryConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Defaults
        issues.extend(timeout_issue("defaults", &self.defaults));

        // 2. Workers
        let mut worker_ids = HashSet::new();
        for worker in &self.workers {
            if !worker_ids.insert(worker.id.as_str()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateWorker {
                        worker_id: worker.id.to_string(),
                    },
                    format!("worker '{}' is defined more than once", worker.id),
                ));
            }
            if worker.executor.kind == ExecutorKind::Generic
                && worker
                    .executor
                    .command
                    .as_deref()
                    .is_none_or(|c| c.trim().is_empty())
            {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::MissingCommand {
                        worker_id: worker.id.to_string(),
                    },
                    format!("worker '{}': generic executor needs a command", worker.id),
                ));
            }
        }

        // 3. Groups
        for group in &self.groups {
            let config = group.config.apply(&self.defaults);
            issues.extend(timeout_issue(&format!("groups.{}", group.id), &config));

            let mut member_ids = HashSet::new();
            let mut group_workers = HashSet::new();
            for member in &group.members {
                if !member_ids.insert(member.id.as_str()) {
                    issues.push(ConfigIssue::error(
                        ConfigIssueCode::DuplicateMember {
                            group_id: group.id.clone(),
                            member_id: member.id.clone(),
                        },
                        format!("group '{}': member '{}' is listed twice", group.id, member.id),
                    ));
                }
                let Some(worker_id) = member.worker_id() else {
                    continue;
                };
                if !worker_ids.contains(worker_id.as_str()) {
                    issues.push(ConfigIssue::error(
                        ConfigIssueCode::UnknownWorker {
                            group_id: group.id.clone(),
                            worker_id: worker_id.to_string(),
                        },
                        format!(
                            "group '{}': member '{}' references unknown worker '{}'",
                            group.id, member.id, worker_id
                        ),
                    ));
                }
                group_workers.insert(worker_id);
            }

            if let Some(supervisor) = &config.supervisor
                && !group_workers.contains(supervisor)
            {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::SupervisorNotMember {
                        group_id: group.id.clone(),
                        supervisor: supervisor.to_string(),
                    },
                    format!(
                        "group '{}': supervisor '{}' is not a worker member and will be ignored",
                        group.id, supervisor
                    ),
                ));
            }
        }

        issues
    }

    /// Build every configured group.
    pub fn build_groups(&self) -> Result<Vec<Group>, DomainError> {
        self.groups
            .iter()
            .map(|g| {
                g.to_group(&self.defaults, |worker_id| {
                    self.workers
                        .iter()
                        .find(|w| &w.id == worker_id)
                        .map(|w| w.display_name().to_string())
                })
            })
            .collect()
    }
}

fn timeout_issue(scope: &str, config: &GroupConfig) -> Option<ConfigIssue> {
    if config.turn_timeout_seconds > 0 {
        return None;
    }
    Some(ConfigIssue::error(
        ConfigIssueCode::InvalidValue {
            field: format!("{scope}.turn_timeout_seconds"),
            value: "0".to_string(),
        },
        format!("{scope}.turn_timeout_seconds cannot be 0"),
    ))
}
