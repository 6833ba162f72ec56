//! Group domain entities

use super::config::GroupConfig;
use crate::core::error::DomainError;
use crate::core::ids::{GroupId, MemberId, WorkerId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Kind of a group participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MemberKind {
    /// A human operator
    Human,
    /// An AI-backed worker, resolved through the worker registry
    Worker { worker_id: WorkerId },
}

/// A participant of a group (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub display_name: String,
    #[serde(flatten)]
    pub kind: MemberKind,
}

impl Member {
    pub fn human(id: impl Into<MemberId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            kind: MemberKind::Human,
        }
    }

    /// A worker member whose member id equals its worker id.
    pub fn worker(worker_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        let worker_id = worker_id.into();
        Self {
            id: MemberId::new(worker_id.clone()),
            display_name: display_name.into(),
            kind: MemberKind::Worker {
                worker_id: WorkerId::new(worker_id),
            },
        }
    }

    pub fn worker_id(&self) -> Option<&WorkerId> {
        match &self.kind {
            MemberKind::Worker { worker_id } => Some(worker_id),
            MemberKind::Human => None,
        }
    }

    pub fn is_worker(&self) -> bool {
        matches!(self.kind, MemberKind::Worker { .. })
    }
}

/// A group conversation (Entity)
///
/// Member ids are unique; [`Group::new`] rejects duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    name: String,
    members: Vec<Member>,
    config: GroupConfig,
}

impl Group {
    pub fn new(
        id: impl Into<GroupId>,
        name: impl Into<String>,
        members: Vec<Member>,
        config: GroupConfig,
    ) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for member in &members {
            if !seen.insert(member.id.clone()) {
                return Err(DomainError::DuplicateMember(member.id.to_string()));
            }
        }
        config.validate()?;
        Ok(Self {
            id: id.into(),
            name: name.into(),
            members,
            config,
        })
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn config(&self) -> &GroupConfig {
        &self.config
    }

    /// Worker members in roster order.
    pub fn workers(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.is_worker())
    }

    /// Worker ids in roster order.
    pub fn worker_ids(&self) -> Vec<WorkerId> {
        self.workers().filter_map(|m| m.worker_id().cloned()).collect()
    }

    pub fn has_worker(&self, worker_id: &WorkerId) -> bool {
        self.workers().any(|m| m.worker_id() == Some(worker_id))
    }

    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == id)
    }

    /// Display name of a worker, falling back to its id.
    pub fn worker_display_name(&self, worker_id: &WorkerId) -> String {
        self.workers()
            .find(|m| m.worker_id() == Some(worker_id))
            .map(|m| m.display_name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| worker_id.to_string())
    }

    /// The configured supervisor, if it is a worker member of this group.
    pub fn supervisor(&self) -> Option<&WorkerId> {
        self.config
            .supervisor
            .as_ref()
            .filter(|supervisor| self.has_worker(supervisor))
    }

    /// Replace the configuration; takes effect for the next message.
    pub fn with_config(mut self, config: GroupConfig) -> Result<Self, DomainError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }
}
