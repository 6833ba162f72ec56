//! Conversation messages

use crate::core::ids::{GroupId, MessageId, TurnId, WorkerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorKind {
    Human,
    Worker,
    System,
}

impl AuthorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorKind::Human => "human",
            AuthorKind::Worker => "worker",
            AuthorKind::System => "system",
        }
    }
}

/// Author id used for orchestrator-generated system messages.
pub const SYSTEM_AUTHOR: &str = "system";

/// A message in a group conversation (Entity)
///
/// Immutable once built; the message log owns persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub group_id: GroupId,
    /// Turn that produced this message (`None` for human input)
    pub turn_id: Option<TurnId>,
    pub author_id: String,
    pub author_kind: AuthorKind,
    pub author_name: String,
    pub content: String,
    /// Workers explicitly addressed by this message
    #[serde(default)]
    pub mentions: BTreeSet<WorkerId>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Message {
    fn build(
        group_id: GroupId,
        author_id: String,
        author_kind: AuthorKind,
        author_name: String,
        content: String,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            group_id,
            turn_id: None,
            author_id,
            author_kind,
            author_name,
            content,
            mentions: BTreeSet::new(),
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }

    /// A message typed by a human participant.
    pub fn human(
        group_id: impl Into<GroupId>,
        author_id: impl Into<String>,
        author_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::build(
            group_id.into(),
            author_id.into(),
            AuthorKind::Human,
            author_name.into(),
            content.into(),
        )
    }

    /// A reply produced by a worker invocation.
    pub fn worker(
        group_id: impl Into<GroupId>,
        turn_id: TurnId,
        worker_id: &WorkerId,
        author_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let mut message = Self::build(
            group_id.into(),
            worker_id.to_string(),
            AuthorKind::Worker,
            author_name.into(),
            content.into(),
        );
        message.turn_id = Some(turn_id);
        message
    }

    /// An orchestrator notice (failures, chain limit).
    pub fn system(group_id: impl Into<GroupId>, content: impl Into<String>) -> Self {
        Self::build(
            group_id.into(),
            SYSTEM_AUTHOR.to_string(),
            AuthorKind::System,
            SYSTEM_AUTHOR.to_string(),
            content.into(),
        )
    }

    pub fn with_turn(mut self, turn_id: TurnId) -> Self {
        self.turn_id = Some(turn_id);
        self
    }

    pub fn with_mentions(mut self, mentions: impl IntoIterator<Item = WorkerId>) -> Self {
        self.mentions = mentions.into_iter().collect();
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Display label used when rendering transcripts.
    pub fn author_label(&self) -> &str {
        if self.author_name.is_empty() {
            &self.author_id
        } else {
            &self.author_name
        }
    }
}
