//! In-process message log.

use async_trait::async_trait;
use huddle_application::{MessageLog, StoreError};
use huddle_domain::{GroupId, Message};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Message log kept in memory, one append-only vector per group
#[derive(Debug, Default)]
pub struct InMemoryMessageLog {
    groups: RwLock<HashMap<GroupId, Vec<Message>>>,
}

impl InMemoryMessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message of a group, oldest first.
    pub async fn all(&self, group_id: &GroupId) -> Vec<Message> {
        self.groups
            .read()
            .await
            .get(group_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl MessageLog for InMemoryMessageLog {
    async fn append(&self, message: &Message) -> Result<(), StoreError> {
        self.groups
            .write()
            .await
            .entry(message.group_id.clone())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn recent(&self, group_id: &GroupId, limit: usize) -> Result<Vec<Message>, StoreError> {
        let groups = self.groups.read().await;
        let Some(messages) = groups.get(group_id) else {
            return Ok(Vec::new());
        };
        let skip = messages.len().saturating_sub(limit);
        Ok(messages[skip..].to_vec())
    }

    async fn count(&self, group_id: &GroupId) -> Result<usize, StoreError> {
        Ok(self
            .groups
            .read()
            .await
            .get(group_id)
            .map_or(0, Vec::len))
    }
}
