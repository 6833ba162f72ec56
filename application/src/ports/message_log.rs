//! Message log port
//!
//! The message log is the only shared mutable resource of the turn loop.
//! Appends are atomic per message.

use async_trait::async_trait;
use huddle_domain::{GroupId, Message};
use thiserror::Error;

/// Errors from the message store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Persistent, append-only conversation log
#[async_trait]
pub trait MessageLog: Send + Sync {
    /// Append a message to its group's log.
    async fn append(&self, message: &Message) -> Result<(), StoreError>;

    /// The most recent `limit` messages of a group, oldest first.
    async fn recent(&self, group_id: &GroupId, limit: usize) -> Result<Vec<Message>, StoreError>;

    /// Number of messages stored for a group.
    async fn count(&self, group_id: &GroupId) -> Result<usize, StoreError>;
}
