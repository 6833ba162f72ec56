//! Memory port
//!
//! Receives memory directives extracted from worker replies and rolling
//! summary requests. Everything here is best effort.

use async_trait::async_trait;
use huddle_domain::{GroupId, MemoryNote, WorkerId};

#[async_trait]
pub trait MemoryPort: Send + Sync {
    /// Store a shared note for the group.
    async fn record(&self, group_id: &GroupId, note: &MemoryNote);

    /// Append an entry to a worker's personal journal.
    async fn append_personal_log(&self, worker_id: &WorkerId, text: &str);

    /// Request a rolling summary of the group's recent conversation.
    async fn summarize(&self, group_id: &GroupId);
}

/// No-op memory, used when no memory backend is configured
pub struct NoMemory;

#[async_trait]
impl MemoryPort for NoMemory {
    async fn record(&self, _group_id: &GroupId, _note: &MemoryNote) {}
    async fn append_personal_log(&self, _worker_id: &WorkerId, _text: &str) {}
    async fn summarize(&self, _group_id: &GroupId) {}
}
