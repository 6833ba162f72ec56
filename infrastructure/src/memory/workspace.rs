//! File-backed memory.
//!
//! Personal journal entries go to `<workspace>/memory/YYYY-MM-DD.md` of the
//! worker that wrote them. Shared notes go to `<notes_dir>/<group_id>.md` when
//! a notes directory is configured.

use crate::workers::WorkerRegistry;
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use huddle_application::MemoryPort;
use huddle_domain::{GroupId, MemoryNote, WorkerId};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Memory backed by markdown files
pub struct WorkspaceMemory {
    registry: Arc<WorkerRegistry>,
    notes_dir: Option<PathBuf>,
}

impl WorkspaceMemory {
    pub fn new(registry: Arc<WorkerRegistry>) -> Self {
        Self {
            registry,
            notes_dir: None,
        }
    }

    pub fn with_notes_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.notes_dir = Some(dir.into());
        self
    }

    /// Daily journal file inside a worker's workspace.
    pub fn journal_path(workspace: &Path, date: NaiveDate) -> PathBuf {
        workspace
            .join("memory")
            .join(format!("{}.md", date.format("%Y-%m-%d")))
    }
}

async fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await
}

#[async_trait]
impl MemoryPort for WorkspaceMemory {
    async fn record(&self, group_id: &GroupId, note: &MemoryNote) {
        let Some(dir) = &self.notes_dir else {
            debug!("Note for {} not persisted: {}", group_id, note.content);
            return;
        };
        let path = dir.join(format!("{}.md", group_id));
        let line = format!(
            "- [{}] {} (importance {:.1})\n",
            note.kind,
            note.content.trim(),
            note.importance
        );
        if let Err(e) = append_line(&path, &line).await {
            warn!("Failed to write note to {}: {}", path.display(), e);
        }
    }

    async fn append_personal_log(&self, worker_id: &WorkerId, text: &str) {
        let Some(profile) = self.registry.get(worker_id) else {
            warn!("Personal log for unknown worker {} dropped", worker_id);
            return;
        };
        let now = Local::now();
        let path = Self::journal_path(&profile.workspace_dir, now.date_naive());
        let line = format!("- [{}] {}\n", now.format("%H:%M"), text.trim());
        if let Err(e) = append_line(&path, &line).await {
            warn!("Failed to write personal log {}: {}", path.display(), e);
        }
    }

    async fn summarize(&self, group_id: &GroupId) {
        // Summaries need a model call; no summarizer ships with the CLI
        info!("Summary requested for group {}", group_id);
    }
}
