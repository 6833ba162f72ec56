//! `[logging]` section.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Conversation log settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of every turn event; disabled when unset
    pub conversation_log: Option<PathBuf>,
}
