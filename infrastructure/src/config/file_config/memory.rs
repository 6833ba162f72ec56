//! `[memory]` section.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Memory directive settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMemoryConfig {
    /// Write `PERSONAL_LOG` entries and `MEMORY` notes to disk
    pub enabled: bool,
    /// Directory for shared group notes (`<group_id>.md`); notes are only
    /// logged when unset
    pub notes_dir: Option<PathBuf>,
}

impl Default for FileMemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            notes_dir: None,
        }
    }
}
