//! Live worker status reported to the presentation layer.

use serde::{Deserialize, Serialize};

/// Status of a worker during a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    /// Invocation in flight
    Running,
    /// Replied
    Done,
    /// Invoked as may-respond and declined
    Skipped,
    Timeout,
    Error,
}

impl WorkerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerStatus::Running => "running",
            WorkerStatus::Done => "done",
            WorkerStatus::Skipped => "skipped",
            WorkerStatus::Timeout => "timeout",
            WorkerStatus::Error => "error",
        }
    }

    /// Whether the worker is finished for this turn.
    pub fn is_final(&self) -> bool {
        !matches!(self, WorkerStatus::Running)
    }
}

impl std::fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
