//! Group-level orchestration settings.

use crate::core::error::DomainError;
use crate::core::ids::WorkerId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-group orchestration configuration (Value Object).
///
/// A running turn loop works on a snapshot of this value; edits made while a
/// loop is active only apply to the next incoming message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Maximum number of replies per turn (Phase B gets what Phase A left)
    pub max_responders: usize,
    /// Timeout applied to every individual worker invocation
    pub turn_timeout_seconds: u64,
    /// Deepest chained turn allowed; a limit of `L` runs at most `L + 1` turns
    pub chain_depth_limit: u32,
    /// Whether workers that already replied in this chain may be invoked again
    pub re_invoke_already_replied: bool,
    /// Optional supervisor worker, exempt from the Phase B responder cap
    pub supervisor: Option<WorkerId>,
    /// Request a rolling summary every N stored messages (0 disables)
    pub auto_summary_interval: usize,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            max_responders: 5,
            turn_timeout_seconds: 120,
            chain_depth_limit: 5,
            re_invoke_already_replied: false,
            supervisor: None,
            auto_summary_interval: 20,
        }
    }
}

impl GroupConfig {
    /// Per-worker invocation timeout.
    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.turn_timeout_seconds)
    }

    pub fn with_max_responders(mut self, max: usize) -> Self {
        self.max_responders = max;
        self
    }

    pub fn with_turn_timeout_seconds(mut self, secs: u64) -> Self {
        self.turn_timeout_seconds = secs;
        self
    }

    pub fn with_chain_depth_limit(mut self, limit: u32) -> Self {
        self.chain_depth_limit = limit;
        self
    }

    pub fn with_re_invoke_already_replied(mut self, allow: bool) -> Self {
        self.re_invoke_already_replied = allow;
        self
    }

    pub fn with_supervisor(mut self, supervisor: impl Into<WorkerId>) -> Self {
        self.supervisor = Some(supervisor.into());
        self
    }

    pub fn with_auto_summary_interval(mut self, interval: usize) -> Self {
        self.auto_summary_interval = interval;
        self
    }

    /// Reject values the turn loop cannot work with.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.turn_timeout_seconds == 0 {
            return Err(DomainError::InvalidConfig(
                "turn_timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.max_responders == 0 {
            return Err(DomainError::InvalidConfig(
                "max_responders must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
