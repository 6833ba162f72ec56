//! Turn domain entities
//!
//! A [`Turn`] is a transient unit of work: one round of worker invocations
//! triggered by a human message (depth 0) or by chained mentions. Turns are
//! built by the orchestrator, consumed by the turn executor and never
//! persisted.

use super::planning::TurnPlan;
use crate::core::ids::{TurnId, WorkerId};
use crate::group::config::GroupConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Why a worker is invoked in a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationKind {
    /// Phase A: addressed directly, must produce a reply
    MustRespond,
    /// Phase B: may decline via `should_respond = false`
    MayRespond,
}

impl InvocationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationKind::MustRespond => "must_respond",
            InvocationKind::MayRespond => "may_respond",
        }
    }
}

impl std::fmt::Display for InvocationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State of a group's turn loop
///
/// `Idle → TurnRunning → {NextTurnRunning | Quiescent | ChainLimitReached}`;
/// the loop returns to `Idle` once a terminal state is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainState {
    Idle,
    TurnRunning,
    NextTurnRunning,
    /// No further mentions; the group waits for a human
    Quiescent,
    /// Mentions remained but the depth limit was hit
    ChainLimitReached,
}

impl ChainState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainState::Idle => "idle",
            ChainState::TurnRunning => "turn_running",
            ChainState::NextTurnRunning => "next_turn_running",
            ChainState::Quiescent => "quiescent",
            ChainState::ChainLimitReached => "chain_limit_reached",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ChainState::Quiescent | ChainState::ChainLimitReached)
    }
}

impl std::fmt::Display for ChainState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One round of worker invocations (Entity, immutable)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    id: TurnId,
    depth: u32,
    /// Author of the triggering message, or `"chain"` for chained turns
    trigger_source: String,
    must_respond: Vec<WorkerId>,
    may_respond: Vec<WorkerId>,
    /// Workers that replied earlier in the same chain
    already_replied: BTreeSet<WorkerId>,
    re_invoke_already_replied: bool,
    worker_timeout: Duration,
    max_responders: usize,
    supervisor: Option<WorkerId>,
}

/// Trigger source recorded on chained turns.
pub const CHAIN_TRIGGER: &str = "chain";

impl Turn {
    /// Build a turn from a plan, snapshotting the relevant group settings.
    pub fn new(
        plan: TurnPlan,
        depth: u32,
        trigger_source: impl Into<String>,
        already_replied: BTreeSet<WorkerId>,
        config: &GroupConfig,
    ) -> Self {
        Self {
            id: TurnId::generate(),
            depth,
            trigger_source: trigger_source.into(),
            must_respond: plan.must_respond,
            may_respond: plan.may_respond,
            already_replied,
            re_invoke_already_replied: config.re_invoke_already_replied,
            worker_timeout: config.turn_timeout(),
            max_responders: config.max_responders,
            supervisor: config.supervisor.clone(),
        }
    }

    pub fn id(&self) -> &TurnId {
        &self.id
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn trigger_source(&self) -> &str {
        &self.trigger_source
    }

    pub fn must_respond(&self) -> &[WorkerId] {
        &self.must_respond
    }

    pub fn may_respond(&self) -> &[WorkerId] {
        &self.may_respond
    }

    pub fn already_replied(&self) -> &BTreeSet<WorkerId> {
        &self.already_replied
    }

    pub fn worker_timeout(&self) -> Duration {
        self.worker_timeout
    }

    pub fn max_responders(&self) -> usize {
        self.max_responders
    }

    pub fn supervisor(&self) -> Option<&WorkerId> {
        self.supervisor.as_ref()
    }

    pub fn re_invoke_already_replied(&self) -> bool {
        self.re_invoke_already_replied
    }

    /// Whether policy forbids invoking `worker` again in this chain.
    pub fn is_excluded(&self, worker: &WorkerId) -> bool {
        !self.re_invoke_already_replied && self.already_replied.contains(worker)
    }

    /// Every worker scheduled in this turn (must first, then may).
    pub fn scheduled(&self) -> impl Iterator<Item = &WorkerId> {
        self.must_respond.iter().chain(self.may_respond.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(must: &[&str], may: &[&str]) -> TurnPlan {
        TurnPlan {
            must_respond: must.iter().map(|s| WorkerId::from(*s)).collect(),
            may_respond: may.iter().map(|s| WorkerId::from(*s)).collect(),
        }
    }

    #[test]
    fn test_turn_snapshots_config() {
        let config = GroupConfig::default()
            .with_turn_timeout_seconds(7)
            .with_max_responders(2)
            .with_supervisor("lead");
        let turn = Turn::new(plan(&["bot1"], &["bot2"]), 0, "alice", BTreeSet::new(), &config);
        assert_eq!(turn.depth(), 0);
        assert_eq!(turn.worker_timeout(), Duration::from_secs(7));
        assert_eq!(turn.max_responders(), 2);
        assert_eq!(turn.supervisor(), Some(&WorkerId::from("lead")));
        assert_eq!(turn.scheduled().count(), 2);
    }

    #[test]
    fn test_exclusion_follows_policy() {
        let replied: BTreeSet<WorkerId> = [WorkerId::from("bot1")].into_iter().collect();
        let strict = Turn::new(plan(&[], &[]), 1, CHAIN_TRIGGER, replied.clone(), &GroupConfig::default());
        assert!(strict.is_excluded(&WorkerId::from("bot1")));
        assert!(!strict.is_excluded(&WorkerId::from("bot2")));

        let relaxed_config = GroupConfig::default().with_re_invoke_already_replied(true);
        let relaxed = Turn::new(plan(&[], &[]), 1, CHAIN_TRIGGER, replied, &relaxed_config);
        assert!(!relaxed.is_excluded(&WorkerId::from("bot1")));
    }

    #[test]
    fn test_chain_state_terminal() {
        assert!(ChainState::Quiescent.is_terminal());
        assert!(ChainState::ChainLimitReached.is_terminal());
        assert!(!ChainState::TurnRunning.is_terminal());
        assert!(!ChainState::Idle.is_terminal());
    }
}
