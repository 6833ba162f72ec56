//! Turn value objects - results of worker invocations and of whole turns.
//!
//! - [`WorkerInvocationResult`] - one worker's outcome inside a turn
//! - [`TurnOutcome`] - everything a turn produced, plus the chained mentions
//! - [`ChainReport`] - every turn triggered by one originating message

use super::entities::{ChainState, InvocationKind};
use crate::conversation::message::Message;
use crate::core::ids::{GroupId, TurnId, WorkerId};
use crate::worker::directives::{MemoryNote, WorkerReply};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Completion status of a worker invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationStatus {
    Ok,
    Timeout,
    Error,
}

impl InvocationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationStatus::Ok => "ok",
            InvocationStatus::Timeout => "timeout",
            InvocationStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for InvocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of invoking one worker
///
/// Failures are data, not errors: a timed-out or failed worker yields a
/// result with empty content and `should_respond = false`.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerInvocationResult {
    pub worker_id: WorkerId,
    pub kind: InvocationKind,
    pub status: InvocationStatus,
    pub content: String,
    pub should_respond: bool,
    pub next_mentions: BTreeSet<WorkerId>,
    pub memory_notes: Vec<MemoryNote>,
    pub personal_logs: Vec<String>,
    /// Failure detail for `timeout` / `error`
    pub error: Option<String>,
    pub duration: Duration,
}

impl WorkerInvocationResult {
    /// A completed invocation.
    pub fn from_reply(
        worker_id: WorkerId,
        kind: InvocationKind,
        reply: WorkerReply,
        duration: Duration,
    ) -> Self {
        Self {
            worker_id,
            kind,
            status: InvocationStatus::Ok,
            content: reply.content,
            should_respond: reply.should_respond,
            next_mentions: reply.next_mentions,
            memory_notes: reply.memory_notes,
            personal_logs: reply.personal_logs,
            error: None,
            duration,
        }
    }

    /// The invocation exceeded its deadline and was abandoned.
    pub fn timeout(worker_id: WorkerId, kind: InvocationKind, duration: Duration) -> Self {
        Self::failed(
            worker_id,
            kind,
            InvocationStatus::Timeout,
            format!("timed out after {:.1}s", duration.as_secs_f64()),
            duration,
        )
    }

    /// The adapter or its configuration failed.
    pub fn error(
        worker_id: WorkerId,
        kind: InvocationKind,
        detail: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self::failed(worker_id, kind, InvocationStatus::Error, detail.into(), duration)
    }

    fn failed(
        worker_id: WorkerId,
        kind: InvocationKind,
        status: InvocationStatus,
        detail: String,
        duration: Duration,
    ) -> Self {
        Self {
            worker_id,
            kind,
            status,
            content: String::new(),
            should_respond: false,
            next_mentions: BTreeSet::new(),
            memory_notes: Vec::new(),
            personal_logs: Vec::new(),
            error: Some(detail),
            duration,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == InvocationStatus::Ok
    }

    /// Whether this invocation contributes a message to the conversation.
    pub fn produced_reply(&self) -> bool {
        self.is_ok() && self.should_respond
    }

    /// A may-respond worker that answered and chose not to reply.
    pub fn declined(&self) -> bool {
        self.is_ok() && !self.should_respond
    }
}

/// Everything a single turn produced
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub turn_id: TurnId,
    pub depth: u32,
    /// Phase A results first, then Phase B
    pub results: Vec<WorkerInvocationResult>,
    /// Messages committed to the log, in commit order
    pub messages: Vec<Message>,
    /// Workers invoked this turn, including those who declined or failed
    pub invoked: BTreeSet<WorkerId>,
    /// Workers that produced a reply this turn
    pub replied: BTreeSet<WorkerId>,
    /// Aggregated next-turn mentions, after policy subtraction
    pub next_mentions: BTreeSet<WorkerId>,
}

impl TurnOutcome {
    pub fn result_for(&self, worker_id: &WorkerId) -> Option<&WorkerInvocationResult> {
        self.results.iter().find(|r| &r.worker_id == worker_id)
    }

    pub fn results_of(&self, kind: InvocationKind) -> impl Iterator<Item = &WorkerInvocationResult> {
        self.results.iter().filter(move |r| r.kind == kind)
    }

    pub fn failures(&self) -> impl Iterator<Item = &WorkerInvocationResult> {
        self.results.iter().filter(|r| !r.is_ok())
    }
}

/// Report of a whole turn chain for one originating message
#[derive(Debug, Clone)]
pub struct ChainReport {
    pub group_id: GroupId,
    pub outcomes: Vec<TurnOutcome>,
    pub final_state: ChainState,
}

impl ChainReport {
    pub fn turns_executed(&self) -> usize {
        self.outcomes.len()
    }

    /// All messages committed by the chain, in order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.outcomes.iter().flat_map(|o| o.messages.iter())
    }

    pub fn hit_chain_limit(&self) -> bool {
        self.final_state == ChainState::ChainLimitReached
    }
}
