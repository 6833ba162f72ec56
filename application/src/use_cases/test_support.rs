//! Hand-written port doubles shared by the use case tests.

use crate::ports::context_assembler::{ContextAssembler, ContextError};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::memory::MemoryPort;
use crate::ports::message_log::{MessageLog, StoreError};
use crate::ports::notification::NotificationSink;
use crate::ports::worker_invoker::WorkerInvoker;
use async_trait::async_trait;
use huddle_domain::{
    Group, GroupConfig, GroupId, InvocationKind, Member, MemoryNote, Message, Turn, WorkerId,
    WorkerInput, WorkerInvocationResult, WorkerStatus, parse_reply,
};
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// What a scripted worker does for one invocation.
pub struct Script {
    pub delay: Duration,
    pub outcome: Result<String, String>,
}

impl Script {
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Ok(text.into()),
        }
    }

    pub fn skip() -> Self {
        Self::reply("SKIP")
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Err(detail.into()),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type ScriptFn = dyn Fn(&WorkerInput) -> Script + Send + Sync;

pub struct MockInvoker {
    script: Box<ScriptFn>,
    calls: Mutex<Vec<WorkerInput>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl MockInvoker {
    pub fn new(script: impl Fn(&WorkerInput) -> Script + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    /// Every worker replies with a short acknowledgement.
    pub fn acknowledging() -> Self {
        Self::new(|input| Script::reply(format!("{} here", input.worker_id)))
    }

    pub fn calls(&self) -> Vec<WorkerInput> {
        self.calls.lock().unwrap().clone()
    }

    pub fn invoked(&self) -> Vec<(String, InvocationKind)> {
        self.calls()
            .into_iter()
            .map(|c| (c.worker_id.to_string(), c.invocation))
            .collect()
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkerInvoker for MockInvoker {
    async fn invoke(
        &self,
        worker_id: &WorkerId,
        input: WorkerInput,
        _deadline: Instant,
    ) -> WorkerInvocationResult {
        let script = (self.script)(&input);
        let kind = input.invocation;
        self.calls.lock().unwrap().push(input);

        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        let started = Instant::now();
        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        match script.outcome {
            Ok(raw) => WorkerInvocationResult::from_reply(
                worker_id.clone(),
                kind,
                parse_reply(&raw),
                started.elapsed(),
            ),
            Err(detail) => {
                WorkerInvocationResult::error(worker_id.clone(), kind, detail, started.elapsed())
            }
        }
    }
}

#[derive(Default)]
pub struct MockLog {
    messages: Mutex<Vec<Message>>,
}

impl MockLog {
    pub fn all(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    pub fn contents(&self) -> Vec<String> {
        self.all().into_iter().map(|m| m.content).collect()
    }
}

#[async_trait]
impl MessageLog for MockLog {
    async fn append(&self, message: &Message) -> Result<(), StoreError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn recent(&self, group_id: &GroupId, limit: usize) -> Result<Vec<Message>, StoreError> {
        let messages = self.messages.lock().unwrap();
        let group: Vec<_> = messages
            .iter()
            .filter(|m| &m.group_id == group_id)
            .cloned()
            .collect();
        let skip = group.len().saturating_sub(limit);
        Ok(group.into_iter().skip(skip).collect())
    }

    async fn count(&self, group_id: &GroupId) -> Result<usize, StoreError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| &m.group_id == group_id)
            .count())
    }
}

/// Builds inputs from the mock log so tests can observe what workers saw.
pub struct LogContext {
    pub log: std::sync::Arc<MockLog>,
    pub broken: HashSet<String>,
}

impl LogContext {
    pub fn new(log: std::sync::Arc<MockLog>) -> Self {
        Self {
            log,
            broken: HashSet::new(),
        }
    }
}

#[async_trait]
impl ContextAssembler for LogContext {
    async fn build_input(
        &self,
        worker_id: &WorkerId,
        turn: &Turn,
        group: &Group,
        invocation: InvocationKind,
    ) -> Result<WorkerInput, ContextError> {
        if self.broken.contains(worker_id.as_str()) {
            return Err(ContextError::UnknownWorker(worker_id.to_string()));
        }
        let recent = self
            .log
            .recent(group.id(), 50)
            .await
            .map_err(|e| ContextError::Store(e.to_string()))?;
        Ok(WorkerInput::new(
            group.id().clone(),
            turn.id().clone(),
            worker_id.clone(),
            invocation,
        )
        .with_transcript(&recent))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn statuses(&self, worker: &str) -> Vec<WorkerStatus> {
        let prefix = format!("status:{worker}:");
        self.events()
            .iter()
            .filter_map(|e| e.strip_prefix(&prefix).map(str::to_string))
            .map(|s| match s.as_str() {
                "running" => WorkerStatus::Running,
                "done" => WorkerStatus::Done,
                "skipped" => WorkerStatus::Skipped,
                "timeout" => WorkerStatus::Timeout,
                _ => WorkerStatus::Error,
            })
            .collect()
    }

    pub fn system_notices(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|e| e.strip_prefix("system:").map(str::to_string))
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn emit_status(&self, _group_id: &GroupId, worker_id: &WorkerId, status: WorkerStatus) {
        self.events
            .lock()
            .unwrap()
            .push(format!("status:{worker_id}:{status}"));
    }

    fn emit_message(&self, message: &Message) {
        self.events
            .lock()
            .unwrap()
            .push(format!("message:{}", message.author_id));
    }

    fn emit_system(&self, _group_id: &GroupId, text: &str) {
        self.events.lock().unwrap().push(format!("system:{text}"));
    }
}

#[derive(Default)]
pub struct RecordingMemory {
    pub notes: Mutex<Vec<MemoryNote>>,
    pub personal: Mutex<Vec<(String, String)>>,
    pub summaries: AtomicUsize,
}

#[async_trait]
impl MemoryPort for RecordingMemory {
    async fn record(&self, _group_id: &GroupId, note: &MemoryNote) {
        self.notes.lock().unwrap().push(note.clone());
    }

    async fn append_personal_log(&self, worker_id: &WorkerId, text: &str) {
        self.personal
            .lock()
            .unwrap()
            .push((worker_id.to_string(), text.to_string()));
    }

    async fn summarize(&self, _group_id: &GroupId) {
        self.summaries.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingLogger {
    pub events: Mutex<Vec<ConversationEvent>>,
}

impl RecordingLogger {
    pub fn types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.event_type).collect()
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// `alice` (human) plus the given workers, in roster order.
pub fn group_with(id: &str, workers: &[&str], config: GroupConfig) -> Group {
    let mut members = vec![Member::human("alice", "Alice")];
    members.extend(workers.iter().map(|w| Member::worker(*w, *w)));
    Group::new(id, id, members, config).unwrap()
}

pub fn worker_ids(ids: &[&str]) -> Vec<WorkerId> {
    ids.iter().map(|id| WorkerId::from(*id)).collect()
}
