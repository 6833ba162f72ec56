//! Builds worker inputs from the recent message window and the registry.

use crate::workers::WorkerRegistry;
use async_trait::async_trait;
use huddle_application::{ContextAssembler, ContextError, MessageLog};
use huddle_domain::{Group, InvocationKind, Turn, WorkerId, WorkerInput};
use std::sync::Arc;

/// Number of recent messages shown to a worker.
pub const DEFAULT_WINDOW: usize = 50;

pub struct TranscriptContextAssembler {
    log: Arc<dyn MessageLog>,
    registry: Arc<WorkerRegistry>,
    window: usize,
}

impl TranscriptContextAssembler {
    pub fn new(log: Arc<dyn MessageLog>, registry: Arc<WorkerRegistry>) -> Self {
        Self {
            log,
            registry,
            window: DEFAULT_WINDOW,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }
}

#[async_trait]
impl ContextAssembler for TranscriptContextAssembler {
    async fn build_input(
        &self,
        worker_id: &WorkerId,
        turn: &Turn,
        group: &Group,
        invocation: InvocationKind,
    ) -> Result<WorkerInput, ContextError> {
        let profile = self
            .registry
            .get(worker_id)
            .ok_or_else(|| ContextError::UnknownWorker(worker_id.to_string()))?;
        let recent = self
            .log
            .recent(group.id(), self.window)
            .await
            .map_err(|e| ContextError::Store(e.to_string()))?;

        let mut input = WorkerInput::new(
            group.id().clone(),
            turn.id().clone(),
            worker_id.clone(),
            invocation,
        )
        .with_transcript(&recent);
        input.worker_name = group.worker_display_name(worker_id);
        input.role_prompt = profile.role_prompt.clone();
        input.mentioned_by = Some(turn.trigger_source().to_string());
        input.peers = self.registry.peers_of(worker_id, group);
        input.max_output_tokens = profile.max_output_tokens;
        input.prefer_concise = invocation == InvocationKind::MayRespond;
        Ok(input)
    }
}
