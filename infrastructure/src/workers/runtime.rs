//! Worker runtime: the [`WorkerInvoker`] backed by executor adapters.

use super::adapters::{ClaudeCliAdapter, ExecutorAdapter, GenericCliAdapter};
use super::registry::WorkerRegistry;
use async_trait::async_trait;
use futures::future::join_all;
use huddle_application::{InvokeError, WorkerInvoker, failed_invocation};
use huddle_domain::{ExecutorKind, WorkerId, WorkerInput, WorkerInvocationResult, WorkerProfile};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Runs workers through the adapter registered for their executor kind
pub struct WorkerRuntime {
    registry: Arc<WorkerRegistry>,
    adapters: HashMap<ExecutorKind, Arc<dyn ExecutorAdapter>>,
}

impl WorkerRuntime {
    /// Runtime with the built-in adapters.
    pub fn new(registry: Arc<WorkerRegistry>) -> Self {
        Self::empty(registry)
            .with_adapter(Arc::new(ClaudeCliAdapter::new()))
            .with_adapter(Arc::new(GenericCliAdapter::new()))
    }

    /// Runtime without adapters.
    pub fn empty(registry: Arc<WorkerRegistry>) -> Self {
        Self {
            registry,
            adapters: HashMap::new(),
        }
    }

    /// Register (or replace) the adapter for its kind.
    pub fn with_adapter(mut self, adapter: Arc<dyn ExecutorAdapter>) -> Self {
        self.adapters.insert(adapter.kind(), adapter);
        self
    }

    pub fn registry(&self) -> &WorkerRegistry {
        &self.registry
    }

    /// Health of every registered worker's executor, sorted by worker id.
    ///
    /// Checks run concurrently; a worker whose kind has no adapter is unhealthy.
    pub async fn health_check(&self) -> Vec<(WorkerId, bool)> {
        let checks = self.registry.profiles().into_iter().map(|profile| async move {
            let healthy = match self.adapters.get(&profile.executor.kind) {
                Some(adapter) => adapter.health_check(profile).await,
                None => false,
            };
            (profile.id.clone(), healthy)
        });
        join_all(checks).await
    }

    fn prepare(
        &self,
        worker_id: &WorkerId,
    ) -> Result<(&WorkerProfile, &Arc<dyn ExecutorAdapter>), InvokeError> {
        let profile = self
            .registry
            .get(worker_id)
            .ok_or_else(|| InvokeError::UnknownWorker(worker_id.to_string()))?;
        if !profile.workspace_dir.is_dir() {
            return Err(InvokeError::MissingWorkspace(
                profile.workspace_dir.display().to_string(),
            ));
        }
        let adapter = self
            .adapters
            .get(&profile.executor.kind)
            .ok_or_else(|| InvokeError::NoExecutor(profile.executor.kind.to_string()))?;
        Ok((profile, adapter))
    }
}

#[async_trait]
impl WorkerInvoker for WorkerRuntime {
    async fn invoke(
        &self,
        worker_id: &WorkerId,
        input: WorkerInput,
        deadline: Instant,
    ) -> WorkerInvocationResult {
        let started = Instant::now();
        let kind = input.invocation;

        let (profile, adapter) = match self.prepare(worker_id) {
            Ok(found) => found,
            Err(e) => {
                warn!("Cannot invoke {}: {}", worker_id, e);
                return failed_invocation(worker_id, kind, &e, started.elapsed());
            }
        };

        // The executor's own limit may be tighter than the turn deadline
        let executor_deadline = started + Duration::from_secs(profile.executor.timeout_seconds);
        let deadline = deadline.min(executor_deadline);

        info!("Invoking {} ({}, {})", worker_id, profile.executor.kind, kind);
        match tokio::time::timeout_at(deadline, adapter.invoke(profile, &input)).await {
            Ok(Ok(reply)) => WorkerInvocationResult::from_reply(
                worker_id.clone(),
                kind,
                reply,
                started.elapsed(),
            ),
            Ok(Err(e)) => {
                warn!("{} executor failed: {}", worker_id, e);
                failed_invocation(
                    worker_id,
                    kind,
                    &InvokeError::Executor(e.to_string()),
                    started.elapsed(),
                )
            }
            Err(_) => WorkerInvocationResult::timeout(worker_id.clone(), kind, started.elapsed()),
        }
    }
}
