//! Worker invocation port
//!
//! The single seam between the turn executor and whatever runs a worker
//! (a CLI subprocess, a remote API, a test double).

use async_trait::async_trait;
use huddle_domain::{InvocationKind, WorkerId, WorkerInput, WorkerInvocationResult};
use thiserror::Error;
use tokio::time::Instant;

/// Reasons an invocation could not produce a reply
///
/// Invokers fold these into a [`WorkerInvocationResult`] with status
/// `error`; they never surface as `Err` to the executor.
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("Unknown worker: {0}")]
    UnknownWorker(String),

    #[error("Workspace does not exist: {0}")]
    MissingWorkspace(String),

    #[error("No executor registered for kind '{0}'")]
    NoExecutor(String),

    #[error("Executor failed: {0}")]
    Executor(String),
}

/// Port for invoking a single worker
///
/// `deadline` is the instant by which the invocation must finish. The turn
/// executor enforces it regardless; implementations use it to bound their
/// own work (e.g. child processes) so nothing outlives the turn.
#[async_trait]
pub trait WorkerInvoker: Send + Sync {
    async fn invoke(
        &self,
        worker_id: &WorkerId,
        input: WorkerInput,
        deadline: Instant,
    ) -> WorkerInvocationResult;
}

/// Convert an [`InvokeError`] into an `error` result.
pub fn failed_invocation(
    worker_id: &WorkerId,
    kind: InvocationKind,
    error: &InvokeError,
    elapsed: std::time::Duration,
) -> WorkerInvocationResult {
    WorkerInvocationResult::error(worker_id.clone(), kind, error.to_string(), elapsed)
}
