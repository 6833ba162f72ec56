//! Context assembly port
//!
//! Builds the bounded [`WorkerInput`] a worker sees for one invocation:
//! the conversation window, its role, its peers and any memory excerpt.

use async_trait::async_trait;
use huddle_domain::{Group, InvocationKind, Turn, WorkerId, WorkerInput};
use thiserror::Error;

/// Errors that can occur while assembling a worker's input
///
/// These are configuration errors: the affected worker is reported with
/// status `error` and the turn continues without it.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Unknown worker: {0}")]
    UnknownWorker(String),

    #[error("Message log unavailable: {0}")]
    Store(String),

    #[error("Context error: {0}")]
    Other(String),
}

/// Port for building worker inputs
#[async_trait]
pub trait ContextAssembler: Send + Sync {
    async fn build_input(
        &self,
        worker_id: &WorkerId,
        turn: &Turn,
        group: &Group,
        invocation: InvocationKind,
    ) -> Result<WorkerInput, ContextError>;
}
