//! Executor adapters: one implementation per [`ExecutorKind`].
//!
//! Each adapter launches its executor inside the worker's workspace and turns
//! the raw output into a [`WorkerReply`]. Child processes are killed when the
//! invocation future is dropped, so abandoned invocations do not leak.

mod claude;
mod generic;

pub use claude::ClaudeCliAdapter;
pub use generic::GenericCliAdapter;

use async_trait::async_trait;
use huddle_domain::core::string::preview;
use huddle_domain::{ExecutorKind, WorkerInput, WorkerProfile, WorkerReply};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdin, Command};
use tracing::debug;

const STDERR_PREVIEW_CHARS: usize = 500;

/// Errors from running an executor
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("No command configured for worker {0}")]
    MissingCommand(String),

    #[error("Failed to spawn '{command}': {reason}")]
    Spawn { command: String, reason: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Executor exited with {status}: {stderr}")]
    NonZeroExit { status: String, stderr: String },

    #[error("Executor reported an error: {0}")]
    Reported(String),
}

/// An external executor a worker can wrap
#[async_trait]
pub trait ExecutorAdapter: Send + Sync {
    fn kind(&self) -> ExecutorKind;

    /// Run one invocation in the worker's workspace.
    async fn invoke(
        &self,
        profile: &WorkerProfile,
        input: &WorkerInput,
    ) -> Result<WorkerReply, AdapterError>;

    /// Whether the executor is installed and answers.
    async fn health_check(&self, profile: &WorkerProfile) -> bool;
}

/// A child process to run.
pub(crate) struct ProcessSpec<'a> {
    pub program: &'a str,
    pub args: Vec<String>,
    pub workspace: &'a Path,
    pub env: &'a BTreeMap<String, String>,
    pub stdin: Option<&'a str>,
}

/// Spawn the process, feed stdin, and collect stdout.
pub(crate) async fn run_process(process: ProcessSpec<'_>) -> Result<String, AdapterError> {
    let mut cmd = Command::new(process.program);
    cmd.args(&process.args)
        .current_dir(process.workspace)
        .envs(process.env)
        .kill_on_drop(true)
        .stdin(if process.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AdapterError::CommandNotFound(process.program.to_string()),
        _ => AdapterError::Spawn {
            command: process.program.to_string(),
            reason: e.to_string(),
        },
    })?;

    // Feed stdin while stdout and stderr are drained; a child that echoes
    // as it reads would otherwise block on a full pipe.
    let stdin = process.stdin.zip(child.stdin.take());
    let (fed, output) = tokio::join!(
        feed_stdin(process.program, stdin),
        child.wait_with_output()
    );
    fed?;
    let output = output.map_err(|e| AdapterError::Io(e.to_string()))?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = if stderr.trim().is_empty() {
            stdout.as_str()
        } else {
            stderr.trim()
        };
        return Err(AdapterError::NonZeroExit {
            status: output.status.to_string(),
            stderr: preview(detail, STDERR_PREVIEW_CHARS),
        });
    }
    Ok(stdout)
}

/// Write the prompt and close stdin so the child sees EOF.
async fn feed_stdin(
    program: &str,
    stdin: Option<(&str, ChildStdin)>,
) -> Result<(), AdapterError> {
    let Some((input, mut stdin)) = stdin else {
        return Ok(());
    };
    // Commands that never read stdin may exit before the prompt is written
    match stdin.write_all(input.as_bytes()).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
            debug!("{} closed stdin early", program);
            Ok(())
        }
        Err(e) => Err(AdapterError::Io(format!("write prompt: {e}"))),
    }
}

/// Split a shell-style command line on whitespace.
pub(crate) fn split_command(command: &str) -> Option<(&str, Vec<String>)> {
    let mut parts = command.split_whitespace();
    let program = parts.next()?;
    Some((program, parts.map(str::to_string).collect()))
}
