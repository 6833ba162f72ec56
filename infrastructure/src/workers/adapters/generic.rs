//! Generic CLI adapter: any command that reads the prompt on stdin.

use super::{AdapterError, ExecutorAdapter, ProcessSpec, run_process};
use crate::workers::prompt::render_prompt;
use async_trait::async_trait;
use huddle_domain::{ExecutorKind, WorkerInput, WorkerProfile, WorkerReply, parse_reply};
use tracing::info;

/// Runs the configured command through the shell, prompt on stdin,
/// stdout as the reply.
#[derive(Debug, Default)]
pub struct GenericCliAdapter;

impl GenericCliAdapter {
    pub fn new() -> Self {
        Self
    }

    fn shell_args(command: &str, extra_args: &[String]) -> (&'static str, Vec<String>) {
        let line = if extra_args.is_empty() {
            command.to_string()
        } else {
            format!("{} {}", command, extra_args.join(" "))
        };
        if cfg!(target_os = "windows") {
            ("cmd", vec!["/C".to_string(), line])
        } else {
            ("sh", vec!["-c".to_string(), line])
        }
    }
}

#[async_trait]
impl ExecutorAdapter for GenericCliAdapter {
    fn kind(&self) -> ExecutorKind {
        ExecutorKind::Generic
    }

    async fn invoke(
        &self,
        profile: &WorkerProfile,
        input: &WorkerInput,
    ) -> Result<WorkerReply, AdapterError> {
        let command = profile
            .executor
            .command
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AdapterError::MissingCommand(profile.id.to_string()))?;

        let prompt = render_prompt(input, true);
        let (shell, args) = Self::shell_args(command, &profile.executor.extra_args);
        info!(
            "Invoking '{}' for {} in {}",
            command,
            profile.id,
            profile.workspace_dir.display()
        );
        let stdout = run_process(ProcessSpec {
            program: shell,
            args,
            workspace: &profile.workspace_dir,
            env: &profile.executor.env,
            stdin: Some(&prompt),
        })
        .await?;

        Ok(parse_reply(&stdout))
    }

    async fn health_check(&self, profile: &WorkerProfile) -> bool {
        profile
            .executor
            .command
            .as_deref()
            .and_then(|c| c.split_whitespace().next())
            .is_some_and(|program| which::which(program).is_ok())
    }
}
