//! Claude Code CLI adapter.
//!
//! Runs `claude -p <prompt> --output-format json` in the worker's workspace.
//! The workspace's `CLAUDE.md` carries the worker's role, so the prompt only
//! holds the conversation and guidance.

use super::{AdapterError, ExecutorAdapter, ProcessSpec, run_process, split_command};
use crate::workers::prompt::render_prompt;
use async_trait::async_trait;
use huddle_domain::{ExecutorKind, WorkerInput, WorkerProfile, WorkerReply, parse_reply};
use serde_json::Value;
use tracing::{debug, info};

const DEFAULT_COMMAND: &str = "claude";

/// Adapter for the `claude` CLI
#[derive(Debug, Default)]
pub struct ClaudeCliAdapter;

impl ClaudeCliAdapter {
    pub fn new() -> Self {
        Self
    }

    fn command(profile: &WorkerProfile) -> (&str, Vec<String>) {
        profile
            .executor
            .command
            .as_deref()
            .and_then(split_command)
            .unwrap_or((DEFAULT_COMMAND, Vec::new()))
    }
}

#[async_trait]
impl ExecutorAdapter for ClaudeCliAdapter {
    fn kind(&self) -> ExecutorKind {
        ExecutorKind::Claude
    }

    async fn invoke(
        &self,
        profile: &WorkerProfile,
        input: &WorkerInput,
    ) -> Result<WorkerReply, AdapterError> {
        let prompt = render_prompt(input, false);
        let (program, mut args) = Self::command(profile);
        args.extend([
            "-p".to_string(),
            prompt,
            "--output-format".to_string(),
            "json".to_string(),
        ]);
        args.extend(profile.executor.extra_args.iter().cloned());

        info!(
            "Invoking {} for {} in {}",
            program,
            profile.id,
            profile.workspace_dir.display()
        );
        let stdout = run_process(ProcessSpec {
            program,
            args,
            workspace: &profile.workspace_dir,
            env: &profile.executor.env,
            stdin: None,
        })
        .await?;
        debug!("{} returned {} bytes", profile.id, stdout.len());

        let text = extract_text(&stdout)?;
        Ok(parse_reply(&text))
    }

    async fn health_check(&self, profile: &WorkerProfile) -> bool {
        let (program, _) = Self::command(profile);
        if which::which(program).is_err() {
            return false;
        }
        run_process(ProcessSpec {
            program,
            args: vec!["--version".to_string()],
            workspace: std::path::Path::new("."),
            env: &profile.executor.env,
            stdin: None,
        })
        .await
        .is_ok()
    }
}

/// Pull the reply text out of `--output-format json` output.
///
/// Accepts a result object (`result` or `content`), a list of content
/// blocks, or falls back to the raw output.
fn extract_text(stdout: &str) -> Result<String, AdapterError> {
    let Ok(value) = serde_json::from_str::<Value>(stdout) else {
        return Ok(stdout.to_string());
    };
    match value {
        Value::Object(map) => {
            let text = map
                .get("result")
                .or_else(|| map.get("content"))
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    Value::Array(blocks) => join_text_blocks(blocks).unwrap_or_default(),
                    other => other.to_string(),
                })
                .unwrap_or_else(|| stdout.to_string());
            if map.get("is_error").and_then(Value::as_bool) == Some(true) {
                return Err(AdapterError::Reported(text));
            }
            Ok(text)
        }
        Value::Array(blocks) => Ok(join_text_blocks(&blocks).unwrap_or_else(|| stdout.to_string())),
        _ => Ok(stdout.to_string()),
    }
}

fn join_text_blocks(blocks: &[Value]) -> Option<String> {
    let parts: Vec<&str> = blocks
        .iter()
        .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|b| b.get("text").and_then(Value::as_str))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}
