//! Prompt rendering for CLI executors.
//!
//! The transcript comes first, followed by guidance sections. Claude workers
//! keep their role in the workspace's `CLAUDE.md`, so the role prompt is only
//! rendered for executors that have no such file.

use huddle_domain::{InvocationKind, SKIP_KEYWORD, WorkerInput};
use std::fmt::Write;

/// Render the prompt for one invocation.
pub fn render_prompt(input: &WorkerInput, include_role: bool) -> String {
    let mut prompt = String::new();

    if include_role && !input.role_prompt.is_empty() {
        let _ = writeln!(prompt, "## Role\n{}\n", input.role_prompt.trim());
    }

    if !input.peers.is_empty() {
        prompt.push_str("## Colleagues\n");
        for peer in &input.peers {
            if peer.skills.is_empty() {
                let _ = writeln!(prompt, "- {} (@{})", peer.name, peer.worker_id);
            } else {
                let _ = writeln!(
                    prompt,
                    "- {} (@{}): {}",
                    peer.name,
                    peer.worker_id,
                    peer.skills.join(", ")
                );
            }
        }
        prompt.push('\n');
    }

    if !input.transcript.is_empty() {
        prompt.push_str("## Conversation\n");
        for line in &input.transcript {
            let _ = writeln!(prompt, "[{}]: {}", line.author, line.content);
        }
    }

    if let Some(memory) = input.memory_context.as_deref().filter(|m| !m.is_empty()) {
        let _ = writeln!(prompt, "\n## Relevant memory\n{memory}");
    }

    if input.invocation == InvocationKind::MayRespond {
        let _ = writeln!(
            prompt,
            "\n## Note\nIf this message is not relevant to your responsibilities, reply with only: {SKIP_KEYWORD}"
        );
    }

    if input.prefer_concise {
        let _ = writeln!(
            prompt,
            "\nKeep the reply concise (at most {} tokens) and lead with the key points.",
            input.max_output_tokens
        );
    }

    prompt.push_str(
        "\n## Collaboration\n\
         If you need a colleague to pick this up, end your reply with:\n\
         <!--NEXT_MENTIONS:[\"worker_id_1\",\"worker_id_2\"]-->\n",
    );

    prompt
}
