//! Console output formatter for group messages and chain reports

use colored::Colorize;
use huddle_domain::{AuthorKind, ChainReport, ChainState, Group, MemberKind, Message};

/// Formats conversation output for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a single message according to its author kind.
    pub fn format_message(message: &Message) -> String {
        match message.author_kind {
            AuthorKind::Human => format!(
                "{} {}",
                format!("{}:", message.author_label()).cyan().bold(),
                message.content
            ),
            AuthorKind::Worker => format!(
                "{}\n{}\n",
                format!("── {} ──", message.author_label()).yellow().bold(),
                message.content
            ),
            AuthorKind::System => Self::format_system(&message.content),
        }
    }

    pub fn format_system(text: &str) -> String {
        format!("{} {}", "*".dimmed(), text.dimmed())
    }

    /// One-line summary of a finished chain.
    pub fn format_chain_summary(report: &ChainReport) -> String {
        let turns = report.turns_executed();
        let replies: usize = report.outcomes.iter().map(|o| o.replied.len()).sum();
        let failures: usize = report.outcomes.iter().map(|o| o.failures().count()).sum();

        let mut summary = format!(
            "{} turn{}, {} repl{}",
            turns,
            if turns == 1 { "" } else { "s" },
            replies,
            if replies == 1 { "y" } else { "ies" }
        );
        if failures > 0 {
            summary.push_str(&format!(", {} failed", failures));
        }

        let state = match report.final_state {
            ChainState::ChainLimitReached => "chain limit reached".yellow().to_string(),
            ChainState::Quiescent => "waiting for you".green().to_string(),
            other => other.to_string(),
        };
        format!("{} {} ({})", "--".dimmed(), summary.dimmed(), state)
    }

    /// Member listing used by the chat `/members` command.
    pub fn format_members(group: &Group) -> String {
        let mut output = format!(
            "{} {} ({})\n",
            "Group:".cyan().bold(),
            group.name(),
            group.id()
        );
        for member in group.members() {
            let line = match &member.kind {
                MemberKind::Human => format!("  - {} (human)", member.display_name),
                MemberKind::Worker { worker_id } => {
                    let mut line = format!("  - {} @{}", member.display_name, worker_id);
                    if group.supervisor() == Some(worker_id) {
                        line.push_str(&format!(" {}", "[supervisor]".magenta()));
                    }
                    line
                }
            };
            output.push_str(&line);
            output.push('\n');
        }
        output
    }
}
