//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::ConsoleFormatter;
use huddle_application::Orchestrator;
use huddle_domain::{Group, MemberId, Message};
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::sync::Arc;
use tracing::warn;

const HISTORY_SIZE: usize = 1000;

/// Build a human message from `author` into `group`.
///
/// The display name comes from the group's member list when `author` is a
/// member, otherwise the id doubles as the name.
pub fn compose_message(group: &Group, author: &str, text: &str) -> Message {
    let display_name = group
        .member(&MemberId::new(author))
        .map(|m| m.display_name.clone())
        .unwrap_or_else(|| author.to_string());
    Message::human(group.id().clone(), author, display_name, text)
}

/// Interactive chat REPL
pub struct ChatRepl {
    orchestrator: Arc<Orchestrator>,
    group: Group,
    author: String,
    show_summary: bool,
}

/// What a line typed at the prompt asks for
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Help,
    Members,
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        match line {
            "/quit" | "/exit" | "/q" => Command::Quit,
            "/help" | "/h" | "/?" => Command::Help,
            "/members" | "/m" => Command::Members,
            other => Command::Unknown(other.to_string()),
        }
    }
}

impl ChatRepl {
    pub fn new(orchestrator: Arc<Orchestrator>, group: Group, author: impl Into<String>) -> Self {
        Self {
            orchestrator,
            group,
            author: author.into(),
            show_summary: true,
        }
    }

    /// Set whether to print a summary line after each chain
    pub fn with_summary(mut self, show: bool) -> Self {
        self.show_summary = show;
        self
    }

    /// Run the interactive REPL until `/quit` or Ctrl-D.
    pub async fn run(&self) -> std::io::Result<()> {
        let mut editor = Reedline::create();

        let history_path = dirs::data_dir().map(|p| p.join("huddle").join("history.txt"));
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match FileBackedHistory::with_file(HISTORY_SIZE, path.clone()) {
                Ok(history) => editor = editor.with_history(Box::new(history)),
                Err(e) => warn!("Chat history unavailable: {}", e),
            }
        }

        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(format!("{}@{}", self.author, self.group.id())),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(Command::parse(line)) {
                            break;
                        }
                        continue;
                    }

                    self.post(line).await;
                }
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                _ => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│               Huddle - Chat Mode            │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        print!("{}", ConsoleFormatter::format_members(&self.group));
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?     - Show this help");
        println!("  /members, /m      - Show group members");
        println!("  /quit, /exit, /q  - Exit chat");
        println!();
        println!("Address workers with @id, or @everyone / @all for the whole group.");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&self, command: Command) -> bool {
        match command {
            Command::Quit => {
                println!("Bye!");
                true
            }
            Command::Help => {
                println!();
                Self::print_help();
                false
            }
            Command::Members => {
                println!();
                println!("{}", ConsoleFormatter::format_members(&self.group));
                false
            }
            Command::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                false
            }
        }
    }

    async fn post(&self, text: &str) {
        println!();
        let message = compose_message(&self.group, &self.author, text);
        let report = self.orchestrator.on_new_message(message, &self.group).await;
        if self.show_summary {
            println!("{}", ConsoleFormatter::format_chain_summary(&report));
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_domain::{AuthorKind, GroupConfig, Member};

    fn group() -> Group {
        Group::new(
            "backend",
            "Backend",
            vec![Member::human("alice", "Alice"), Member::worker("bot1", "Bot One")],
            GroupConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_compose_message_uses_member_name() {
        let msg = compose_message(&group(), "alice", "@bot1 hi");
        assert_eq!(msg.author_kind, AuthorKind::Human);
        assert_eq!(msg.author_id, "alice");
        assert_eq!(msg.author_name, "Alice");
        assert_eq!(msg.group_id.as_str(), "backend");
        assert!(msg.mentions.is_empty());
    }

    #[test]
    fn test_compose_message_unknown_author_uses_id() {
        let msg = compose_message(&group(), "guest", "hello");
        assert_eq!(msg.author_name, "guest");
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("/q"), Command::Quit);
        assert_eq!(Command::parse("/exit"), Command::Quit);
        assert_eq!(Command::parse("/?"), Command::Help);
        assert_eq!(Command::parse("/members"), Command::Members);
        assert_eq!(
            Command::parse("/models"),
            Command::Unknown("/models".to_string())
        );
    }
}
