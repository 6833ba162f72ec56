//! Live worker status and message output during a turn chain

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use huddle_application::NotificationSink;
use huddle_domain::{AuthorKind, GroupId, Message, WorkerId, WorkerStatus};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Reports worker activity with one spinner per running worker
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<WorkerId, ProgressBar>>,
    echo_human: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
            echo_human: true,
        }
    }

    /// Whether human messages are printed back (off in chat mode, where the
    /// user already sees what they typed).
    pub fn with_echo_human(mut self, echo: bool) -> Self {
        self.echo_human = echo;
        self
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn print(&self, line: String) {
        // Printing through MultiProgress keeps active spinners below the text.
        if self.multi.println(&line).is_err() {
            println!("{}", line);
        }
    }

    fn start(&self, worker_id: &WorkerId) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix(worker_id.to_string());
        pb.set_message("thinking...");
        pb.enable_steady_tick(Duration::from_millis(100));

        let previous = self
            .bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(worker_id.clone(), pb);
        if let Some(previous) = previous {
            previous.finish_and_clear();
        }
    }

    fn finish(&self, worker_id: &WorkerId, status: WorkerStatus) {
        let bar = self
            .bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(worker_id);
        if let Some(pb) = bar {
            pb.finish_and_clear();
        }
        if status == WorkerStatus::Skipped {
            self.print(format!(
                "{} {}",
                worker_id.to_string().dimmed(),
                "skipped".dimmed()
            ));
        }
    }

    /// Number of spinners currently shown.
    pub fn active(&self) -> usize {
        self.bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for ProgressReporter {
    fn emit_status(&self, _group_id: &GroupId, worker_id: &WorkerId, status: WorkerStatus) {
        if status.is_final() {
            self.finish(worker_id, status);
        } else {
            self.start(worker_id);
        }
    }

    fn emit_message(&self, message: &Message) {
        if message.author_kind == AuthorKind::Human && !self.echo_human {
            return;
        }
        self.print(ConsoleFormatter::format_message(message));
    }

    fn emit_system(&self, _group_id: &GroupId, text: &str) {
        self.print(ConsoleFormatter::format_system(text));
    }
}

/// Simple text-based output (no spinners), used with `--quiet`
pub struct SimpleProgress {
    echo_human: bool,
}

impl SimpleProgress {
    pub fn new(echo_human: bool) -> Self {
        Self { echo_human }
    }
}

impl NotificationSink for SimpleProgress {
    fn emit_status(&self, _group_id: &GroupId, _worker_id: &WorkerId, _status: WorkerStatus) {}

    fn emit_message(&self, message: &Message) {
        if message.author_kind == AuthorKind::Human && !self.echo_human {
            return;
        }
        println!("{}", ConsoleFormatter::format_message(message));
    }

    fn emit_system(&self, _group_id: &GroupId, text: &str) {
        println!("{}", ConsoleFormatter::format_system(text));
    }
}
