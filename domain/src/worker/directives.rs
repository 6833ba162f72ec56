//! Parsing of structured directives embedded in worker replies.
//!
//! Executors answer in free text. Structured data rides along in HTML
//! comments so it stays invisible when the reply is rendered:
//!
//! | Directive | Meaning |
//! |-----------|---------|
//! | `SKIP` (whole reply) | decline to respond (may-respond only) |
//! | `<!--NEXT_MENTIONS:["a","b"]-->` | force-invoke these workers next turn |
//! | `<!--MEMORY:{"type":..,"content":..,"importance":..}-->` | shared group memory |
//! | `<!--PERSONAL_LOG:text-->` | entry for the worker's own journal |
//!
//! Markers are always stripped from the visible content, even when their
//! payload fails to parse.

use crate::core::ids::WorkerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Keyword a worker replies with to decline.
pub const SKIP_KEYWORD: &str = "SKIP";

const NEXT_MENTIONS_PREFIX: &str = "<!--NEXT_MENTIONS:";
const MEMORY_PREFIX: &str = "<!--MEMORY:";
const PERSONAL_LOG_PREFIX: &str = "<!--PERSONAL_LOG:";
const MARKER_SUFFIX: &str = "-->";

/// A note a worker asks to store in the group's shared memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryNote {
    #[serde(rename = "type", default = "default_memory_type")]
    pub kind: String,
    pub content: String,
    #[serde(default = "default_importance")]
    pub importance: f32,
}

fn default_memory_type() -> String {
    "summary".to_string()
}

fn default_importance() -> f32 {
    0.7
}

/// A worker's reply after directive extraction (Value Object)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkerReply {
    /// Visible content with every marker removed
    pub content: String,
    pub should_respond: bool,
    pub next_mentions: BTreeSet<WorkerId>,
    pub memory_notes: Vec<MemoryNote>,
    pub personal_logs: Vec<String>,
    /// Markers whose payload could not be parsed
    pub malformed_directives: usize,
}

impl WorkerReply {
    /// A plain reply with no directives.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            should_respond: true,
            ..Default::default()
        }
    }

    /// A declined may-respond invocation.
    pub fn declined() -> Self {
        Self {
            should_respond: false,
            ..Default::default()
        }
    }

    pub fn with_next_mentions(mut self, mentions: impl IntoIterator<Item = WorkerId>) -> Self {
        self.next_mentions = mentions.into_iter().collect();
        self
    }
}

/// Parse raw executor output into a [`WorkerReply`].
///
/// A `SKIP` reply is declined with empty content, but its markers are still
/// extracted so a must-respond caller can keep the worker's next mentions.
pub fn parse_reply(raw: &str) -> WorkerReply {
    let mut reply = if is_skip(raw) {
        WorkerReply::declined()
    } else {
        WorkerReply::text(String::new())
    };

    let (content, payloads) = extract_markers(raw, NEXT_MENTIONS_PREFIX);
    for payload in payloads {
        match serde_json::from_str::<Vec<String>>(payload.trim()) {
            Ok(ids) => reply
                .next_mentions
                .extend(ids.into_iter().filter(|id| !id.is_empty()).map(WorkerId::new)),
            Err(_) => reply.malformed_directives += 1,
        }
    }

    let (content, payloads) = extract_markers(&content, MEMORY_PREFIX);
    for payload in payloads {
        match serde_json::from_str::<MemoryNote>(payload.trim()) {
            Ok(note) if !note.content.trim().is_empty() => reply.memory_notes.push(note),
            Ok(_) => {}
            Err(_) => reply.malformed_directives += 1,
        }
    }

    let (content, payloads) = extract_markers(&content, PERSONAL_LOG_PREFIX);
    reply.personal_logs = payloads
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    if reply.should_respond {
        reply.content = content.trim().to_string();
    }
    reply
}

/// `SKIP` alone, or `SKIP` followed by a non-word character.
fn is_skip(raw: &str) -> bool {
    let trimmed = raw.trim();
    match trimmed.strip_prefix(SKIP_KEYWORD) {
        Some(rest) => rest
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric() && c != '_'),
        None => false,
    }
}

/// Remove every `prefix ... -->` marker, returning the remaining text and
/// the payloads in order. An unterminated marker is left untouched.
fn extract_markers<'a>(text: &'a str, prefix: &str) -> (String, Vec<&'a str>) {
    let mut remaining = String::with_capacity(text.len());
    let mut payloads = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(prefix) {
        let after_prefix = &rest[start + prefix.len()..];
        let Some(end) = after_prefix.find(MARKER_SUFFIX) else {
            break;
        };
        remaining.push_str(&rest[..start]);
        payloads.push(&after_prefix[..end]);
        rest = &after_prefix[end + MARKER_SUFFIX.len()..];
    }
    remaining.push_str(rest);
    (remaining, payloads)
}
