//! Mention resolution: turn `@name` tokens into worker ids.
//!
//! A token is the `@` marker at the start of the text or right after
//! whitespace, followed by a run of non-whitespace characters. This keeps
//! e-mail addresses and file names such as `a@b.com` from being read as
//! mentions.
//!
//! Resolution is pure: same text and roster always give the same set.

use crate::core::ids::WorkerId;
use crate::group::entities::Member;
use std::collections::BTreeSet;

/// Marker character that introduces a mention.
pub const MENTION_MARKER: char = '@';

/// Reserved tokens that address every worker in the group.
pub const EVERYONE_TOKENS: [&str; 2] = ["all", "所有人"];

/// Punctuation stripped from the end of a token (`@bot1,` → `bot1`).
const TRAILING_PUNCTUATION: &[char] = &[
    ',', '.', ';', ':', '!', '?', ')', '，', '。', '；', '：', '！', '？', '、', '）',
];

/// Outcome of resolving the mentions in one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionResolution {
    /// Addressed workers (the everyone token already expanded)
    pub workers: BTreeSet<WorkerId>,
    /// Whether the everyone token appeared
    pub everyone: bool,
}

impl MentionResolution {
    pub fn is_empty(&self) -> bool {
        !self.everyone && self.workers.is_empty()
    }
}

/// Resolve mentions and return only the addressed worker set.
pub fn resolve(text: &str, members: &[Member]) -> BTreeSet<WorkerId> {
    resolve_mentions(text, members).workers
}

/// Resolve the mention tokens in `text` against the group roster.
///
/// Id matches win over display-name matches. Tokens that match neither are
/// ignored.
pub fn resolve_mentions(text: &str, members: &[Member]) -> MentionResolution {
    let mut resolution = MentionResolution::default();
    for token in mention_tokens(text) {
        apply_token(token, members, &mut resolution);
    }
    resolution
}

/// Resolve a list of mention ids attached to a message by a front-end.
///
/// Entries may carry a leading `@`. Non-worker ids are dropped.
pub fn resolve_attached<'a>(
    mentions: impl IntoIterator<Item = &'a str>,
    members: &[Member],
) -> MentionResolution {
    let mut resolution = MentionResolution::default();
    for raw in mentions {
        let token = raw.strip_prefix(MENTION_MARKER).unwrap_or(raw);
        apply_token(token, members, &mut resolution);
    }
    resolution
}

fn apply_token(token: &str, members: &[Member], resolution: &mut MentionResolution) {
    if EVERYONE_TOKENS.contains(&token) {
        resolution.everyone = true;
        resolution
            .workers
            .extend(members.iter().filter_map(|m| m.worker_id().cloned()));
        return;
    }
    if let Some(worker_id) = match_worker(token, members) {
        resolution.workers.insert(worker_id);
    }
}

fn match_worker(token: &str, members: &[Member]) -> Option<WorkerId> {
    let by_id = members
        .iter()
        .filter_map(|m| m.worker_id())
        .find(|id| id.as_str() == token);
    if let Some(id) = by_id {
        return Some(id.clone());
    }
    members
        .iter()
        .filter(|m| m.display_name == token)
        .find_map(|m| m.worker_id().cloned())
}

/// Split `text` into candidate mention tokens (marker removed).
fn mention_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let at_boundary = prev.is_none_or(char::is_whitespace);
        if ch == MENTION_MARKER && at_boundary {
            let start = idx + ch.len_utf8();
            let mut end = start;
            while let Some(&(next_idx, next)) = chars.peek() {
                if next.is_whitespace() {
                    break;
                }
                end = next_idx + next.len_utf8();
                chars.next();
            }
            let token = text[start..end].trim_end_matches(TRAILING_PUNCTUATION);
            if !token.is_empty() {
                tokens.push(token);
            }
            prev = text[..end].chars().next_back();
            continue;
        }
        prev = Some(ch);
    }
    tokens
}
