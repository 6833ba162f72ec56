//! String utilities for the domain layer.

/// Truncate a string to a maximum byte length with ellipsis (UTF-8 safe).
///
/// The cut always lands on a character boundary, so multi-byte content
/// (CJK, emoji) never produces an invalid slice.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3).min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// One-line preview of message content for logs and status lines.
///
/// Newlines collapse to spaces before truncation.
pub fn preview(s: &str, max_len: usize) -> String {
    let flattened: String = s
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    truncate(&flattened, max_len)
}
