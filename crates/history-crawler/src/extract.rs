//! Context-window extraction over a chronologically sorted buffer.

use portrayal_core::{ContextEntry, RawMessage, UserId};

/// Stable ascending sort by timestamp; equal timestamps keep arrival order.
pub fn sort_chronologically(buffer: &mut [RawMessage]) {
    buffer.sort_by_key(|m| m.timestamp);
}

/// Builds one entry per target-authored message with non-empty text.
///
/// Each entry is up to `window` lines rendered from the messages immediately preceding the
/// target message (any author, oldest first), followed by the target's full text. Extraction
/// stops after `max_entries` entries.
pub fn extract_entries(
    sorted: &[RawMessage],
    target: &UserId,
    window: usize,
    max_entries: usize,
) -> Vec<String> {
    let mut entries = Vec::new();
    if max_entries == 0 {
        return entries;
    }

    for (i, message) in sorted.iter().enumerate() {
        if &message.author_id != target {
            continue;
        }
        let text = message.text();
        if text.is_empty() {
            continue;
        }

        let start = i.saturating_sub(window);
        let mut lines: Vec<String> = sorted[start..i]
            .iter()
            .map(|m| ContextEntry::from_message(m).to_string())
            .collect();
        lines.push(text);
        entries.push(lines.join("\n"));

        if entries.len() >= max_entries {
            break;
        }
    }

    entries
}
