//! Core types: group/user identifiers, raw history messages, context lines, query results,
//! and member profiles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of characters kept from a context line's text.
pub const CONTEXT_EXCERPT_MAX_CHARS: usize = 50;

/// Appended to a context excerpt that was cut short.
pub const ELLIPSIS: &str = "…";

/// Rendered in place of a context message that carries no text (images, stickers, ...).
pub const NON_TEXT_PLACEHOLDER: &str = "[non-text]";

/// Chat group identifier. Cursors and caches are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

/// Participant identifier within a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

macro_rules! id_impls {
    ($name:ident) => {
        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<i64> for $name {
            fn from(n: i64) -> Self {
                Self(n.to_string())
            }
        }
    };
}

id_impls!(GroupId);
id_impls!(UserId);

/// One chat message as returned by the history API. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMessage {
    /// Message id; some remote implementations omit it.
    pub id: Option<i64>,
    /// Pagination sequence number; falls back to `id` when absent.
    pub sequence_number: Option<i64>,
    pub author_id: UserId,
    /// Group alias, then global nickname, then [`RawMessage::placeholder_name`].
    pub author_display_name: String,
    /// Unix seconds.
    pub timestamp: i64,
    /// Text fragments in order; non-text fragments are already dropped.
    pub text_segments: Vec<String>,
}

impl RawMessage {
    /// Key used to advance the scan cursor: `sequence_number`, else `id`.
    pub fn pagination_key(&self) -> Option<i64> {
        self.sequence_number.or(self.id)
    }

    /// Concatenated text segments with surrounding whitespace stripped.
    pub fn text(&self) -> String {
        self.text_segments.concat().trim().to_string()
    }

    pub fn has_text(&self) -> bool {
        !self.text().is_empty()
    }

    /// Display name used when a sender has neither a group alias nor a nickname.
    pub fn placeholder_name(author_id: &UserId) -> String {
        format!("user_{}", author_id)
    }
}

/// One rendered line of conversational context: `author: excerpt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntry {
    pub author: String,
    pub excerpt: String,
}

impl ContextEntry {
    /// Builds a context line from a message, truncating its text to
    /// [`CONTEXT_EXCERPT_MAX_CHARS`] characters.
    pub fn from_message(message: &RawMessage) -> Self {
        let text = message.text();
        let excerpt = if text.is_empty() {
            NON_TEXT_PLACEHOLDER.to_string()
        } else {
            truncate_excerpt(&text, CONTEXT_EXCERPT_MAX_CHARS)
        };
        Self {
            author: message.author_display_name.clone(),
            excerpt,
        }
    }
}

impl fmt::Display for ContextEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.author, self.excerpt)
    }
}

/// Keeps the first `max_chars` characters (not bytes) and appends [`ELLIPSIS`] when cut.
pub fn truncate_excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Output of one history query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    /// Assembled entries in chronological order of the target's messages, already bounded by
    /// the configured maximum.
    pub entries: Vec<String>,
    /// Raw messages examined by this call.
    pub scanned_message_count: usize,
    /// True only when no live scan ran and the entries came from the user cache.
    pub served_from_cache: bool,
}

impl QueryResult {
    pub fn empty(scanned_message_count: usize) -> Self {
        Self {
            entries: Vec::new(),
            scanned_message_count,
            served_from_cache: false,
        }
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Gender marker reported by the member lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub fn from_marker(marker: Option<&str>) -> Self {
        match marker.map(|m| m.trim().to_lowercase()).as_deref() {
            Some("male") => Gender::Male,
            Some("female") => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

/// Display name and gender of a group member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub nickname: String,
    pub gender: Gender,
}

impl UserProfile {
    /// Third-person pronoun for prompt templates.
    pub fn pronoun(&self) -> &'static str {
        match self.gender {
            Gender::Male => "he",
            Gender::Female => "she",
            Gender::Unknown => "they",
        }
    }
}
