//! Wire types for `get_group_msg_history` and `get_group_member_info`, and their conversion
//! to core types. Only the fields the crawler consumes are modelled.

use once_cell::sync::Lazy;
use portrayal_core::{RawMessage, UserId};
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

/// `[CQ:image,file=...]` style codes embedded in string-format messages.
static CQ_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[CQ:[^\]]*\]").expect("valid regex"));

/// Numbers arrive as JSON numbers from most implementations and as strings from a few.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum LooseId {
    Int(i64),
    Str(String),
}

impl LooseId {
    fn as_i64(&self) -> Option<i64> {
        match self {
            LooseId::Int(n) => Some(*n),
            LooseId::Str(s) => s.trim().parse().ok(),
        }
    }

    fn into_string(self) -> String {
        match self {
            LooseId::Int(n) => n.to_string(),
            LooseId::Str(s) => s,
        }
    }
}

/// Records stay untyped here so that one malformed message does not fail the whole page.
#[derive(Debug, Deserialize)]
pub(crate) struct HistoryData {
    #[serde(default)]
    pub messages: Vec<serde_json::Value>,
}

impl HistoryData {
    /// Converts every record that decodes; the others are logged and skipped.
    pub(crate) fn into_raw_messages(self) -> Vec<RawMessage> {
        let total = self.messages.len();
        let page: Vec<RawMessage> = self
            .messages
            .into_iter()
            .filter_map(|value| {
                let message_id = value.get("message_id").cloned();
                match serde_json::from_value::<WireMessage>(value) {
                    Ok(message) => Some(message.into_raw()),
                    Err(e) => {
                        warn!(?message_id, error = %e, "Skipping undecodable history record");
                        None
                    }
                }
            })
            .collect();
        if page.len() < total {
            warn!(skipped = total - page.len(), total, "History page had undecodable records");
        }
        page
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireSender {
    pub user_id: LooseId,
    #[serde(default)]
    pub card: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireSegment {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// `message` is a segment array in array format and a CQ-coded string in string format.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireContent {
    Segments(Vec<WireSegment>),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMessage {
    #[serde(default)]
    pub message_id: Option<LooseId>,
    #[serde(default)]
    pub message_seq: Option<LooseId>,
    #[serde(default)]
    pub time: i64,
    pub sender: WireSender,
    #[serde(default)]
    pub message: Option<WireContent>,
    #[serde(default)]
    pub raw_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MemberInfo {
    #[serde(default)]
    pub card: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
}

/// First non-blank candidate, trimmed.
pub(crate) fn first_non_blank(candidates: &[Option<&str>]) -> Option<String> {
    candidates
        .iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn strip_cq_codes(text: &str) -> String {
    CQ_CODE.replace_all(text, "").into_owned()
}

impl WireMessage {
    fn text_segments(&self) -> Vec<String> {
        match &self.message {
            Some(WireContent::Segments(segments)) => segments
                .iter()
                .filter(|seg| seg.kind == "text")
                .filter_map(|seg| seg.data.get("text").and_then(|t| t.as_str()))
                .map(str::to_string)
                .collect(),
            Some(WireContent::Text(text)) => vec![strip_cq_codes(text)],
            None => self
                .raw_message
                .as_deref()
                .map(|raw| vec![strip_cq_codes(raw)])
                .unwrap_or_default(),
        }
    }

    pub(crate) fn into_raw(self) -> RawMessage {
        let text_segments = self.text_segments();
        let id = self.message_id.as_ref().and_then(LooseId::as_i64);
        let sequence_number = self.message_seq.as_ref().and_then(LooseId::as_i64);
        let author_display_name =
            first_non_blank(&[self.sender.card.as_deref(), self.sender.nickname.as_deref()]);
        let author_id = UserId(self.sender.user_id.into_string());
        let author_display_name =
            author_display_name.unwrap_or_else(|| RawMessage::placeholder_name(&author_id));

        RawMessage {
            id,
            sequence_number,
            author_id,
            author_display_name,
            timestamp: self.time,
            text_segments,
        }
    }
}
