//! Feed (submission) status model
//!
//! A `FeedStatus` is freshly derived from each registry response and never
//! mutated locally; re-polling replaces the whole value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side processing state of a submitted feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedState {
    Pending,
    Accepted,
    Rejected,
    Unknown,
}

/// Structured error reported for a feed or one of its items
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedError {
    pub code: Option<String>,
    pub message: String,
    pub attr_id: Option<u32>,
}

/// Snapshot of a feed's processing state
#[derive(Debug, Clone, Serialize)]
pub struct FeedStatus {
    pub feed_id: String,
    pub state: FeedState,
    pub items_count: u32,
    pub items_processed: u32,
    pub items_accepted: u32,
    pub items_rejected: u32,
    pub errors: Vec<FeedError>,
    /// Registry-assigned identifier code, when any item carries one
    pub assigned_gtin: Option<String>,
    pub checked_at: DateTime<Utc>,
}

/// Wire shape of the registry's feed-status `result` payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedStatusPayload {
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    #[serde(default)]
    pub items_count: u32,
    #[serde(default)]
    pub items_processed: u32,
    #[serde(default)]
    pub items_accepted: u32,
    #[serde(default)]
    pub items_rejected: u32,
    #[serde(default)]
    pub errors: Vec<FeedErrorPayload>,
    #[serde(default)]
    pub item: Vec<FeedItemPayload>,
}

/// Wire shape of one per-item result entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedItemPayload {
    #[serde(default)]
    pub gtin: Option<String>,
    #[serde(default)]
    pub good_id: Option<u64>,
    #[serde(default)]
    pub errors: Vec<FeedErrorPayload>,
}

/// Wire shape of one error entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedErrorPayload {
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default, alias = "text", alias = "error")]
    pub message: String,
    #[serde(default)]
    pub attr_id: Option<u32>,
}

impl FeedErrorPayload {
    fn into_error(self) -> FeedError {
        let code = self.code.map(|c| match c {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });
        FeedError {
            code,
            message: self.message,
            attr_id: self.attr_id,
        }
    }
}

impl FeedStatus {
    /// Derive a status snapshot from the registry's `result` payload
    pub fn from_payload(feed_id: impl Into<String>, payload: FeedStatusPayload) -> Self {
        let state = interpret_state(&payload);

        // First identifier code found in any per-item result entry
        let assigned_gtin = payload
            .item
            .iter()
            .filter_map(|i| i.gtin.as_deref())
            .map(str::trim)
            .find(|g| !g.is_empty())
            .map(str::to_string);

        let mut errors: Vec<FeedError> = payload
            .errors
            .into_iter()
            .map(FeedErrorPayload::into_error)
            .collect();
        for item in payload.item {
            errors.extend(item.errors.into_iter().map(FeedErrorPayload::into_error));
        }

        Self {
            feed_id: feed_id.into(),
            state,
            items_count: payload.items_count,
            items_processed: payload.items_processed,
            items_accepted: payload.items_accepted,
            items_rejected: payload.items_rejected,
            errors,
            assigned_gtin,
            checked_at: Utc::now(),
        }
    }
}

/// Map the server's status field (string or numeric) plus per-item counters
/// to a [`FeedState`].
fn interpret_state(payload: &FeedStatusPayload) -> FeedState {
    if payload.items_rejected > 0 {
        return FeedState::Rejected;
    }

    let status_text = match &payload.status {
        Some(serde_json::Value::String(s)) => s.to_lowercase(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    if ["reject", "error", "отклон"]
        .iter()
        .any(|k| status_text.contains(k))
    {
        return FeedState::Rejected;
    }
    if ["accept", "success", "done", "принят", "готов", "3"]
        .iter()
        .any(|k| status_text.contains(k))
    {
        return FeedState::Accepted;
    }
    if ["wait", "process", "progress", "moder", "обработ", "0", "1", "2"]
        .iter()
        .any(|k| status_text.contains(k))
    {
        return FeedState::Pending;
    }

    if payload.items_count > 0 && payload.items_accepted == payload.items_count {
        return FeedState::Accepted;
    }
    if payload.items_processed < payload.items_count {
        return FeedState::Pending;
    }

    FeedState::Unknown
}
