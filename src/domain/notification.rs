use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Client-facing projection of an eligible content record.
///
/// Built fresh per request; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationItem {
    pub id: String,
    pub record_id: i64,
    pub title: String,
    pub message: String,
    pub link: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub priority: Priority,
    pub published_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    /// Parses a stored priority value; anything unknown or empty is `Normal`.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "low" => Priority::Low,
            "high" => Priority::High,
            _ => Priority::Normal,
        }
    }
}
