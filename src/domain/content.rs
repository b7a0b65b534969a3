use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published article row from the content store, with its key-value
/// metadata bag aggregated into a JSON object.
///
/// The store owns these records; this service only reads them.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContentRecord {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub excerpt: String,
    pub permalink: String,
    pub published_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub meta: serde_json::Value,
}

impl ContentRecord {
    /// Looks up a metadata value by key. Absent keys and non-string values
    /// read as `None`.
    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta.get(key).and_then(|v| v.as_str())
    }

    /// Like [`meta_value`](Self::meta_value), but treats empty strings as
    /// absent too. Metadata rows are stored as free text, so "" and a
    /// missing row mean the same thing.
    pub fn meta_text(&self, key: &str) -> Option<&str> {
        self.meta_value(key).filter(|v| !v.trim().is_empty())
    }
}
