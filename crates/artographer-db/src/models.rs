//! Database row types — these map directly to SQLite rows.
//! JSON columns stay as text here; conversion into the API models in
//! artographer-types parses them.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::warn;

use artographer_types::models::{LogEntry, PinnedArtwork, User, UserImage};

pub struct UserRow {
    pub id: String,
    pub user_image_ids: String,
    pub pinned_artwork_ids: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct UserImageRow {
    pub id: String,
    pub user_id: String,
    pub title: Option<String>,
    pub image_url: String,
    pub coordinates: Option<String>,
    pub region: Option<String>,
    pub confidence: Option<f64>,
    pub anchors: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct PinnedArtworkRow {
    pub entry_id: String,
    pub user_id: String,
    pub title: Option<String>,
    pub artwork_details: Option<String>,
    pub location: Option<String>,
    pub tags: Option<String>,
    pub is_favorite: bool,
    pub is_visited: bool,
    pub priority: i64,
    pub created_at: String,
    pub updated_at: String,
}

pub struct LogRow {
    pub id: i64,
    pub user_id: String,
    pub timestamp: String,
    pub message: String,
    pub event_data: String,
    pub created_at: String,
}

pub struct UserStatsRow {
    pub user_id: String,
    pub image_count: i64,
    pub pin_count: i64,
    pub log_count: i64,
    pub last_log_at: Option<String>,
}

/// Fields for a new `user_images` row.
#[derive(Debug, Clone)]
pub struct NewUserImage {
    pub user_id: String,
    pub id: String,
    pub title: Option<String>,
    pub image_url: String,
    pub coordinates: Option<Value>,
    pub region: Option<String>,
    pub confidence: Option<f64>,
    pub anchors: Vec<Value>,
}

/// `None` leaves the stored column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserImagePatch {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub coordinates: Option<Value>,
    pub region: Option<String>,
    pub confidence: Option<f64>,
    pub anchors: Option<Vec<Value>>,
}

#[derive(Debug, Clone)]
pub struct NewPinnedArtwork {
    pub user_id: String,
    pub entry_id: String,
    pub title: Option<String>,
    pub artwork_details: Option<Value>,
    pub location: Option<Value>,
    pub tags: Option<Value>,
    pub is_favorite: bool,
    pub is_visited: bool,
    pub priority: i64,
}

#[derive(Debug, Clone, Default)]
pub struct PinnedArtworkPatch {
    pub title: Option<String>,
    pub artwork_details: Option<Value>,
    pub location: Option<Value>,
    pub tags: Option<Value>,
    pub is_favorite: Option<bool>,
    pub is_visited: Option<bool>,
    pub priority: Option<i64>,
}

impl LogRow {
    /// Stored event payloads are normally JSON objects. Anything that fails
    /// to parse is wrapped as `{"raw": <text>}` so callers still see it.
    pub fn event_data_value(&self) -> Value {
        serde_json::from_str(&self.event_data).unwrap_or_else(|e| {
            warn!("Could not parse event_data for log {}: {}", self.id, e);
            serde_json::json!({ "raw": self.event_data })
        })
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            user_image_ids: parse_id_array(&row.user_image_ids, &row.id),
            pinned_artwork_ids: parse_id_array(&row.pinned_artwork_ids, &row.id),
            created_at: parse_timestamp(&row.created_at),
            updated_at: parse_timestamp(&row.updated_at),
            id: row.id,
        }
    }
}

impl From<UserImageRow> for UserImage {
    fn from(row: UserImageRow) -> Self {
        UserImage {
            coordinates: row.coordinates.as_deref().and_then(|raw| parse_json(raw, &row.id)),
            anchors: match parse_json(&row.anchors, &row.id) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            created_at: parse_timestamp(&row.created_at),
            updated_at: parse_timestamp(&row.updated_at),
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            image_url: row.image_url,
            region: row.region,
            confidence: row.confidence,
        }
    }
}

impl From<PinnedArtworkRow> for PinnedArtwork {
    fn from(row: PinnedArtworkRow) -> Self {
        let key = row.entry_id.as_str();
        PinnedArtwork {
            artwork_details: row.artwork_details.as_deref().and_then(|raw| parse_json(raw, key)),
            location: row.location.as_deref().and_then(|raw| parse_json(raw, key)),
            tags: row.tags.as_deref().and_then(|raw| parse_json(raw, key)),
            created_at: parse_timestamp(&row.created_at),
            updated_at: parse_timestamp(&row.updated_at),
            entry_id: row.entry_id,
            user_id: row.user_id,
            title: row.title,
            is_favorite: row.is_favorite,
            is_visited: row.is_visited,
            priority: row.priority,
        }
    }
}

impl From<LogRow> for LogEntry {
    fn from(row: LogRow) -> Self {
        LogEntry {
            event_data: row.event_data_value(),
            created_at: parse_timestamp(&row.created_at),
            id: row.id,
            user_id: row.user_id,
            timestamp: row.timestamp,
            message: row.message,
        }
    }
}

/// SQLite stores `datetime('now')` as "YYYY-MM-DD HH:MM:SS" without a
/// timezone. Accepts that or RFC 3339.
pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

pub(crate) fn parse_id_array(raw: &str, owner: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Corrupt id array on user '{}': {}", owner, e);
        Vec::new()
    })
}

fn parse_json(raw: &str, owner: &str) -> Option<Value> {
    serde_json::from_str(raw)
        .map_err(|e| warn!("Corrupt JSON column on '{}': {}", owner, e))
        .ok()
}
