use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A participant. The two id arrays mirror the rows in `user_images` and
/// `pinned_artworks` that belong to this user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub user_image_ids: Vec<String>,
    pub pinned_artwork_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A screenshot/photo annotation with world coordinates and anchor metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserImage {
    #[serde(rename = "userimage_id")]
    pub id: String,
    pub user_id: String,
    pub title: Option<String>,
    pub image_url: String,
    pub coordinates: Option<Value>,
    pub region: Option<String>,
    pub confidence: Option<f64>,
    pub anchors: Vec<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A pinned reference to an external artwork record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedArtwork {
    pub entry_id: String,
    pub user_id: String,
    pub title: Option<String>,
    pub artwork_details: Option<Value>,
    pub location: Option<Value>,
    pub tags: Option<Value>,
    pub is_favorite: bool,
    pub is_visited: bool,
    pub priority: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One telemetry event. `timestamp` is whatever the client sent;
/// `created_at` is when the server stored it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: i64,
    pub user_id: String,
    pub timestamp: String,
    pub message: String,
    pub event_data: Value,
    pub created_at: DateTime<Utc>,
}
