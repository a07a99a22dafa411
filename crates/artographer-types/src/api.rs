use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::LogEntry;

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub user_id: Option<String>,
}

// -- User images --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserImageRequest {
    #[serde(rename = "userimage_id")]
    pub userimage_id: Option<String>,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub coordinates: Option<Value>,
    pub region: Option<String>,
    pub confidence: Option<f64>,
    pub anchors: Option<Vec<Value>>,
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserImageRequest {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub coordinates: Option<Value>,
    pub region: Option<String>,
    pub confidence: Option<f64>,
    pub anchors: Option<Vec<Value>>,
}

// -- Pinned artworks --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePinnedArtworkRequest {
    pub entry_id: Option<String>,
    pub title: Option<String>,
    pub artwork_details: Option<Value>,
    pub location: Option<Value>,
    pub tags: Option<Value>,
    pub is_favorite: Option<bool>,
    pub is_visited: Option<bool>,
    pub priority: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePinnedArtworkRequest {
    pub title: Option<String>,
    pub artwork_details: Option<Value>,
    pub location: Option<Value>,
    pub tags: Option<Value>,
    pub is_favorite: Option<bool>,
    pub is_visited: Option<bool>,
    pub priority: Option<i64>,
}

// -- Logs --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLogRequest {
    pub timestamp: Option<String>,
    pub message: Option<String>,
    pub event_data: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateLogResponse {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummaryResponse {
    pub user_id: String,
    pub total: usize,
    pub tasks: BTreeMap<String, usize>,
}

// -- Dashboard --

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub generated_at: DateTime<Utc>,
    pub totals: DashboardTotals,
    pub users: Vec<UserStats>,
    pub recent_logs: Vec<LogEntry>,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardTotals {
    pub users: usize,
    pub images: u64,
    pub pins: u64,
    pub logs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub user_id: String,
    pub image_count: u64,
    pub pin_count: u64,
    pub log_count: u64,
    pub last_activity: Option<String>,
}
