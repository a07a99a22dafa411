pub mod dashboard;
pub mod error;
pub mod extract;
pub mod images;
pub mod logs;
pub mod pins;
pub mod state;
pub mod users;

use axum::Json;
use axum::response::IntoResponse;

pub use error::ApiError;
pub use extract::ApiJson;
pub use state::{AppState, AppStateInner};

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Presence check for a required string field: missing or blank is a 400.
pub(crate) fn require(value: Option<String>, field: &'static str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::MissingField(field)),
    }
}
