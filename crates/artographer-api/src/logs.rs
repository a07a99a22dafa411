use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::SecondsFormat;
use tracing::debug;

use artographer_types::api::{CreateLogRequest, CreateLogResponse, TaskSummaryResponse};
use artographer_types::models::LogEntry;
use artographer_types::tasks;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::require;
use crate::state::{AppState, with_db};

async fn load_logs(state: &AppState, user_id: &str) -> Result<Vec<LogEntry>, ApiError> {
    let uid = user_id.to_string();
    let rows = with_db(state, move |db| {
        if db.get_user(&uid)?.is_none() {
            return Ok(None);
        }
        db.get_user_logs(&uid).map(Some)
    })
    .await?
    .ok_or_else(|| ApiError::user_not_found(user_id))?;

    Ok(rows.into_iter().map(LogEntry::from).collect())
}

/// GET /api/users/{user_id}/logs — oldest event first.
pub async fn list_logs(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(load_logs(&state, &user_id).await?))
}

/// GET /api/users/{user_id}/logs/tasks — event counts per `system{S}_task{N}`.
pub async fn task_summary(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let logs = load_logs(&state, &user_id).await?;
    Ok(Json(TaskSummaryResponse {
        total: logs.len(),
        tasks: tasks::count_by_task(&logs),
        user_id,
    }))
}

/// POST /api/users/{user_id}/logs — `timestamp` defaults to the server
/// clock, `eventData` to an empty object.
pub async fn create_log(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(req): ApiJson<CreateLogRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = require(req.message, "message")?;
    let timestamp = req
        .timestamp
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    let event_data = req.event_data.unwrap_or_else(|| serde_json::json!({}));

    let uid = user_id.clone();
    let msg = message.clone();
    let id = with_db(&state, move |db| db.insert_log(&uid, &timestamp, &msg, &event_data)).await?;

    debug!("Logged '{}' for user {} (id {})", message, user_id, id);
    Ok((StatusCode::CREATED, Json(CreateLogResponse { id })))
}
