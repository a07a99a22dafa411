use axum::{Json, extract::State, response::IntoResponse};

use artographer_types::api::{DashboardResponse, DashboardTotals, UserStats};
use artographer_types::models::LogEntry;

use crate::error::ApiError;
use crate::state::{AppState, with_db};

/// GET /api/dashboard — the single endpoint the static dashboard polls.
pub async fn get_dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let limit = state.dashboard_log_limit;
    let (stats, recent) =
        with_db(&state, move |db| Ok((db.dashboard_stats()?, db.recent_logs(limit)?))).await?;

    let users: Vec<UserStats> = stats
        .into_iter()
        .map(|row| UserStats {
            user_id: row.user_id,
            image_count: row.image_count.max(0) as u64,
            pin_count: row.pin_count.max(0) as u64,
            log_count: row.log_count.max(0) as u64,
            last_activity: row.last_log_at,
        })
        .collect();

    let totals = DashboardTotals {
        users: users.len(),
        images: users.iter().map(|u| u.image_count).sum(),
        pins: users.iter().map(|u| u.pin_count).sum(),
        logs: users.iter().map(|u| u.log_count).sum(),
    };

    Ok(Json(DashboardResponse {
        generated_at: chrono::Utc::now(),
        totals,
        users,
        recent_logs: recent.into_iter().map(LogEntry::from).collect(),
    }))
}
