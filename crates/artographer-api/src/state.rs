use std::sync::Arc;

use tracing::error;

use artographer_db::Database;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    /// How many recent log entries the dashboard endpoint returns.
    pub dashboard_log_limit: u32,
}

impl AppStateInner {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            dashboard_log_limit: 50,
        }
    }
}

/// Runs a blocking DB closure off the async runtime. Database failures are
/// logged here and surface to the client as a bare 500.
pub(crate) async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(|e| {
            error!("DB error: {:#}", e);
            ApiError::Internal
        })
}
