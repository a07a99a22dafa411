use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use artographer_types::api::CreateUserRequest;
use artographer_types::models::User;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::require;
use crate::state::{AppState, with_db};

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = with_db(&state, |db| db.list_users()).await?;
    let users: Vec<User> = rows.into_iter().map(User::from).collect();
    Ok(Json(users))
}

/// POST /api/users — 201 when the user is new, 200 when it already existed.
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = require(req.user_id, "userId")?;

    let uid = user_id.clone();
    let (created, row) = with_db(&state, move |db| {
        let created = db.ensure_user(&uid)?;
        Ok((created, db.get_user(&uid)?))
    })
    .await?;
    let row = row.ok_or(ApiError::Internal)?;

    let status = if created {
        info!("Created user {}", user_id);
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(User::from(row))))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = user_id.clone();
    let row = with_db(&state, move |db| db.get_user(&uid))
        .await?
        .ok_or_else(|| ApiError::user_not_found(&user_id))?;
    Ok(Json(User::from(row)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = user_id.clone();
    if !with_db(&state, move |db| db.delete_user(&uid)).await? {
        return Err(ApiError::user_not_found(&user_id));
    }
    info!("Deleted user {} and their images, pins and logs", user_id);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/users/{user_id}/resync — rebuilds `userImageIds` and
/// `pinnedArtworkIds` from the detail tables.
pub async fn resync_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = user_id.clone();
    let row = with_db(&state, move |db| db.resync_user_arrays(&uid))
        .await?
        .ok_or_else(|| ApiError::user_not_found(&user_id))?;
    Ok(Json(User::from(row)))
}
