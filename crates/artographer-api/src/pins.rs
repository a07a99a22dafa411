use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use artographer_db::models::{NewPinnedArtwork, PinnedArtworkPatch};
use artographer_types::api::{CreatePinnedArtworkRequest, UpdatePinnedArtworkRequest};
use artographer_types::models::PinnedArtwork;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::require;
use crate::state::{AppState, with_db};

fn pin_not_found(entry_id: &str) -> ApiError {
    ApiError::NotFound(format!("pinned entry '{}'", entry_id))
}

pub async fn list_pins(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = user_id.clone();
    let rows = with_db(&state, move |db| {
        if db.get_user(&uid)?.is_none() {
            return Ok(None);
        }
        db.list_pinned_artworks(&uid).map(Some)
    })
    .await?
    .ok_or_else(|| ApiError::user_not_found(&user_id))?;

    let pins: Vec<PinnedArtwork> = rows.into_iter().map(PinnedArtwork::from).collect();
    Ok(Json(pins))
}

pub async fn create_pin(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(req): ApiJson<CreatePinnedArtworkRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pin = NewPinnedArtwork {
        entry_id: require(req.entry_id, "entryId")?,
        user_id,
        title: req.title,
        artwork_details: req.artwork_details,
        location: req.location,
        tags: req.tags,
        is_favorite: req.is_favorite.unwrap_or(false),
        is_visited: req.is_visited.unwrap_or(false),
        priority: req.priority.unwrap_or(0),
    };

    let new_pin = pin.clone();
    let row = with_db(&state, move |db| {
        if !db.insert_pinned_artwork(&new_pin)? {
            return Ok(None);
        }
        db.get_pinned_artwork(&new_pin.user_id, &new_pin.entry_id)
    })
    .await?
    .ok_or_else(|| ApiError::Conflict(format!("pinned entry '{}'", pin.entry_id)))?;

    info!("User {} pinned entry {}", pin.user_id, pin.entry_id);
    Ok((StatusCode::CREATED, Json(PinnedArtwork::from(row))))
}

pub async fn get_pin(
    State(state): State<AppState>,
    Path((user_id, entry_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let eid = entry_id.clone();
    let row = with_db(&state, move |db| db.get_pinned_artwork(&user_id, &eid))
        .await?
        .ok_or_else(|| pin_not_found(&entry_id))?;
    Ok(Json(PinnedArtwork::from(row)))
}

pub async fn update_pin(
    State(state): State<AppState>,
    Path((user_id, entry_id)): Path<(String, String)>,
    ApiJson(req): ApiJson<UpdatePinnedArtworkRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = PinnedArtworkPatch {
        title: req.title,
        artwork_details: req.artwork_details,
        location: req.location,
        tags: req.tags,
        is_favorite: req.is_favorite,
        is_visited: req.is_visited,
        priority: req.priority,
    };

    let eid = entry_id.clone();
    let row = with_db(&state, move |db| {
        if !db.update_pinned_artwork(&user_id, &eid, &patch)? {
            return Ok(None);
        }
        db.get_pinned_artwork(&user_id, &eid)
    })
    .await?
    .ok_or_else(|| pin_not_found(&entry_id))?;

    Ok(Json(PinnedArtwork::from(row)))
}

pub async fn delete_pin(
    State(state): State<AppState>,
    Path((user_id, entry_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let (uid, eid) = (user_id.clone(), entry_id.clone());
    if !with_db(&state, move |db| db.delete_pinned_artwork(&uid, &eid)).await? {
        return Err(pin_not_found(&entry_id));
    }
    info!("User {} unpinned entry {}", user_id, entry_id);
    Ok(StatusCode::NO_CONTENT)
}
