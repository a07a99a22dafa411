use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use artographer_db::models::{NewUserImage, UserImagePatch};
use artographer_types::api::{CreateUserImageRequest, UpdateUserImageRequest};
use artographer_types::models::UserImage;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::require;
use crate::state::{AppState, with_db};

fn image_not_found(image_id: &str) -> ApiError {
    ApiError::NotFound(format!("image '{}'", image_id))
}

pub async fn list_images(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = user_id.clone();
    let rows = with_db(&state, move |db| {
        if db.get_user(&uid)?.is_none() {
            return Ok(None);
        }
        db.list_user_images(&uid).map(Some)
    })
    .await?
    .ok_or_else(|| ApiError::user_not_found(&user_id))?;

    let images: Vec<UserImage> = rows.into_iter().map(UserImage::from).collect();
    Ok(Json(images))
}

/// POST /api/users/{user_id}/images — creates the user on first write.
pub async fn create_image(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(req): ApiJson<CreateUserImageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let image = NewUserImage {
        id: require(req.userimage_id, "userimage_id")?,
        image_url: require(req.image_url, "imageUrl")?,
        user_id,
        title: req.title,
        coordinates: req.coordinates,
        region: req.region,
        confidence: req.confidence,
        anchors: req.anchors.unwrap_or_default(),
    };

    let new_image = image.clone();
    let row = with_db(&state, move |db| {
        if !db.insert_user_image(&new_image)? {
            return Ok(None);
        }
        db.get_user_image(&new_image.user_id, &new_image.id)
    })
    .await?
    .ok_or_else(|| ApiError::Conflict(format!("image '{}'", image.id)))?;

    info!("User {} added image {}", image.user_id, image.id);
    Ok((StatusCode::CREATED, Json(UserImage::from(row))))
}

pub async fn get_image(
    State(state): State<AppState>,
    Path((user_id, image_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let iid = image_id.clone();
    let row = with_db(&state, move |db| db.get_user_image(&user_id, &iid))
        .await?
        .ok_or_else(|| image_not_found(&image_id))?;
    Ok(Json(UserImage::from(row)))
}

pub async fn update_image(
    State(state): State<AppState>,
    Path((user_id, image_id)): Path<(String, String)>,
    ApiJson(req): ApiJson<UpdateUserImageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = UserImagePatch {
        title: req.title,
        image_url: req.image_url,
        coordinates: req.coordinates,
        region: req.region,
        confidence: req.confidence,
        anchors: req.anchors,
    };

    let iid = image_id.clone();
    let row = with_db(&state, move |db| {
        if !db.update_user_image(&user_id, &iid, &patch)? {
            return Ok(None);
        }
        db.get_user_image(&user_id, &iid)
    })
    .await?
    .ok_or_else(|| image_not_found(&image_id))?;

    Ok(Json(UserImage::from(row)))
}

pub async fn delete_image(
    State(state): State<AppState>,
    Path((user_id, image_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let (uid, iid) = (user_id.clone(), image_id.clone());
    if !with_db(&state, move |db| db.delete_user_image(&uid, &iid)).await? {
        return Err(image_not_found(&image_id));
    }
    info!("User {} removed image {}", user_id, image_id);
    Ok(StatusCode::NO_CONTENT)
}
