use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;

use crate::{
    auth::extractors::CurrentUser,
    error::{ApiError, Result},
    photos::{
        dto::{Pagination, PhotoSource, UploadRequest},
        repo::{self, Photo},
        service,
    },
    state::AppState,
};

const MAX_PAGE_SIZE: i64 = 100;

#[instrument(skip(state, current, payload))]
pub async fn upload(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Json(payload): Json<UploadRequest>,
) -> Result<(StatusCode, Json<Photo>)> {
    if payload.image.trim().is_empty() {
        return Err(ApiError::Validation("Image payload is empty".into()));
    }
    let source: PhotoSource = payload
        .source
        .parse()
        .map_err(|_| ApiError::Validation("Source must be 'capture' or 'import'".into()))?;

    let photo = service::upload_photo(&state, current.id, source, &payload.image).await?;
    Ok((StatusCode::CREATED, Json(photo)))
}

#[instrument(skip(state, current))]
pub async fn list_photos(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<Photo>>> {
    let (skip, limit) = p.clamped(MAX_PAGE_SIZE);
    let photos = repo::list_by_user(&state.db, current.id, limit, skip).await?;
    Ok(Json(photos))
}

#[instrument(skip(state, current))]
pub async fn delete_photo(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    service::delete_photo(&state, current.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
