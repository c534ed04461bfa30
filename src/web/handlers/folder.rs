//! Folder handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{blocking, AppState};
use crate::blob::Blob;
use crate::web::dto::{CreateFolderRequest, ValidatedJson};
use crate::web::error::ApiError;

/// GET {folders_url} - List the root directory.
pub async fn list_root_folder(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Blob>>, ApiError> {
    let blobs = blocking(&state, |service| service.list("/")).await?;
    Ok(Json(blobs))
}

/// GET {folders_url}/*dir - List a directory.
pub async fn list_folder(
    State(state): State<Arc<AppState>>,
    Path(dir): Path<String>,
) -> Result<Json<Vec<Blob>>, ApiError> {
    let blobs = blocking(&state, move |service| service.list(&dir)).await?;
    Ok(Json(blobs))
}

/// POST {folders_url} - Create a folder.
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateFolderRequest>,
) -> Result<(StatusCode, Json<Blob>), ApiError> {
    let blob = blocking(&state, move |service| service.create_dir(&req.dir, &req.name)).await?;
    tracing::info!(full_name = %blob.full_name, "Folder created");
    Ok((StatusCode::CREATED, Json(blob)))
}
