//! Blob (file or folder) handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::{blocking, AppState};
use crate::blob::Blob;
use crate::web::dto::{RenameRequest, ValidatedJson};
use crate::web::error::ApiError;

/// PATCH {files_url}/*full_name - Rename a file or folder.
pub async fn rename_blob(
    State(state): State<Arc<AppState>>,
    Path(full_name): Path<String>,
    ValidatedJson(req): ValidatedJson<RenameRequest>,
) -> Result<Json<Blob>, ApiError> {
    let blob = blocking(&state, move |service| service.rename(&full_name, &req.name)).await?;
    tracing::info!(full_name = %blob.full_name, "Blob renamed");
    Ok(Json(blob))
}

/// DELETE {files_url}/*full_name - Delete a file or folder.
///
/// Answers `false` when there was nothing to delete.
pub async fn delete_blob(
    State(state): State<Arc<AppState>>,
    Path(full_name): Path<String>,
) -> Result<Json<bool>, ApiError> {
    let target = full_name.clone();
    let deleted = blocking(&state, move |service| service.delete(&target)).await?;
    if deleted {
        tracing::info!(%full_name, "Blob deleted");
    }
    Ok(Json(deleted))
}
