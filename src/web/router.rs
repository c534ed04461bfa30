//! Router configuration for the HTTP API.

use axum::{
    routing::{get, patch},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::UrlsConfig;

use super::handlers::{
    create_folder, delete_blob, get_tree, list_folder, list_root_folder, rename_blob, AppState,
};
use super::middleware::create_cors_layer;

/// Create the main API router.
///
/// Routes are mounted at the configured endpoint paths:
/// - `GET {folders}` / `GET {folders}/*dir` list a directory
/// - `POST {folders}` creates a folder
/// - `PATCH {files}/*full_name` renames, `DELETE {files}/*full_name` deletes
/// - `GET {tree}` returns the directory tree
pub fn create_router(app_state: Arc<AppState>, urls: &UrlsConfig, cors_origins: &[String]) -> Router {
    let folders = urls.folders.trim_end_matches('/');
    let files = urls.files.trim_end_matches('/');

    Router::new()
        .route(folders, get(list_root_folder).post(create_folder))
        .route(&format!("{folders}/*dir"), get(list_folder))
        .route(
            &format!("{files}/*full_name"),
            patch(rename_blob).delete(delete_blob),
        )
        .route(&urls.tree, get(get_tree))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
