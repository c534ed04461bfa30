//! API handlers.

pub mod blob;
pub mod folder;
pub mod tree;

pub use blob::*;
pub use folder::*;
pub use tree::*;

use std::sync::Arc;

use crate::file::FileService;
use crate::web::error::ApiError;

/// Shared state of the HTTP API.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Filesystem service rooted at the configured storage directory.
    pub service: FileService,
}

impl AppState {
    /// Create a new AppState.
    pub fn new(service: FileService) -> Self {
        Self { service }
    }
}

/// Run a filesystem operation on the blocking pool.
async fn blocking<T, F>(state: &Arc<AppState>, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&FileService) -> crate::Result<T> + Send + 'static,
{
    let service = state.service.clone();
    Ok(tokio::task::spawn_blocking(move || op(&service)).await??)
}
