//! Directory tree handler.

use axum::{extract::State, Json};
use std::sync::Arc;

use super::{blocking, AppState};
use crate::blob::TreeNode;
use crate::web::error::ApiError;

/// GET {tree_url} - Directory tree below the root.
pub async fn get_tree(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TreeNode>>, ApiError> {
    let tree = blocking(&state, |service| service.tree()).await?;
    Ok(Json(tree))
}
