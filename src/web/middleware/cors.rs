//! CORS for hosts that embed the manager from another origin.
//!
//! Rename, delete and folder creation send JSON, so browsers preflight every
//! one of them; preflight answers are cached for an hour.

use std::time::Duration;

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Methods used by the blob API.
const API_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PATCH, Method::DELETE];

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// CORS layer for the configured origins; any origin when none is usable.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(API_METHODS)
        .allow_headers([CONTENT_TYPE, ACCEPT])
        .max_age(PREFLIGHT_MAX_AGE);

    let allowed = allowed_origins(origins);
    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(allowed)
    }
}

fn allowed_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| {
            match HeaderValue::from_str(origin.trim().trim_end_matches('/')) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(%origin, "Ignoring unusable CORS origin");
                    None
                }
            }
        })
        .collect()
}
