//! HTTP API for filesys.
//!
//! Serves the folder listing, rename, delete, folder creation and tree
//! endpoints the [`client`](crate::client) consumes.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;
