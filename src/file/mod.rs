//! Server-side file management for filesys.
//!
//! This module provides:
//! - Rooted, traversal-safe path resolution
//! - Directory listing projected into [`Blob`](crate::blob::Blob)s
//! - Rename, delete and folder creation
//! - The directory tree used for navigation

mod service;
mod storage;

pub use service::FileService;
pub use storage::FileStorage;

/// Maximum length for a file or folder name (in characters).
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Maximum directory depth walked when building the tree.
pub const MAX_TREE_DEPTH: usize = 10;
