//! Blob API client.
//!
//! The store talks to the server only through the [`BlobApi`] trait so tests
//! can swap in an in-memory implementation. [`HttpBlobApi`] is the real one.

mod error;
mod http;

pub use error::ClientError;
pub use http::{truthy, HttpBlobApi};

use std::future::Future;

use crate::blob::{Blob, TreeNode};

/// Result type for blob API calls.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Remote operations on blobs.
///
/// Implementations never touch store state; they only translate requests and
/// responses. Failures are returned untouched and never retried.
pub trait BlobApi: Send + Sync {
    /// Rename `blob` to `new_name`, returning the blob as the server sees it.
    fn update(&self, blob: &Blob, new_name: &str) -> impl Future<Output = ClientResult<Blob>> + Send;

    /// Delete `blob`. Resolves with whether the server reported a deletion.
    fn delete(&self, blob: &Blob) -> impl Future<Output = ClientResult<bool>> + Send;

    /// List the entries of `dir`.
    fn list(&self, dir: &str) -> impl Future<Output = ClientResult<Vec<Blob>>> + Send;

    /// Create a folder named `name` inside `dir`.
    fn create_dir(&self, dir: &str, name: &str) -> impl Future<Output = ClientResult<Blob>> + Send;

    /// Fetch the directory tree.
    fn tree(&self) -> impl Future<Output = ClientResult<Vec<TreeNode>>> + Send;
}
