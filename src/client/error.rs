//! Error types for the blob API client.

use thiserror::Error;

/// Errors returned by [`BlobApi`](super::BlobApi) implementations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network or decoding failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// An endpoint URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// HTTP status of a [`ClientError::Status`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
