//! Data Transfer Objects for the HTTP API.
//!
//! Responses are the domain types themselves ([`Blob`](crate::blob::Blob),
//! [`TreeNode`](crate::blob::TreeNode)), so only requests live here.

pub mod request;
pub mod validation;

pub use request::*;
pub use validation::ValidatedJson;
