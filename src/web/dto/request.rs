//! Request DTOs for the HTTP API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{entry_name, no_control_chars};

/// Rename request for `PATCH {files_url}/*full_name`.
#[derive(Debug, Deserialize, Validate)]
pub struct RenameRequest {
    /// New entry name, extension included.
    #[validate(
        length(min = 1, max = 255, message = "Name is too long"),
        custom(function = "entry_name")
    )]
    pub name: String,
}

/// Folder creation request for `POST {folders_url}`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Parent directory; the root when omitted.
    #[serde(default = "default_dir")]
    #[validate(custom(function = "no_control_chars"))]
    pub dir: String,
    /// Name of the new folder.
    #[validate(
        length(min = 1, max = 255, message = "Name is too long"),
        custom(function = "entry_name")
    )]
    pub name: String,
}

fn default_dir() -> String {
    "/".to_string()
}
