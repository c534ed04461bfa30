//! Blob (file or folder) descriptors.
//!
//! A [`Blob`] is the projection of one filesystem entry that the UI works with.
//! It is rebuilt on every listing and never persisted. Paths are `/`-rooted
//! relative to the storage root: the root itself is `/`, a folder below it is
//! `/docs`, and a file in that folder has the full name `/docs/a.txt`.

mod builder;
mod tree;

pub(crate) use builder::encode_path;
pub use builder::{BlobBuilder, FsEntry};
pub use tree::TreeNode;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the synthetic "go up one level" entry.
pub const PARENT_PLACEHOLDER: &str = "..";

/// Mime category of directories.
pub const DIR_CATEGORY: &str = "dir";

/// Mime category used when no configured category matches.
pub const FILE_CATEGORY: &str = "file";

/// Whether a blob is a regular file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobKind {
    File,
    Dir,
}

/// File or folder metadata as surfaced to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    /// File name including its extension.
    pub name: String,
    /// Lower-cased extension without the dot, empty when there is none.
    #[serde(default)]
    pub extension: String,
    /// Mime category (`image`, `media`, `document`, `file`, `dir`, ...).
    pub mime: String,
    /// Full mime type; `None` for directories.
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(rename = "type")]
    pub kind: BlobKind,
    /// Size in bytes; `None` for directories.
    #[serde(default)]
    pub bytes: Option<u64>,
    pub updated_at: DateTime<Utc>,
    /// Primary thumbnail or icon URL.
    pub thumb: String,
    /// Thumbnail URL per configured size (images only).
    #[serde(default)]
    pub thumbs: BTreeMap<String, String>,
    /// Parent directory path.
    pub dir: String,
    /// Path-qualified name, always `join_path(dir, name)`.
    pub full_name: String,
    /// Publicly resolvable address.
    pub url: String,
}

impl Blob {
    /// Whether the blob is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == BlobKind::Dir
    }

    /// Whether the blob is the parent-navigation placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.name == PARENT_PLACEHOLDER
    }

    /// Build the `..` entry for a listing of `dir`.
    ///
    /// Returns `None` at the root. The placeholder's `full_name` is the parent
    /// directory, which is where opening it navigates to.
    pub fn parent_placeholder(dir: &str, dir_icon: &str) -> Option<Blob> {
        let parent = parent_path(dir)?;
        Some(Blob {
            name: PARENT_PLACEHOLDER.to_string(),
            extension: String::new(),
            mime: DIR_CATEGORY.to_string(),
            mimetype: None,
            kind: BlobKind::Dir,
            bytes: None,
            updated_at: DateTime::<Utc>::default(),
            thumb: dir_icon.to_string(),
            thumbs: BTreeMap::new(),
            dir: dir.to_string(),
            full_name: parent,
            url: String::new(),
        })
    }

    /// Create an unsaved folder entry in `dir`, used while the user types a
    /// name for a new folder.
    pub fn draft_dir(dir: &str, name: &str, dir_icon: &str) -> Blob {
        Blob {
            name: name.to_string(),
            extension: String::new(),
            mime: DIR_CATEGORY.to_string(),
            mimetype: None,
            kind: BlobKind::Dir,
            bytes: None,
            updated_at: Utc::now(),
            thumb: dir_icon.to_string(),
            thumbs: BTreeMap::new(),
            dir: dir.to_string(),
            full_name: join_path(dir, name),
            url: String::new(),
        }
    }
}

/// Join a `/`-rooted directory and an entry name with exactly one `/`.
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    format!("{dir}/{name}")
}

/// Parent of a `/`-rooted path, `None` for the root.
pub fn parent_path(path: &str) -> Option<String> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind('/') {
        Some(0) | None => Some("/".to_string()),
        Some(idx) => Some(trimmed[..idx].to_string()),
    }
}

/// Split a full name into its parent directory and entry name.
pub fn split_path(full_name: &str) -> (String, String) {
    let trimmed = full_name.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => {
            let dir = if idx == 0 { "/" } else { &trimmed[..idx] };
            (dir.to_string(), trimmed[idx + 1..].to_string())
        }
        None => ("/".to_string(), trimmed.to_string()),
    }
}
