//! Store state.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blob::{Blob, TreeNode};

/// Client-side id of a listed blob.
///
/// Stable across renames, so a saved blob replaces its entry in place even
/// after its `full_name` changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobId(Uuid);

impl BlobId {
    /// Generate a fresh id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A blob as it appears in the current listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedBlob {
    pub id: BlobId,
    pub blob: Blob,
    /// Not yet created on the server (new folder being named).
    pub draft: bool,
}

impl ListedBlob {
    /// Wrap a server blob with a fresh id.
    pub fn new(blob: Blob) -> Self {
        Self {
            id: BlobId::new(),
            blob,
            draft: false,
        }
    }

    /// Wrap an unsaved blob with a fresh id.
    pub fn draft(blob: Blob) -> Self {
        Self {
            draft: true,
            ..Self::new(blob)
        }
    }
}

/// Everything the UI renders from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    /// Directory currently shown.
    pub path: String,
    /// Current listing, `..` placeholder first when below the root.
    pub blobs: Vec<ListedBlob>,
    /// Selected entry, if any.
    pub selected: Option<BlobId>,
    /// The selected entry is being renamed.
    pub editing: bool,
    /// A network action is in flight.
    pub loading: bool,
    /// A new folder draft is being named.
    pub creating: bool,
    /// Navigation tree.
    pub tree: Vec<TreeNode>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            blobs: Vec::new(),
            selected: None,
            editing: false,
            loading: false,
            creating: false,
            tree: Vec::new(),
        }
    }
}

impl StoreState {
    /// Listed entry with `id`.
    pub fn get(&self, id: BlobId) -> Option<&ListedBlob> {
        self.blobs.iter().find(|b| b.id == id)
    }

    /// Listed entry with `full_name`, ignoring the placeholder.
    pub fn find(&self, full_name: &str) -> Option<&ListedBlob> {
        self.blobs
            .iter()
            .find(|b| !b.blob.is_placeholder() && b.blob.full_name == full_name)
    }

    /// Currently selected entry.
    pub fn selected_blob(&self) -> Option<&ListedBlob> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Whether the selected entry may be renamed or deleted.
    pub fn selection_is_editable(&self) -> bool {
        self.selected_blob()
            .is_some_and(|b| !b.blob.is_placeholder())
    }

    /// `editing` implies an editable selection.
    pub fn is_consistent(&self) -> bool {
        !self.editing || self.selection_is_editable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = StoreState::default();
        assert_eq!(state.path, "/");
        assert!(state.selected_blob().is_none());
        assert!(!state.selection_is_editable());
        assert!(state.is_consistent());
    }

    #[test]
    fn test_placeholder_is_not_editable() {
        let up = ListedBlob::new(Blob::parent_placeholder("/docs", "").unwrap());
        let state = StoreState {
            selected: Some(up.id),
            blobs: vec![up],
            editing: true,
            ..StoreState::default()
        };

        assert!(state.selected_blob().is_some());
        assert!(!state.selection_is_editable());
        assert!(!state.is_consistent());
    }

    #[test]
    fn test_find_skips_placeholder() {
        let up = ListedBlob::new(Blob::parent_placeholder("/docs", "").unwrap());
        let state = StoreState {
            blobs: vec![up],
            ..StoreState::default()
        };
        assert!(state.find("/").is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(BlobId::new(), BlobId::new());
    }
}
