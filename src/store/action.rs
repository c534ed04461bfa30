//! Store actions.

use crate::blob::Blob;

use super::state::BlobId;

/// Name given to a new folder draft.
pub const NEW_FOLDER_NAME: &str = "new folder";

/// Everything the UI can ask the store to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Navigate to a directory.
    ChangePath(String),
    /// Reload the navigation tree.
    FetchTree,
    /// Select a listed entry.
    SelectBlob(BlobId),
    /// Clear the selection.
    DeselectBlob,
    /// Start renaming the selected entry.
    StartEditBlob,
    /// Start naming a new folder in the current directory.
    StartCreateFolder,
    /// Leave edit mode, dropping any folder draft.
    CancelEdit,
    /// Rename entry `id` to `name`, or create it when it is a draft.
    SaveBlob { id: BlobId, name: String },
    /// Delete the selected entry.
    DeleteBlob,
    /// Open an entry: directories navigate, files are handed to the host.
    ///
    /// `size` picks a thumbnail size for images; unknown sizes use the
    /// blob's own URL.
    OpenBlob { blob: Blob, size: Option<String> },
}

impl Action {
    /// Whether the action talks to the server and needs the in-flight guard.
    pub fn is_network(&self) -> bool {
        match self {
            Action::ChangePath(_)
            | Action::FetchTree
            | Action::SaveBlob { .. }
            | Action::DeleteBlob => true,
            Action::OpenBlob { blob, .. } => blob.is_dir(),
            Action::SelectBlob(_)
            | Action::DeselectBlob
            | Action::StartEditBlob
            | Action::StartCreateFolder
            | Action::CancelEdit => false,
        }
    }
}

/// What a dispatched action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// State changed.
    Applied,
    /// Preconditions did not hold; nothing changed.
    Ignored,
    /// A file URL was handed to the host.
    Selected(String),
}
