//! State mutations and the reducer that applies them.
//!
//! Mutations are the only way store state changes. Each one is a pure,
//! synchronous transition; anything that talks to the network lives in
//! actions.

use crate::blob::{Blob, TreeNode};

use super::state::{BlobId, ListedBlob, StoreState};

/// A single state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Set or clear the loading flag.
    SetLoading(bool),
    /// Show a new directory. Clears selection, editing and creating.
    SetListing {
        path: String,
        blobs: Vec<ListedBlob>,
    },
    /// Replace the entry `id` by a server blob, keeping its position and id.
    ReplaceBlob { id: BlobId, blob: Blob },
    /// Drop an entry from the listing.
    RemoveBlob(BlobId),
    /// Select an entry, or clear the selection.
    Select(Option<BlobId>),
    /// Enter or leave edit mode.
    SetEditing(bool),
    /// Insert a new folder draft, select it and start editing it.
    InsertDraft(ListedBlob),
    /// Leave edit mode and throw away drafts.
    CancelEdit,
    /// Replace the navigation tree.
    SetTree(Vec<TreeNode>),
}

/// Apply `mutation` to `state`.
pub fn apply(state: &mut StoreState, mutation: Mutation) {
    match mutation {
        Mutation::SetLoading(loading) => {
            state.loading = loading;
        }
        Mutation::SetListing { path, blobs } => {
            state.path = path;
            state.blobs = blobs;
            state.selected = None;
            state.editing = false;
            state.creating = false;
        }
        Mutation::ReplaceBlob { id, blob } => {
            if let Some(entry) = state.blobs.iter_mut().find(|b| b.id == id) {
                entry.blob = blob;
                entry.draft = false;
            }
            if !state.blobs.iter().any(|b| b.draft) {
                state.creating = false;
            }
        }
        Mutation::RemoveBlob(id) => {
            state.blobs.retain(|b| b.id != id);
            if state.selected == Some(id) {
                state.selected = None;
                state.editing = false;
            }
        }
        Mutation::Select(id) => {
            let id = id.filter(|id| state.get(*id).is_some());
            if state.selected != id {
                state.editing = false;
            }
            state.selected = id;
        }
        Mutation::SetEditing(editing) => {
            state.editing = editing && state.selection_is_editable();
        }
        Mutation::InsertDraft(draft) => {
            let at = state
                .blobs
                .iter()
                .take_while(|b| b.blob.is_placeholder())
                .count();
            state.selected = Some(draft.id);
            state.blobs.insert(at, draft);
            state.editing = true;
            state.creating = true;
        }
        Mutation::CancelEdit => {
            let drafts: Vec<BlobId> = state
                .blobs
                .iter()
                .filter(|b| b.draft)
                .map(|b| b.id)
                .collect();
            state.blobs.retain(|b| !b.draft);
            if state.selected.is_some_and(|id| drafts.contains(&id)) {
                state.selected = None;
            }
            state.editing = false;
            state.creating = false;
        }
        Mutation::SetTree(tree) => {
            state.tree = tree;
        }
    }
}
