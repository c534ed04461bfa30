//! Client-side blob store.
//!
//! The store owns the navigation path, the listing, the selection and the
//! edit/loading/creating flags. The UI feeds it [`Action`]s; actions call the
//! [`BlobApi`] and commit [`Mutation`]s through a single reducer.
//!
//! At most one network action runs at a time. Every such action takes the
//! only permit of a semaphore and a second one dispatched meanwhile fails
//! with [`StoreError::Busy`] without touching state. Navigation takes the
//! permit too, so a response can never land after the user moved elsewhere.

mod action;
mod mutation;
mod state;

pub use action::{Action, Outcome, NEW_FOLDER_NAME};
pub use mutation::{apply, Mutation};
pub use state::{BlobId, ListedBlob, StoreState};

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{RwLock, Semaphore, SemaphorePermit};
use tracing::{debug, warn};

use crate::blob::Blob;
use crate::client::{BlobApi, ClientError};
use crate::select::{SelectionDispatcher, SelectionError};
use crate::settings::Settings;

/// Errors returned by [`BlobStore::dispatch`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// Another network action is in flight.
    #[error("another request is in progress")]
    Busy,

    /// The action needs a selected entry.
    #[error("no entry is selected")]
    NoSelection,

    /// The parent placeholder cannot be renamed or deleted.
    #[error("entry cannot be edited")]
    NotEditable,

    /// No listed entry has this id.
    #[error("unknown entry {0}")]
    UnknownBlob(BlobId),

    /// The server call failed.
    #[error(transparent)]
    Api(#[from] ClientError),

    /// The host could not receive the selection.
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Clonable handle over the shared store state.
pub struct BlobStore<A> {
    api: Arc<A>,
    settings: Arc<Settings>,
    dispatcher: Arc<SelectionDispatcher>,
    state: Arc<RwLock<StoreState>>,
    in_flight: Arc<Semaphore>,
}

impl<A> Clone for BlobStore<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            settings: Arc::clone(&self.settings),
            dispatcher: Arc::clone(&self.dispatcher),
            state: Arc::clone(&self.state),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<A: BlobApi> BlobStore<A> {
    /// Create a store showing the root directory (not yet loaded).
    pub fn new(api: A, settings: Arc<Settings>, dispatcher: SelectionDispatcher) -> Self {
        Self {
            api: Arc::new(api),
            settings,
            dispatcher: Arc::new(dispatcher),
            state: Arc::new(RwLock::new(StoreState::default())),
            in_flight: Arc::new(Semaphore::new(1)),
        }
    }

    /// Embed settings the store was created with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> StoreState {
        self.state.read().await.clone()
    }

    /// Run an action to completion.
    pub async fn dispatch(&self, action: Action) -> Result<Outcome, StoreError> {
        debug!(?action, "Dispatching action");

        let result = self.run(action).await;
        if let Err(e) = &result {
            warn!(error = %e, "Action failed");
        }
        result
    }

    async fn run(&self, action: Action) -> Result<Outcome, StoreError> {
        let _permit = if action.is_network() {
            Some(self.acquire()?)
        } else {
            None
        };

        match action {
            Action::ChangePath(path) => self.change_path(&path).await,
            Action::FetchTree => self.fetch_tree().await,
            Action::SelectBlob(id) => Ok(self.select(id).await),
            Action::DeselectBlob => {
                self.commit(Mutation::Select(None)).await;
                Ok(Outcome::Applied)
            }
            Action::StartEditBlob => Ok(self.start_edit().await),
            Action::StartCreateFolder => Ok(self.start_create_folder().await),
            Action::CancelEdit => {
                self.commit(Mutation::CancelEdit).await;
                Ok(Outcome::Applied)
            }
            Action::SaveBlob { id, name } => self.save(id, &name).await,
            Action::DeleteBlob => self.delete_selected().await,
            Action::OpenBlob { blob, size } => self.open(&blob, size.as_deref()).await,
        }
    }

    async fn commit(&self, mutation: Mutation) {
        apply(&mut *self.state.write().await, mutation);
    }

    fn acquire(&self) -> Result<SemaphorePermit<'_>, StoreError> {
        self.in_flight.try_acquire().map_err(|_| StoreError::Busy)
    }

    /// Run `work` with `loading` set. The flag is cleared on every exit,
    /// including when the dispatch future is dropped mid-request.
    async fn with_loading<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        self.commit(Mutation::SetLoading(true)).await;
        let mut guard = LoadingGuard {
            state: Some(Arc::clone(&self.state)),
        };
        let result = work.await;
        guard.state = None;
        self.commit(Mutation::SetLoading(false)).await;
        result
    }

    async fn change_path(&self, path: &str) -> Result<Outcome, StoreError> {
        self.with_loading(self.load(normalize_dir(path))).await
    }

    async fn load(&self, path: String) -> Result<Outcome, StoreError> {
        let blobs = self.api.list(&path).await?;

        let mut listed: Vec<ListedBlob> = Blob::parent_placeholder(&path, &self.settings.dir_icon)
            .into_iter()
            .map(ListedBlob::new)
            .collect();
        listed.extend(blobs.into_iter().map(ListedBlob::new));

        debug!(%path, entries = listed.len(), "Changed path");
        self.commit(Mutation::SetListing {
            path,
            blobs: listed,
        })
        .await;
        Ok(Outcome::Applied)
    }

    async fn fetch_tree(&self) -> Result<Outcome, StoreError> {
        let tree = self.api.tree().await?;
        self.commit(Mutation::SetTree(tree)).await;
        Ok(Outcome::Applied)
    }

    /// Tree refresh following a directory change; runs under the caller's
    /// permit. The primary action already committed, so failures are only
    /// logged.
    async fn refresh_tree(&self) {
        match self.api.tree().await {
            Ok(tree) => self.commit(Mutation::SetTree(tree)).await,
            Err(e) => warn!(error = %e, "Tree refresh failed"),
        }
    }

    async fn select(&self, id: BlobId) -> Outcome {
        let mut state = self.state.write().await;
        if state.get(id).is_none() {
            return Outcome::Ignored;
        }
        apply(&mut state, Mutation::Select(Some(id)));
        Outcome::Applied
    }

    async fn start_edit(&self) -> Outcome {
        let mut state = self.state.write().await;
        if !state.selection_is_editable() {
            return Outcome::Ignored;
        }
        apply(&mut state, Mutation::SetEditing(true));
        Outcome::Applied
    }

    async fn start_create_folder(&self) -> Outcome {
        let mut state = self.state.write().await;
        if state.creating {
            return Outcome::Ignored;
        }
        let draft = Blob::draft_dir(&state.path, NEW_FOLDER_NAME, &self.settings.dir_icon);
        apply(&mut state, Mutation::InsertDraft(ListedBlob::draft(draft)));
        Outcome::Applied
    }

    async fn save(&self, id: BlobId, name: &str) -> Result<Outcome, StoreError> {
        let entry = self
            .state
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(StoreError::UnknownBlob(id))?;
        if entry.blob.is_placeholder() {
            return Err(StoreError::NotEditable);
        }

        self.with_loading(self.save_remote(&entry, name)).await
    }

    async fn save_remote(&self, entry: &ListedBlob, name: &str) -> Result<Outcome, StoreError> {
        let saved = if entry.draft {
            self.api.create_dir(&entry.blob.dir, name).await?
        } else {
            self.api.update(&entry.blob, name).await?
        };
        let is_dir = saved.is_dir();
        debug!(from = %entry.blob.full_name, to = %saved.full_name, "Saved blob");

        self.commit(Mutation::ReplaceBlob {
            id: entry.id,
            blob: saved,
        })
        .await;
        self.commit(Mutation::Select(None)).await;

        if is_dir {
            self.refresh_tree().await;
        }
        Ok(Outcome::Applied)
    }

    async fn delete_selected(&self) -> Result<Outcome, StoreError> {
        let entry = self
            .state
            .read()
            .await
            .selected_blob()
            .cloned()
            .ok_or(StoreError::NoSelection)?;
        if entry.blob.is_placeholder() {
            return Err(StoreError::NotEditable);
        }
        if entry.draft {
            self.commit(Mutation::CancelEdit).await;
            return Ok(Outcome::Applied);
        }

        self.with_loading(self.delete_remote(&entry)).await
    }

    async fn delete_remote(&self, entry: &ListedBlob) -> Result<Outcome, StoreError> {
        if self.api.delete(&entry.blob).await? {
            debug!(full_name = %entry.blob.full_name, "Deleted blob");
        } else {
            warn!(
                full_name = %entry.blob.full_name,
                "Server reported nothing deleted, dropping stale entry"
            );
        }

        self.commit(Mutation::RemoveBlob(entry.id)).await;
        if entry.blob.is_dir() {
            self.refresh_tree().await;
        }
        Ok(Outcome::Applied)
    }

    async fn open(&self, blob: &Blob, size: Option<&str>) -> Result<Outcome, StoreError> {
        if blob.is_dir() {
            return self.change_path(&blob.full_name).await;
        }

        let url = size
            .and_then(|s| blob.thumbs.get(s))
            .unwrap_or(&blob.url)
            .clone();
        self.dispatcher.select(&url)?;
        Ok(Outcome::Selected(url))
    }
}

/// Clears `loading` if a request is abandoned before it finishes.
struct LoadingGuard {
    state: Option<Arc<RwLock<StoreState>>>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let Some(state) = self.state.take() else {
            return;
        };
        if let Ok(mut guard) = state.try_write() {
            apply(&mut guard, Mutation::SetLoading(false));
            return;
        }
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                apply(&mut *state.write().await, Mutation::SetLoading(false));
            });
        }
    }
}

fn normalize_dir(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}
