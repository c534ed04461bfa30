//! filesys - embeddable file and folder manager
//!
//! Server side, a rooted filesystem service projects directory entries into
//! [`Blob`] descriptors and serves them over an HTTP API. Client side, a
//! [`BlobStore`] keeps the listing, selection and edit state of the manager
//! UI in sync with that API and hands selected files back to the embedding
//! page through the [`select`] module.

pub mod blob;
pub mod client;
pub mod config;
pub mod error;
pub mod file;
pub mod logging;
pub mod select;
pub mod settings;
pub mod store;
pub mod web;

pub use blob::{join_path, Blob, BlobBuilder, BlobKind, TreeNode};
pub use client::{BlobApi, ClientError, HttpBlobApi};
pub use config::Config;
pub use error::{FilesysError, Result};
pub use file::{FileService, FileStorage};
pub use select::{CallbackRegistry, EditorBridge, Scope, SelectionDispatcher, SelectionError};
pub use settings::{MediaType, Params, Settings, SettingsError, TargetMode};
pub use store::{Action, BlobId, BlobStore, Outcome, StoreError, StoreState};
pub use web::WebServer;
