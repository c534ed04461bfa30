//! Selection dispatch.
//!
//! When a file is opened the embedding page gets its URL back, either through
//! a rich-text editor dialog ([`EditorBridge`]) or through a named host
//! callback looked up in a [`CallbackRegistry`]. Both collaborators are
//! injected by the host at startup.

mod registry;

pub use registry::{Callback, CallbackRegistry, Scope};

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::settings::{Settings, TargetMode};

/// Callback name used when the caller configured none.
pub const DEFAULT_CALLBACK: &str = "cripFilesystemManager";

/// First editor major version with the live params accessor.
pub const LIVE_PARAMS_VERSION: u32 = 4;

/// Errors raised while handing a selection back to the host.
///
/// These point at an integration mistake, not at something an end user did.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Editor mode is configured but no editor is reachable.
    #[error("editor integration is not available")]
    EditorMissing,

    /// No callback with this name is registered in any scope.
    #[error("callback {0} is not registered")]
    CallbackMissing(String),
}

/// Control surface of the rich-text editor's file dialog.
pub trait EditorBridge: Send + Sync {
    /// Major version of the editor.
    fn major_version(&self) -> u32;

    /// Set the URL on the legacy dialog params object.
    fn set_legacy_url(&self, url: &str);

    /// Id of the dialog window, used by the legacy close call.
    fn window_id(&self) -> Option<String>;

    /// Set the URL through the live params accessor.
    fn set_url(&self, url: &str);

    /// Close the dialog, by id on legacy editors.
    fn close(&self, window_id: Option<&str>);
}

/// Routes a selected URL to the editor or to a host callback.
#[derive(Clone)]
pub struct SelectionDispatcher {
    settings: Arc<Settings>,
    editor: Option<Arc<dyn EditorBridge>>,
    callbacks: Arc<CallbackRegistry>,
}

impl SelectionDispatcher {
    /// Create a dispatcher. `editor` may be absent when the page embeds no
    /// editor.
    pub fn new(
        settings: Arc<Settings>,
        editor: Option<Arc<dyn EditorBridge>>,
        callbacks: CallbackRegistry,
    ) -> Self {
        Self {
            settings,
            editor,
            callbacks: Arc::new(callbacks),
        }
    }

    /// Hand `url` back to the host according to the configured target mode.
    pub fn select(&self, url: &str) -> Result<(), SelectionError> {
        match self.settings.target_mode() {
            TargetMode::Editor => self.select_for_editor(url),
            TargetMode::Callback => self.select_for_callback(url),
        }
    }

    fn select_for_editor(&self, url: &str) -> Result<(), SelectionError> {
        let editor = self.editor.as_ref().ok_or(SelectionError::EditorMissing)?;
        let version = editor.major_version();
        debug!(version, url, "Selecting file for editor");

        if version < LIVE_PARAMS_VERSION {
            editor.set_legacy_url(url);
            let window_id = editor.window_id();
            editor.close(window_id.as_deref());
        } else {
            editor.set_url(url);
            editor.close(None);
        }
        Ok(())
    }

    fn select_for_callback(&self, url: &str) -> Result<(), SelectionError> {
        let name = self.settings.callback().unwrap_or(DEFAULT_CALLBACK);
        let (scope, callback) = self
            .callbacks
            .resolve(name)
            .ok_or_else(|| SelectionError::CallbackMissing(name.to_string()))?;
        debug!(name, ?scope, url, "Selecting file for callback");

        callback(url, &self.settings.params);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Params;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEditor {
        version: u32,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingEditor {
        fn new(version: u32) -> Arc<Self> {
            Arc::new(Self {
                version,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl EditorBridge for RecordingEditor {
        fn major_version(&self) -> u32 {
            self.version
        }

        fn set_legacy_url(&self, url: &str) {
            self.calls.lock().unwrap().push(format!("legacy:{url}"));
        }

        fn window_id(&self) -> Option<String> {
            Some("mce_7".to_string())
        }

        fn set_url(&self, url: &str) {
            self.calls.lock().unwrap().push(format!("live:{url}"));
        }

        fn close(&self, window_id: Option<&str>) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("close:{}", window_id.unwrap_or("-")));
        }
    }

    fn settings(params: serde_json::Value) -> Arc<Settings> {
        let params: Params = serde_json::from_value(params).unwrap();
        Arc::new(Settings::from_config(&crate::Config::default(), "", params))
    }

    #[test]
    fn test_legacy_editor_closes_by_id() {
        let editor = RecordingEditor::new(3);
        let dispatcher = SelectionDispatcher::new(
            settings(json!({"target": "tinymce"})),
            Some(editor.clone() as Arc<dyn EditorBridge>),
            CallbackRegistry::new(),
        );

        dispatcher.select("/storage/a.png").unwrap();

        assert_eq!(editor.calls(), vec!["legacy:/storage/a.png", "close:mce_7"]);
    }

    #[test]
    fn test_live_editor_closes_without_id() {
        let editor = RecordingEditor::new(4);
        let dispatcher = SelectionDispatcher::new(
            settings(json!({"target": "TinyMCE"})),
            Some(editor.clone() as Arc<dyn EditorBridge>),
            CallbackRegistry::new(),
        );

        dispatcher.select("/storage/a.png").unwrap();

        assert_eq!(editor.calls(), vec!["live:/storage/a.png", "close:-"]);
    }

    #[test]
    fn test_editor_missing() {
        let dispatcher = SelectionDispatcher::new(
            settings(json!({"target": "tinymce"})),
            None,
            CallbackRegistry::new(),
        );
        assert_eq!(
            dispatcher.select("/storage/a.png"),
            Err(SelectionError::EditorMissing)
        );
    }

    #[test]
    fn test_callback_receives_url_and_params() {
        let received = Arc::new(Mutex::new(None));
        let sink = received.clone();
        let mut registry = CallbackRegistry::new();
        registry.register(Scope::Parent, "onPick", move |url: &str, params: &Params| {
            *sink.lock().unwrap() = Some((url.to_string(), params.clone()));
        });

        let dispatcher = SelectionDispatcher::new(
            settings(json!({"callback": "onPick", "field": "cover"})),
            None,
            registry,
        );
        dispatcher.select("/storage/a.pdf").unwrap();

        let (url, params) = received.lock().unwrap().clone().unwrap();
        assert_eq!(url, "/storage/a.pdf");
        assert_eq!(params.get("field"), Some(&json!("cover")));
    }

    #[test]
    fn test_default_callback_name() {
        let hits = Arc::new(Mutex::new(0));
        let counter = hits.clone();
        let mut registry = CallbackRegistry::new();
        registry.register(Scope::Top, "cripFilesystemManager", move |_: &str, _: &Params| {
            *counter.lock().unwrap() += 1;
        });

        let dispatcher = SelectionDispatcher::new(settings(json!({})), None, registry);
        dispatcher.select("/storage/a.pdf").unwrap();

        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn test_callback_missing() {
        let dispatcher = SelectionDispatcher::new(
            settings(json!({"callback": "nope"})),
            None,
            CallbackRegistry::new(),
        );
        assert_eq!(
            dispatcher.select("/storage/a.pdf"),
            Err(SelectionError::CallbackMissing("nope".to_string()))
        );
    }
}
