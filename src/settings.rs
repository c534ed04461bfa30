//! Embed settings for the file manager UI.
//!
//! The host page describes the embedding through a handful of `data-*`
//! attributes (endpoint URLs, icon locations and a JSON object of caller
//! parameters). They are read once into a [`Settings`] value which is then
//! passed by reference to the store and the selection dispatcher.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::Config;

/// Attribute carrying the files endpoint.
pub const ATTR_FILES_URL: &str = "data-files-url";
/// Attribute carrying the folders endpoint.
pub const ATTR_FOLDERS_URL: &str = "data-folders-url";
/// Attribute carrying the tree endpoint.
pub const ATTR_TREE_URL: &str = "data-tree-url";
/// Attribute carrying the directory icon URL.
pub const ATTR_DIR_ICON_URL: &str = "data-dir-icon-url";
/// Attribute carrying the icon directory base URL.
pub const ATTR_ICON_DIR: &str = "data-icon-dir";
/// Attribute carrying the caller parameters as a JSON object.
pub const ATTR_PARAMS: &str = "data-params";

/// Target value selecting the rich-text editor integration.
pub const TARGET_TINYMCE: &str = "tinymce";
/// Target used when the caller does not name one.
pub const TARGET_INPUT: &str = "input";

/// Arbitrary caller-supplied parameters, handed back verbatim to callbacks.
pub type Params = Map<String, Value>;

/// Errors raised while reading embed settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A required attribute is absent.
    #[error("missing attribute {0}")]
    MissingAttribute(&'static str),

    /// `data-params` is not a JSON object.
    #[error("invalid params: {0}")]
    InvalidParams(String),
}

/// Something that exposes `data-*` attributes by name.
pub trait AttributeSource {
    /// Look up an attribute value.
    fn attribute(&self, name: &str) -> Option<String>;
}

impl AttributeSource for HashMap<String, String> {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl AttributeSource for BTreeMap<String, String> {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Media types a caller may restrict the picker to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    File,
    Dir,
    Image,
    Media,
    Document,
}

impl MediaType {
    /// Every media type, in declaration order.
    pub const ALL: [MediaType; 5] = [
        MediaType::File,
        MediaType::Dir,
        MediaType::Image,
        MediaType::Media,
        MediaType::Document,
    ];

    /// Wire name of the media type.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::File => "file",
            MediaType::Dir => "dir",
            MediaType::Image => "image",
            MediaType::Media => "media",
            MediaType::Document => "document",
        }
    }

    /// Parse a wire name. Matching is exact, as the host sends lowercase names.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a selected file is handed back to the embedding page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    /// Rich-text editor dialog integration.
    Editor,
    /// Generic host callback / input field.
    Callback,
}

/// Embed settings, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub files_url: String,
    pub folders_url: String,
    pub tree_url: String,
    pub dir_icon: String,
    pub icon_dir: String,
    pub params: Params,
}

impl Settings {
    /// Read settings from an attribute source.
    ///
    /// Single quotes in `data-params` are normalized to double quotes before
    /// parsing, so hosts can embed the object inside a double-quoted HTML
    /// attribute.
    pub fn from_attributes<S: AttributeSource + ?Sized>(
        source: &S,
    ) -> Result<Self, SettingsError> {
        let required = |name: &'static str| {
            source
                .attribute(name)
                .ok_or(SettingsError::MissingAttribute(name))
        };

        let params = match source.attribute(ATTR_PARAMS) {
            Some(raw) => parse_params(&raw)?,
            None => Params::new(),
        };

        Ok(Self {
            files_url: required(ATTR_FILES_URL)?,
            folders_url: required(ATTR_FOLDERS_URL)?,
            tree_url: required(ATTR_TREE_URL)?,
            dir_icon: source.attribute(ATTR_DIR_ICON_URL).unwrap_or_default(),
            icon_dir: source.attribute(ATTR_ICON_DIR).unwrap_or_default(),
            params,
        })
    }

    /// Build settings for a server configuration, prefixing every endpoint
    /// with `base_url` (e.g. `http://127.0.0.1:8080`).
    pub fn from_config(config: &Config, base_url: &str, params: Params) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            files_url: format!("{base}{}", config.urls.files),
            folders_url: format!("{base}{}", config.urls.folders),
            tree_url: format!("{base}{}", config.urls.tree),
            dir_icon: format!("{}{}.png", config.icons.dir, config.icons.dir_icon),
            icon_dir: config.icons.dir.clone(),
            params,
        }
    }

    /// Render the settings back into `data-*` attributes for an embed page.
    pub fn to_attributes(&self) -> BTreeMap<String, String> {
        let params = Value::Object(self.params.clone()).to_string().replace('"', "'");
        [
            (ATTR_FILES_URL, self.files_url.clone()),
            (ATTR_FOLDERS_URL, self.folders_url.clone()),
            (ATTR_TREE_URL, self.tree_url.clone()),
            (ATTR_DIR_ICON_URL, self.dir_icon.clone()),
            (ATTR_ICON_DIR, self.icon_dir.clone()),
            (ATTR_PARAMS, params),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    /// Absolute icon URL for an icon name; `None` when the name is empty.
    pub fn icon(&self, name: &str) -> Option<String> {
        if name.is_empty() {
            None
        } else {
            Some(format!("{}{}.png", self.icon_dir, name))
        }
    }

    /// Lower-cased target name, `input` when the caller named none.
    pub fn target(&self) -> String {
        self.param_str("target")
            .map(|t| t.to_lowercase())
            .unwrap_or_else(|| TARGET_INPUT.to_string())
    }

    /// Target mode derived from [`Settings::target`].
    pub fn target_mode(&self) -> TargetMode {
        if self.target() == TARGET_TINYMCE {
            TargetMode::Editor
        } else {
            TargetMode::Callback
        }
    }

    /// Requested media type, `file` when absent or unknown.
    pub fn media_type(&self) -> MediaType {
        self.param_str("type")
            .and_then(MediaType::parse)
            .unwrap_or(MediaType::File)
    }

    /// Name of the host callback, if the caller configured one.
    pub fn callback(&self) -> Option<&str> {
        self.param_str("callback").filter(|c| !c.is_empty())
    }

    fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}

fn parse_params(raw: &str) -> Result<Params, SettingsError> {
    let normalized = raw.replace('\'', "\"");
    match serde_json::from_str::<Value>(&normalized) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(SettingsError::InvalidParams(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(SettingsError::InvalidParams(e.to_string())),
    }
}
