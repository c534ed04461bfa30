//! Configuration module for filesys.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::{FilesysError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins (empty allows any origin without credentials).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Directory on disk that acts as `/` for every blob path.
    #[serde(default = "default_root")]
    pub root: String,
    /// Public URL prefix under which the root directory is served.
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// URL prefix for generated image thumbnails.
    #[serde(default = "default_thumbs_url")]
    pub thumbs_url: String,
    /// Thumbnail sizes rendered for images.
    #[serde(default = "default_thumb_sizes")]
    pub thumb_sizes: Vec<String>,
}

fn default_root() -> String {
    "data/files".to_string()
}

fn default_public_url() -> String {
    "/storage".to_string()
}

fn default_thumbs_url() -> String {
    "/storage/.thumbs".to_string()
}

fn default_thumb_sizes() -> Vec<String> {
    ["thumb", "xs", "sm", "md", "lg"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            public_url: default_public_url(),
            thumbs_url: default_thumbs_url(),
            thumb_sizes: default_thumb_sizes(),
        }
    }
}

/// API endpoint paths, shared by the router and the embed settings.
#[derive(Debug, Clone, Deserialize)]
pub struct UrlsConfig {
    /// Files endpoint (rename, delete).
    #[serde(default = "default_files_url")]
    pub files: String,
    /// Folders endpoint (list, create).
    #[serde(default = "default_folders_url")]
    pub folders: String,
    /// Directory tree endpoint.
    #[serde(default = "default_tree_url")]
    pub tree: String,
}

fn default_files_url() -> String {
    "/api/files".to_string()
}

fn default_folders_url() -> String {
    "/api/folders".to_string()
}

fn default_tree_url() -> String {
    "/api/tree".to_string()
}

impl Default for UrlsConfig {
    fn default() -> Self {
        Self {
            files: default_files_url(),
            folders: default_folders_url(),
            tree: default_tree_url(),
        }
    }
}

/// Icon configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IconsConfig {
    /// Base URL of the icon directory (icons are `{dir}{name}.png`).
    #[serde(default = "default_icon_dir")]
    pub dir: String,
    /// Icon name used for directories.
    #[serde(default = "default_dir_icon")]
    pub dir_icon: String,
    /// Icon name per mime category. Categories without an entry use `file`.
    #[serde(default = "default_category_icons")]
    pub categories: BTreeMap<String, String>,
}

fn default_icon_dir() -> String {
    "/vendor/filesys/images/".to_string()
}

fn default_dir_icon() -> String {
    "dir".to_string()
}

fn default_category_icons() -> BTreeMap<String, String> {
    [
        ("archive", "archive"),
        ("document", "document"),
        ("media", "media"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl Default for IconsConfig {
    fn default() -> Self {
        Self {
            dir: default_icon_dir(),
            dir_icon: default_dir_icon(),
            categories: default_category_icons(),
        }
    }
}

/// Mime category configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MimeConfig {
    /// Mimetype prefixes per category (e.g. `image = ["image/"]`).
    #[serde(default = "default_mime_types")]
    pub types: BTreeMap<String, Vec<String>>,
}

fn default_mime_types() -> BTreeMap<String, Vec<String>> {
    let mut types = BTreeMap::new();
    types.insert(
        "archive".to_string(),
        vec![
            "application/zip".to_string(),
            "application/gzip".to_string(),
            "application/x-tar".to_string(),
            "application/x-7z-compressed".to_string(),
            "application/vnd.rar".to_string(),
        ],
    );
    types.insert(
        "document".to_string(),
        vec![
            "text/".to_string(),
            "application/pdf".to_string(),
            "application/msword".to_string(),
            "application/vnd.openxmlformats-officedocument".to_string(),
            "application/vnd.oasis.opendocument".to_string(),
        ],
    );
    types.insert("image".to_string(), vec!["image/".to_string()]);
    types.insert(
        "media".to_string(),
        vec!["audio/".to_string(), "video/".to_string()],
    );
    types
}

impl Default for MimeConfig {
    fn default() -> Self {
        Self {
            types: default_mime_types(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/filesys.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// File storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// API endpoint paths.
    #[serde(default)]
    pub urls: UrlsConfig,
    /// Icon configuration.
    #[serde(default)]
    pub icons: IconsConfig,
    /// Mime category configuration.
    #[serde(default)]
    pub mime: MimeConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FilesysError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FilesysError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FILESYS_ROOT`: Override the storage root directory
    pub fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("FILESYS_ROOT") {
            if !root.is_empty() {
                self.files.root = root;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the storage root is empty
    /// - an API path does not start with `/`
    /// - two API paths collide
    pub fn validate(&self) -> Result<()> {
        if self.files.root.trim().is_empty() {
            return Err(FilesysError::Config("files.root must not be empty".to_string()));
        }

        for (key, value) in [
            ("urls.files", &self.urls.files),
            ("urls.folders", &self.urls.folders),
            ("urls.tree", &self.urls.tree),
        ] {
            if !value.starts_with('/') || value.len() < 2 {
                return Err(FilesysError::Config(format!(
                    "{key} must be an absolute path, got '{value}'"
                )));
            }
        }

        if self.urls.files == self.urls.folders
            || self.urls.files == self.urls.tree
            || self.urls.folders == self.urls.tree
        {
            return Err(FilesysError::Config(
                "urls.files, urls.folders and urls.tree must differ".to_string(),
            ));
        }

        Ok(())
    }
}
