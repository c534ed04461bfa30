//! Blob metadata builder.
//!
//! Turns a stat'ed filesystem entry into a [`Blob`]. Mime categories and icons
//! are configuration driven; images get their own URL as thumbnail plus one
//! preview URL per configured size.

use std::collections::BTreeMap;
use std::fs::Metadata;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};

use super::{join_path, Blob, BlobKind, DIR_CATEGORY, FILE_CATEGORY};
use crate::config::{Config, FilesConfig, IconsConfig, MimeConfig};

/// Mime type reported for files whose extension is unknown.
const FALLBACK_MIMETYPE: &str = "application/octet-stream";

/// Category whose members get image thumbnails instead of icons.
const IMAGE_CATEGORY: &str = "image";

/// A filesystem entry that has already been stat'ed.
#[derive(Debug, Clone)]
pub struct FsEntry {
    /// `/`-rooted parent directory.
    pub dir: String,
    /// Entry name including extension.
    pub name: String,
    /// Filesystem metadata of the entry.
    pub metadata: Metadata,
}

impl FsEntry {
    /// Stat `name` inside `dir`, where `dir_path` is the on-disk location of `dir`.
    ///
    /// Symbolic links are reported as missing.
    pub fn stat(dir_path: &Path, dir: &str, name: &str) -> io::Result<Self> {
        let metadata = std::fs::symlink_metadata(dir_path.join(name))?;
        if metadata.file_type().is_symlink() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{name} is a symbolic link"),
            ));
        }
        Ok(Self {
            dir: dir.to_string(),
            name: name.to_string(),
            metadata,
        })
    }

    /// Path-qualified name of the entry.
    pub fn full_name(&self) -> String {
        join_path(&self.dir, &self.name)
    }
}

/// Builds [`Blob`] records from filesystem entries.
#[derive(Debug, Clone)]
pub struct BlobBuilder {
    public_url: String,
    thumbs_url: String,
    thumb_sizes: Vec<String>,
    icon_dir: String,
    dir_icon: String,
    category_icons: BTreeMap<String, String>,
    mime_types: BTreeMap<String, Vec<String>>,
}

impl BlobBuilder {
    /// Create a builder from the individual configuration sections.
    pub fn new(files: &FilesConfig, icons: &IconsConfig, mime: &MimeConfig) -> Self {
        Self {
            public_url: files.public_url.trim_end_matches('/').to_string(),
            thumbs_url: files.thumbs_url.trim_end_matches('/').to_string(),
            thumb_sizes: files.thumb_sizes.clone(),
            icon_dir: icons.dir.clone(),
            dir_icon: icons.dir_icon.clone(),
            category_icons: icons.categories.clone(),
            mime_types: mime.types.clone(),
        }
    }

    /// Create a builder from the full configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.files, &config.icons, &config.mime)
    }

    /// Thumbnail sizes configured for images.
    pub fn thumb_sizes(&self) -> &[String] {
        &self.thumb_sizes
    }

    /// URL of the directory icon.
    pub fn dir_icon_url(&self) -> String {
        self.icon_url(&self.dir_icon)
    }

    /// Build the blob for an entry.
    pub fn build(&self, entry: &FsEntry) -> Blob {
        let full_name = entry.full_name();
        let updated_at = entry
            .metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_default();
        let url = self.public_url(&full_name);

        if entry.metadata.is_dir() {
            return Blob {
                name: entry.name.clone(),
                extension: String::new(),
                mime: DIR_CATEGORY.to_string(),
                mimetype: None,
                kind: BlobKind::Dir,
                bytes: None,
                updated_at,
                thumb: self.dir_icon_url(),
                thumbs: BTreeMap::new(),
                dir: entry.dir.clone(),
                full_name,
                url,
            };
        }

        let extension = Path::new(&entry.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        let mimetype = mime_guess::from_path(&entry.name)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| FALLBACK_MIMETYPE.to_string());
        let mime = self.category(&mimetype);

        let (thumb, thumbs) = if mime == IMAGE_CATEGORY {
            let thumbs = self
                .thumb_sizes
                .iter()
                .map(|size| (size.clone(), self.thumb_url(size, &full_name)))
                .collect();
            (url.clone(), thumbs)
        } else {
            let icon = self
                .category_icons
                .get(&mime)
                .map(String::as_str)
                .unwrap_or(FILE_CATEGORY);
            (self.icon_url(icon), BTreeMap::new())
        };

        Blob {
            name: entry.name.clone(),
            extension,
            mime,
            mimetype: Some(mimetype),
            kind: BlobKind::File,
            bytes: Some(entry.metadata.len()),
            updated_at,
            thumb,
            thumbs,
            dir: entry.dir.clone(),
            full_name,
            url,
        }
    }

    /// Mime category for a mimetype.
    ///
    /// The longest matching prefix wins, so `image/svg` beats `image/`
    /// whatever the category names. Equal lengths go to the category that
    /// sorts first.
    pub fn category(&self, mimetype: &str) -> String {
        let mut best: Option<(&str, usize)> = None;
        for (category, prefixes) in &self.mime_types {
            for prefix in prefixes.iter().filter(|p| mimetype.starts_with(p.as_str())) {
                if best.map_or(true, |(_, len)| prefix.len() > len) {
                    best = Some((category.as_str(), prefix.len()));
                }
            }
        }
        best.map_or_else(|| FILE_CATEGORY.to_string(), |(category, _)| category.to_string())
    }

    fn icon_url(&self, icon: &str) -> String {
        format!("{}{}.png", self.icon_dir, icon)
    }

    fn public_url(&self, full_name: &str) -> String {
        format!("{}{}", self.public_url, encode_path(full_name))
    }

    fn thumb_url(&self, size: &str, full_name: &str) -> String {
        format!("{}/{}{}", self.thumbs_url, size, encode_path(full_name))
    }
}

/// Percent-encode every segment of a `/`-rooted path.
pub(crate) fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
