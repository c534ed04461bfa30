//! Rooted file storage.
//!
//! Every blob path is `/`-rooted and resolved below a single base directory.
//! Paths are normalized before use and anything that could escape the base
//! directory (`..`, `.`, backslashes, NUL bytes) is rejected.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{FilesysError, Result};

use super::MAX_FILENAME_LENGTH;

/// File storage rooted at a base directory.
///
/// ```text
/// {base_path}/        <- "/"
/// ├── docs/           <- "/docs"
/// │   └── a.txt       <- "/docs/a.txt"
/// └── logo.png        <- "/logo.png"
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Base directory for file storage.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage with the given base path.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Normalize a blob path to its canonical `/`-rooted form.
    ///
    /// Empty segments are dropped, so `docs//2024/` becomes `/docs/2024` and
    /// the empty string becomes `/`.
    pub fn normalize(path: &str) -> Result<String> {
        if path.contains('\0') || path.contains('\\') {
            return Err(FilesysError::Validation(format!("invalid path: {path}")));
        }

        let mut segments = Vec::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." {
                return Err(FilesysError::Validation(format!(
                    "path must not contain '{segment}': {path}"
                )));
            }
            segments.push(segment);
        }

        Ok(format!("/{}", segments.join("/")))
    }

    /// Resolve an existing directory, walking it one segment at a time.
    ///
    /// Symbolic links are never followed, so a link inside the root cannot
    /// expose anything outside it.
    pub fn resolve_dir(&self, dir: &str) -> Result<PathBuf> {
        let normalized = Self::normalize(dir)?;
        let mut resolved = self.base_path.clone();
        for segment in normalized.split('/').filter(|s| !s.is_empty()) {
            resolved.push(segment);
            match fs::symlink_metadata(&resolved) {
                Ok(m) if m.file_type().is_symlink() => {
                    return Err(FilesysError::Validation(format!(
                        "{normalized} goes through a symbolic link"
                    )));
                }
                Ok(m) if !m.is_dir() => {
                    return Err(FilesysError::Validation(format!(
                        "{normalized} is not a directory"
                    )));
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(FilesysError::NotFound(normalized));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(resolved)
    }

    /// Validate a single entry name used for create and rename.
    pub fn validate_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(FilesysError::Validation("name must not be empty".to_string()));
        }
        if name == "." || name == ".." {
            return Err(FilesysError::Validation(format!("'{name}' is not a valid name")));
        }
        if name.chars().count() > MAX_FILENAME_LENGTH {
            return Err(FilesysError::Validation(format!(
                "name must be at most {MAX_FILENAME_LENGTH} characters"
            )));
        }
        if name.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
            return Err(FilesysError::Validation(format!(
                "name contains forbidden characters: {name}"
            )));
        }
        Ok(())
    }
}
