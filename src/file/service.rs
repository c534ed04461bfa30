//! File service for filesys.
//!
//! High-level operations over a [`FileStorage`]: every result is projected
//! through the [`BlobBuilder`] so callers only ever see [`Blob`]s.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::blob::{join_path, split_path, Blob, BlobBuilder, FsEntry, TreeNode};
use crate::config::Config;
use crate::{FilesysError, Result};

use super::storage::FileStorage;
use super::MAX_TREE_DEPTH;

/// File service over a rooted storage.
#[derive(Debug, Clone)]
pub struct FileService {
    storage: FileStorage,
    builder: BlobBuilder,
}

impl FileService {
    /// Create a new FileService.
    pub fn new(storage: FileStorage, builder: BlobBuilder) -> Self {
        Self { storage, builder }
    }

    /// Create a FileService from configuration, creating the root if needed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage = FileStorage::new(&config.files.root)?;
        Ok(Self::new(storage, BlobBuilder::from_config(config)))
    }

    /// Underlying storage.
    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// Blob builder used for projections.
    pub fn builder(&self) -> &BlobBuilder {
        &self.builder
    }

    /// List the entries of a directory.
    ///
    /// Directories come first, then files; each group sorted by name
    /// case-insensitively. Hidden entries (leading `.`) and entries that
    /// vanish or cannot be stat'ed during the listing are skipped.
    pub fn list(&self, dir: &str) -> Result<Vec<Blob>> {
        let dir = FileStorage::normalize(dir)?;
        let dir_path = self.storage.resolve_dir(&dir)?;

        let mut blobs = Vec::new();
        for entry in fs::read_dir(&dir_path)? {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                debug!(path = ?entry.path(), "Skipping entry with non UTF-8 name");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            match FsEntry::stat(&dir_path, &dir, &name) {
                Ok(fs_entry) => blobs.push(self.builder.build(&fs_entry)),
                Err(e) => debug!(%dir, %name, error = %e, "Skipping entry that cannot be stat'ed"),
            }
        }

        blobs.sort_by(|a, b| {
            b.is_dir()
                .cmp(&a.is_dir())
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });

        Ok(blobs)
    }

    /// Stat a single entry.
    pub fn stat(&self, full_name: &str) -> Result<Blob> {
        let full_name = FileStorage::normalize(full_name)?;
        if full_name == "/" {
            return Err(FilesysError::Validation("the root is not a blob".to_string()));
        }
        let (dir, name) = split_path(&full_name);
        let dir_path = self.storage.resolve_dir(&dir)?;

        match FsEntry::stat(&dir_path, &dir, &name) {
            Ok(entry) => Ok(self.builder.build(&entry)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(FilesysError::NotFound(full_name)),
            Err(e) => Err(e.into()),
        }
    }

    /// Rename an entry within its directory.
    pub fn rename(&self, full_name: &str, new_name: &str) -> Result<Blob> {
        FileStorage::validate_name(new_name)?;
        let source = self.stat(full_name)?;

        if source.name == new_name {
            return Ok(source);
        }

        let target = join_path(&source.dir, new_name);
        let dir_path = self.storage.resolve_dir(&source.dir)?;
        let source_path = dir_path.join(&source.name);
        let target_path = dir_path.join(new_name);

        // On case-insensitive filesystems a case-only rename finds the source
        // itself at the target path.
        if fs::symlink_metadata(&target_path).is_ok()
            && !same_entry(&source_path, &target_path)?
        {
            return Err(FilesysError::Conflict(target));
        }

        fs::rename(&source_path, &target_path)?;
        debug!(from = %source.full_name, to = %target, "Renamed blob");

        self.stat(&target)
    }

    /// Delete a file or a directory (recursively).
    ///
    /// Returns `false` when the entry did not exist.
    pub fn delete(&self, full_name: &str) -> Result<bool> {
        let full_name = FileStorage::normalize(full_name)?;
        if full_name == "/" {
            return Err(FilesysError::Validation("the root cannot be deleted".to_string()));
        }
        let (dir, name) = split_path(&full_name);
        let path = match self.storage.resolve_dir(&dir) {
            Ok(dir_path) => dir_path.join(name),
            Err(FilesysError::NotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        };

        let metadata = match fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        if metadata.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
        debug!(%full_name, "Deleted blob");

        Ok(true)
    }

    /// Create a folder named `name` inside `dir`.
    pub fn create_dir(&self, dir: &str, name: &str) -> Result<Blob> {
        FileStorage::validate_name(name)?;
        let dir = FileStorage::normalize(dir)?;
        let path = self.storage.resolve_dir(&dir)?.join(name);

        let full_name = join_path(&dir, name);
        if fs::symlink_metadata(&path).is_ok() {
            return Err(FilesysError::Conflict(full_name));
        }

        fs::create_dir(&path)?;
        debug!(%full_name, "Created folder");

        self.stat(&full_name)
    }

    /// Build the directory tree below the root.
    pub fn tree(&self) -> Result<Vec<TreeNode>> {
        walk_dirs(self.storage.base_path(), "/", 1)
    }
}

#[cfg(unix)]
fn same_entry(a: &Path, b: &Path) -> Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let (a, b) = (fs::symlink_metadata(a)?, fs::symlink_metadata(b)?);
    Ok(a.dev() == b.dev() && a.ino() == b.ino())
}

#[cfg(not(unix))]
fn same_entry(a: &Path, b: &Path) -> Result<bool> {
    Ok(fs::canonicalize(a)? == fs::canonicalize(b)?)
}

fn walk_dirs(path: &Path, dir: &str, depth: usize) -> Result<Vec<TreeNode>> {
    let mut nodes = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name.starts_with('.') || !entry.file_type()?.is_dir() {
            continue;
        }

        let full_name = join_path(dir, &name);
        let children = if depth < MAX_TREE_DEPTH {
            walk_dirs(&entry.path(), &full_name, depth + 1)?
        } else {
            Vec::new()
        };
        nodes.push(TreeNode {
            name,
            full_name,
            children,
        });
    }
    nodes.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_service() -> (TempDir, FileService) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.files.root = temp_dir.path().to_string_lossy().to_string();
        let service = FileService::from_config(&config).unwrap();
        (temp_dir, service)
    }

    fn write(temp_dir: &TempDir, rel: &str, content: &[u8]) {
        let path = temp_dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_list_sorts_dirs_first() {
        let (temp_dir, service) = setup_service();
        write(&temp_dir, "b.txt", b"b");
        write(&temp_dir, "A.txt", b"a");
        fs::create_dir(temp_dir.path().join("zeta")).unwrap();
        fs::create_dir(temp_dir.path().join("alpha")).unwrap();

        let names: Vec<_> = service.list("/").unwrap().into_iter().map(|b| b.name).collect();

        assert_eq!(names, vec!["alpha", "zeta", "A.txt", "b.txt"]);
    }

    #[test]
    fn test_list_skips_hidden_entries() {
        let (temp_dir, service) = setup_service();
        write(&temp_dir, ".thumbs/sm/a.png", b"");
        write(&temp_dir, "visible.txt", b"");

        let blobs = service.list("").unwrap();

        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].full_name, "/visible.txt");
    }

    #[test]
    fn test_list_nested_dir() {
        let (temp_dir, service) = setup_service();
        write(&temp_dir, "docs/a.txt", b"abc");

        let blobs = service.list("/docs").unwrap();

        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].dir, "/docs");
        assert_eq!(blobs[0].full_name, "/docs/a.txt");
        assert_eq!(blobs[0].bytes, Some(3));
    }

    #[test]
    fn test_list_missing_dir() {
        let (_temp_dir, service) = setup_service();
        assert!(matches!(service.list("/nope"), Err(FilesysError::NotFound(_))));
    }

    #[test]
    fn test_list_file_is_not_a_dir() {
        let (temp_dir, service) = setup_service();
        write(&temp_dir, "a.txt", b"");
        assert!(matches!(service.list("/a.txt"), Err(FilesysError::Validation(_))));
    }

    #[test]
    fn test_list_rejects_traversal() {
        let (_temp_dir, service) = setup_service();
        assert!(matches!(service.list("/../"), Err(FilesysError::Validation(_))));
    }

    #[test]
    fn test_rename_file() {
        let (temp_dir, service) = setup_service();
        write(&temp_dir, "docs/a.txt", b"hello");

        let blob = service.rename("/docs/a.txt", "b.txt").unwrap();

        assert_eq!(blob.name, "b.txt");
        assert_eq!(blob.dir, "/docs");
        assert_eq!(blob.full_name, "/docs/b.txt");
        assert!(temp_dir.path().join("docs/b.txt").exists());
        assert!(!temp_dir.path().join("docs/a.txt").exists());
    }

    #[test]
    fn test_rename_to_existing_name_conflicts() {
        let (temp_dir, service) = setup_service();
        write(&temp_dir, "a.txt", b"a");
        write(&temp_dir, "b.txt", b"b");

        let result = service.rename("/a.txt", "b.txt");

        assert!(matches!(result, Err(FilesysError::Conflict(_))));
        assert_eq!(fs::read(temp_dir.path().join("b.txt")).unwrap(), b"b");
    }

    #[test]
    fn test_rename_case_only_keeps_distinct_sibling() {
        let (temp_dir, service) = setup_service();
        write(&temp_dir, "a.txt", b"lower");
        write(&temp_dir, "A.txt", b"UPPER");
        let case_sensitive = fs::read(temp_dir.path().join("A.txt")).unwrap() == b"UPPER"
            && fs::read(temp_dir.path().join("a.txt")).unwrap() == b"lower";

        let result = service.rename("/a.txt", "A.txt");

        if case_sensitive {
            assert!(matches!(result, Err(FilesysError::Conflict(_))));
            assert_eq!(fs::read(temp_dir.path().join("A.txt")).unwrap(), b"UPPER");
            assert_eq!(fs::read(temp_dir.path().join("a.txt")).unwrap(), b"lower");
        } else {
            assert_eq!(result.unwrap().name, "A.txt");
        }
    }

    #[test]
    fn test_rename_case_only() {
        let (temp_dir, service) = setup_service();
        write(&temp_dir, "readme.txt", b"hello");

        let blob = service.rename("/readme.txt", "README.txt").unwrap();

        assert_eq!(blob.name, "README.txt");
        assert_eq!(fs::read(temp_dir.path().join("README.txt")).unwrap(), b"hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_dirs_are_not_served() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), b"secret").unwrap();
        let (temp_dir, service) = setup_service();
        write(&temp_dir, "a.txt", b"a");
        std::os::unix::fs::symlink(outside.path(), temp_dir.path().join("link")).unwrap();

        let names: Vec<_> = service.list("/").unwrap().into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["a.txt"]);
        assert!(matches!(service.list("/link"), Err(FilesysError::Validation(_))));
        assert!(service.stat("/link/secret.txt").is_err());
        assert!(service.create_dir("/link", "x").is_err());
        assert!(!outside.path().join("x").exists());
        assert!(service.tree().unwrap().is_empty());
    }

    #[test]
    fn test_rename_same_name_is_noop() {
        let (temp_dir, service) = setup_service();
        write(&temp_dir, "a.txt", b"a");

        let blob = service.rename("/a.txt", "a.txt").unwrap();
        assert_eq!(blob.full_name, "/a.txt");
    }

    #[test]
    fn test_rename_invalid_name() {
        let (temp_dir, service) = setup_service();
        write(&temp_dir, "a.txt", b"a");

        assert!(matches!(
            service.rename("/a.txt", "../b.txt"),
            Err(FilesysError::Validation(_))
        ));
    }

    #[test]
    fn test_rename_missing() {
        let (_temp_dir, service) = setup_service();
        assert!(matches!(
            service.rename("/missing.txt", "b.txt"),
            Err(FilesysError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_file_and_dir() {
        let (temp_dir, service) = setup_service();
        write(&temp_dir, "docs/nested/a.txt", b"a");
        write(&temp_dir, "b.txt", b"b");

        assert!(service.delete("/b.txt").unwrap());
        assert!(service.delete("/docs").unwrap());
        assert!(!temp_dir.path().join("docs").exists());
        assert!(!service.delete("/docs").unwrap());
    }

    #[test]
    fn test_delete_root_is_rejected() {
        let (_temp_dir, service) = setup_service();
        assert!(matches!(service.delete("/"), Err(FilesysError::Validation(_))));
    }

    #[test]
    fn test_create_dir() {
        let (temp_dir, service) = setup_service();

        let blob = service.create_dir("/", "photos").unwrap();

        assert!(blob.is_dir());
        assert_eq!(blob.full_name, "/photos");
        assert!(temp_dir.path().join("photos").is_dir());
        assert!(matches!(
            service.create_dir("/", "photos"),
            Err(FilesysError::Conflict(_))
        ));
        assert!(matches!(
            service.create_dir("/missing", "x"),
            Err(FilesysError::NotFound(_))
        ));
    }

    #[test]
    fn test_tree() {
        let (temp_dir, service) = setup_service();
        fs::create_dir_all(temp_dir.path().join("docs/2024")).unwrap();
        fs::create_dir_all(temp_dir.path().join("images")).unwrap();
        fs::create_dir_all(temp_dir.path().join(".thumbs")).unwrap();
        write(&temp_dir, "docs/readme.txt", b"");

        let tree = service.tree().unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].full_name, "/docs");
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].full_name, "/docs/2024");
        assert_eq!(tree[1].name, "images");
    }
}
