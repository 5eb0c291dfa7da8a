//! Content-file side effects behind a trait.
//!
//! The reconciler mirrors tree edits onto the translated content files:
//! a rename in the source language renames the target-language file, a
//! deletion deletes it. [`FsStore`] is the real implementation;
//! [`MemStore`] backs tests. Paths are extension-free tree paths; the
//! store maps them to actual files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A content-file operation that failed.
#[derive(Debug, thiserror::Error)]
#[error("file operation on `{path}` failed: {source}")]
pub struct StoreError {
    /// Extension-free tree path of the file involved.
    pub path: String,
    /// Underlying I/O error.
    #[source]
    pub source: std::io::Error,
}

/// Storage for translated content files, keyed by extension-free tree
/// path.
pub trait ContentStore {
    /// Whether a content file exists for this tree path.
    fn exists(&self, path: &str) -> bool;

    /// Rename the content file for `from` to sit at `to`.
    ///
    /// # Errors
    ///
    /// Fails when the source file is absent or the rename itself fails.
    fn rename(&mut self, from: &str, to: &str) -> Result<(), StoreError>;

    /// Delete the content file for this tree path.
    ///
    /// # Errors
    ///
    /// Fails when the file is absent or cannot be removed.
    fn remove(&mut self, path: &str) -> Result<(), StoreError>;
}

/// Content files on disk under a repository root.
///
/// Tree paths carry no extension; lookups probe `.mdx` first, then
/// `.md`, matching how pages are stored.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at the repository directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a tree path to an existing file, if any.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        if !confined(path) {
            return None;
        }
        for ext in ["mdx", "md"] {
            let candidate = self.root.join(format!("{path}.{ext}"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }
}

/// Whether a tree path stays inside the store root: relative, with no
/// `..` components.
fn confined(path: &str) -> bool {
    Path::new(path)
        .components()
        .all(|c| matches!(c, std::path::Component::Normal(_)))
}

impl ContentStore for FsStore {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), StoreError> {
        if !confined(to) {
            return Err(StoreError {
                path: to.to_owned(),
                source: std::io::Error::from(std::io::ErrorKind::InvalidInput),
            });
        }
        let source = self.resolve(from).ok_or_else(|| StoreError {
            path: from.to_owned(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })?;
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mdx")
            .to_owned();
        let dest = self.root.join(format!("{to}.{ext}"));
        let io = |source| StoreError {
            path: from.to_owned(),
            source,
        };
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(io)?;
        }
        std::fs::rename(&source, &dest).map_err(io)?;
        tracing::debug!(from = %source.display(), to = %dest.display(), "renamed content file");
        Ok(())
    }

    fn remove(&mut self, path: &str) -> Result<(), StoreError> {
        let file = self.resolve(path).ok_or_else(|| StoreError {
            path: path.to_owned(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })?;
        std::fs::remove_file(&file).map_err(|source| StoreError {
            path: path.to_owned(),
            source,
        })?;
        tracing::debug!(path = %file.display(), "removed content file");
        prune_empty_dirs(file.parent(), &self.root);
        Ok(())
    }
}

/// Remove now-empty directories up to (but not including) the root.
fn prune_empty_dirs(mut dir: Option<&Path>, root: &Path) {
    while let Some(current) = dir {
        if current == root || std::fs::remove_dir(current).is_err() {
            break;
        }
        dir = current.parent();
    }
}

/// In-memory store for tests: tree path to file content.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    files: HashMap<String, String>,
}

impl MemStore {
    /// Add a file with the given content.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    /// Content of a file, if present.
    #[must_use]
    pub fn content(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }
}

impl ContentStore for MemStore {
    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), StoreError> {
        let content = self.files.remove(from).ok_or_else(|| StoreError {
            path: from.to_owned(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })?;
        self.files.insert(to.to_owned(), content);
        Ok(())
    }

    fn remove(&mut self, path: &str) -> Result<(), StoreError> {
        self.files.remove(path).map(|_| ()).ok_or_else(|| StoreError {
            path: path.to_owned(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fs_store_probes_both_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("zh-hans")).unwrap();
        std::fs::write(dir.path().join("zh-hans/a.mdx"), "A").unwrap();
        std::fs::write(dir.path().join("zh-hans/b.md"), "B").unwrap();

        let store = FsStore::new(dir.path());
        assert!(store.exists("zh-hans/a"));
        assert!(store.exists("zh-hans/b"));
        assert!(!store.exists("zh-hans/c"));
    }

    #[test]
    fn test_fs_store_rename_keeps_extension_and_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("zh-hans")).unwrap();
        std::fs::write(dir.path().join("zh-hans/old.md"), "内容").unwrap();

        let mut store = FsStore::new(dir.path());
        store.rename("zh-hans/old", "zh-hans/guides/new").unwrap();

        let moved = dir.path().join("zh-hans/guides/new.md");
        assert_eq!(std::fs::read_to_string(moved).unwrap(), "内容");
        assert!(!store.exists("zh-hans/old"));
    }

    #[test]
    fn test_fs_store_remove_prunes_empty_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("zh-hans/deep/nest");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("only.mdx"), "x").unwrap();
        std::fs::write(dir.path().join("zh-hans/keep.mdx"), "y").unwrap();

        let mut store = FsStore::new(dir.path());
        store.remove("zh-hans/deep/nest/only").unwrap();

        assert!(!dir.path().join("zh-hans/deep").exists());
        // A directory that still has content stays.
        assert!(store.exists("zh-hans/keep"));
    }

    #[test]
    fn test_fs_store_never_reaches_outside_its_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("repo");
        std::fs::create_dir_all(root.join("zh-hans")).unwrap();
        std::fs::write(root.join("zh-hans/page.mdx"), "内容").unwrap();
        std::fs::write(dir.path().join("secret.md"), "outside").unwrap();

        let mut store = FsStore::new(&root);
        assert!(!store.exists("../secret"));
        assert!(!store.exists("zh-hans/../../secret"));
        assert!(!store.exists("/etc/hostname"));

        let err = store.remove("zh-hans/../../secret").unwrap_err();
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
        assert!(dir.path().join("secret.md").is_file());

        let err = store.rename("zh-hans/page", "../escaped").unwrap_err();
        assert_eq!(err.source.kind(), std::io::ErrorKind::InvalidInput);
        assert!(store.exists("zh-hans/page"));
        assert!(!dir.path().join("escaped.mdx").exists());
    }

    #[test]
    fn test_rename_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsStore::new(dir.path());
        let err = store.rename("zh-hans/ghost", "zh-hans/new").unwrap_err();
        assert_eq!(err.path, "zh-hans/ghost");
    }

    #[test]
    fn test_mem_store_rename_moves_content() {
        let mut store = MemStore::default();
        store.insert("zh-hans/old", "内容");
        store.rename("zh-hans/old", "zh-hans/new").unwrap();
        assert_eq!(store.content("zh-hans/new"), Some("内容"));
        assert!(!store.exists("zh-hans/old"));
    }
}
