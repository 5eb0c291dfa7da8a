//! Version-control collaborator for the docsync engine.
//!
//! The engine depends on exactly two primitives: "list changed files with
//! status between two commits" and "retrieve a file's content as of a
//! commit". They are injected through the [`Vcs`] trait; [`GitRepo`] backs
//! them with an in-process `gix` repository, and [`FixedChanges`] serves
//! tests and callers that assemble change lists themselves.
//!
//! Renames are taken only from the tree diff's rewrite tracking with a
//! high similarity threshold. There is deliberately no content-similarity
//! rename inference here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Similarity fraction a rename pair must reach to be reported.
const RENAME_THRESHOLD: f32 = 0.90;

/// Status of one changed file between two commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Present only in the newer commit.
    Added,
    /// Present in both with differing content.
    Modified,
    /// Present only in the older commit.
    Deleted,
    /// Detected as a high-similarity rename.
    Renamed {
        /// Path in the older commit.
        from: String,
    },
}

/// One entry of a changed-file listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Path in the newer commit (the older one for deletions).
    pub path: String,
    /// Change classification.
    pub status: FileStatus,
}

/// Error from the version-control collaborator.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// No git repository at or above the given directory.
    #[error("failed to open git repository at `{}`: {message}", path.display())]
    Open {
        /// Directory the discovery started from.
        path: PathBuf,
        /// Underlying gix error text.
        message: String,
    },

    /// A revision spec did not resolve to a commit or tree.
    #[error("cannot resolve revision `{spec}`: {message}")]
    Revision {
        /// The spec as given.
        spec: String,
        /// Underlying gix error text.
        message: String,
    },

    /// Object lookup or diffing failed inside the repository.
    #[error("git backend error: {message}")]
    Backend {
        /// Underlying gix error text.
        message: String,
    },

    /// A retrieved file was not valid UTF-8.
    #[error("`{path}` at {commit} is not valid UTF-8")]
    Encoding {
        /// Commit the file was read from.
        commit: String,
        /// Repository-relative path.
        path: String,
    },
}

/// The two version-control primitives the engine consumes.
pub trait Vcs {
    /// List files changed between `base` and `head`, with status.
    ///
    /// # Errors
    ///
    /// Fails when either revision does not resolve or the diff itself
    /// cannot be computed.
    fn changed_files(&self, base: &str, head: &str) -> Result<Vec<FileChange>, VcsError>;

    /// Content of `path` as of `commit`, or `None` if absent there.
    ///
    /// # Errors
    ///
    /// Fails when the commit does not resolve or the content is not
    /// valid UTF-8; an absent path is `Ok(None)`.
    fn file_at(&self, commit: &str, path: &str) -> Result<Option<String>, VcsError>;
}

/// gix-backed implementation over an on-disk repository.
pub struct GitRepo {
    repo: gix::Repository,
}

impl GitRepo {
    /// Open the repository at or above `path`.
    ///
    /// # Errors
    ///
    /// Fails when no repository is found there.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, VcsError> {
        let repo = gix::discover(path.as_ref()).map_err(|e| VcsError::Open {
            path: path.as_ref().to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self { repo })
    }

    /// Resolve a revision spec and peel it to its tree.
    fn tree_at(&self, spec: &str) -> Result<gix::Tree<'_>, VcsError> {
        let id = self
            .repo
            .rev_parse_single(spec)
            .map_err(|e| VcsError::Revision {
                spec: spec.to_owned(),
                message: e.to_string(),
            })?;
        let object = id.object().map_err(|e| VcsError::Backend {
            message: e.to_string(),
        })?;
        object.peel_to_tree().map_err(|e| VcsError::Revision {
            spec: spec.to_owned(),
            message: e.to_string(),
        })
    }
}

impl Vcs for GitRepo {
    fn changed_files(&self, base: &str, head: &str) -> Result<Vec<FileChange>, VcsError> {
        let old_tree = self.tree_at(base)?;
        let new_tree = self.tree_at(head)?;

        let mut options = gix::diff::Options::default();
        options.track_rewrites(Some(gix::diff::Rewrites {
            percentage: Some(RENAME_THRESHOLD),
            ..gix::diff::Rewrites::default()
        }));

        debug!(base, head, "diffing trees");
        let changes = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(options))
            .map_err(|e| VcsError::Backend {
                message: e.to_string(),
            })?;

        Ok(changes.into_iter().filter_map(convert).collect())
    }

    fn file_at(&self, commit: &str, path: &str) -> Result<Option<String>, VcsError> {
        let tree = self.tree_at(commit)?;
        let entry = tree
            .lookup_entry_by_path(path)
            .map_err(|e| VcsError::Backend {
                message: e.to_string(),
            })?;
        let Some(entry) = entry else {
            debug!(commit, path, "path absent at commit");
            return Ok(None);
        };
        if !entry.mode().is_blob() {
            debug!(commit, path, "path is not a file at commit");
            return Ok(None);
        }
        let object = entry.object().map_err(|e| VcsError::Backend {
            message: e.to_string(),
        })?;
        match String::from_utf8(object.detach().data) {
            Ok(text) => Ok(Some(text)),
            Err(_) => Err(VcsError::Encoding {
                commit: commit.to_owned(),
                path: path.to_owned(),
            }),
        }
    }
}

/// Map one tree-diff change onto a [`FileChange`], dropping non-blob
/// entries. A copy leaves the original in place, so only the new path
/// matters to the sync.
fn convert(change: gix::diff::tree_with_rewrites::Change) -> Option<FileChange> {
    use gix::diff::tree_with_rewrites::Change;
    match change {
        Change::Addition {
            location,
            entry_mode,
            ..
        } => entry_mode.is_blob().then(|| FileChange {
            path: location.to_string(),
            status: FileStatus::Added,
        }),
        Change::Deletion {
            location,
            entry_mode,
            ..
        } => entry_mode.is_blob().then(|| FileChange {
            path: location.to_string(),
            status: FileStatus::Deleted,
        }),
        Change::Modification {
            location,
            entry_mode,
            ..
        } => entry_mode.is_blob().then(|| FileChange {
            path: location.to_string(),
            status: FileStatus::Modified,
        }),
        Change::Rewrite {
            location,
            source_location,
            entry_mode,
            copy,
            ..
        } => {
            if !entry_mode.is_blob() {
                return None;
            }
            let status = if copy {
                FileStatus::Added
            } else {
                FileStatus::Renamed {
                    from: source_location.to_string(),
                }
            };
            Some(FileChange {
                path: location.to_string(),
                status,
            })
        }
    }
}

/// In-memory implementation for tests and pre-assembled change lists.
#[derive(Debug, Default)]
pub struct FixedChanges {
    changes: Vec<FileChange>,
    snapshots: HashMap<(String, String), String>,
}

impl FixedChanges {
    /// Create an implementation that reports the given changes.
    #[must_use]
    pub fn new(changes: Vec<FileChange>) -> Self {
        Self {
            changes,
            snapshots: HashMap::new(),
        }
    }

    /// Register a file snapshot for a `(commit, path)` pair.
    #[must_use]
    pub fn with_snapshot(
        mut self,
        commit: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        self.snapshots
            .insert((commit.into(), path.into()), content.into());
        self
    }
}

impl Vcs for FixedChanges {
    fn changed_files(&self, _base: &str, _head: &str) -> Result<Vec<FileChange>, VcsError> {
        Ok(self.changes.clone())
    }

    fn file_at(&self, commit: &str, path: &str) -> Result<Option<String>, VcsError> {
        Ok(self
            .snapshots
            .get(&(commit.to_owned(), path.to_owned()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gix::ObjectId;
    use gix::diff::tree_with_rewrites::Change;
    use gix::objs::tree::EntryKind;

    fn oid() -> ObjectId {
        ObjectId::null(gix::hash::Kind::Sha1)
    }

    #[test]
    fn test_convert_blob_addition_and_deletion() {
        let added = convert(Change::Addition {
            location: "en/new.mdx".into(),
            relation: None,
            entry_mode: EntryKind::Blob.into(),
            id: oid(),
        });
        assert_eq!(added, Some(FileChange {
            path: "en/new.mdx".to_owned(),
            status: FileStatus::Added,
        }));

        let deleted = convert(Change::Deletion {
            location: "en/gone.md".into(),
            relation: None,
            entry_mode: EntryKind::Blob.into(),
            id: oid(),
        });
        assert_eq!(deleted, Some(FileChange {
            path: "en/gone.md".to_owned(),
            status: FileStatus::Deleted,
        }));
    }

    #[test]
    fn test_convert_rewrite_is_a_rename() {
        let change = convert(Change::Rewrite {
            source_location: "en/old-name.mdx".into(),
            source_entry_mode: EntryKind::Blob.into(),
            source_relation: None,
            source_id: oid(),
            diff: None,
            entry_mode: EntryKind::Blob.into(),
            id: oid(),
            location: "en/new-name.mdx".into(),
            relation: None,
            copy: false,
        });
        assert_eq!(change, Some(FileChange {
            path: "en/new-name.mdx".to_owned(),
            status: FileStatus::Renamed {
                from: "en/old-name.mdx".to_owned(),
            },
        }));
    }

    #[test]
    fn test_convert_copy_becomes_addition() {
        let change = convert(Change::Rewrite {
            source_location: "en/template.mdx".into(),
            source_entry_mode: EntryKind::Blob.into(),
            source_relation: None,
            source_id: oid(),
            diff: None,
            entry_mode: EntryKind::Blob.into(),
            id: oid(),
            location: "en/copy.mdx".into(),
            relation: None,
            copy: true,
        });
        assert_eq!(change, Some(FileChange {
            path: "en/copy.mdx".to_owned(),
            status: FileStatus::Added,
        }));
    }

    #[test]
    fn test_convert_skips_directories() {
        let change = convert(Change::Addition {
            location: "en/guides".into(),
            relation: None,
            entry_mode: EntryKind::Tree.into(),
            id: oid(),
        });
        assert_eq!(change, None);
    }

    #[test]
    fn test_fixed_changes_snapshots() {
        let vcs = FixedChanges::new(Vec::new()).with_snapshot("abc", "docs.json", "{}");
        assert_eq!(
            vcs.file_at("abc", "docs.json").unwrap().as_deref(),
            Some("{}")
        );
        assert_eq!(vcs.file_at("def", "docs.json").unwrap(), None);
    }
}
