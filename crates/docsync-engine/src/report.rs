//! Outcome reporting for a reconciliation run.
//!
//! A run never aborts on a single file: anything that prevents one change
//! from applying cleanly becomes a [`SyncWarning`] and the run continues.
//! Everything that *was* applied is recorded as an [`AppliedOp`] so the
//! caller can print an exact account of what happened.

use std::fmt;

/// A recoverable problem encountered while applying one change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncWarning {
    /// The path no longer resolves in the section it was expected in.
    #[error("`{path}` not found in the {language} section")]
    LocationNotFound {
        /// Language tag of the section searched.
        language: String,
        /// Extension-free page path that failed to resolve.
        path: String,
    },

    /// The target section's structure diverged past what matching can
    /// bridge for this change.
    #[error("structure mismatch in {language} for `{path}`: {detail}")]
    StructureMismatch {
        /// Language tag of the affected section.
        language: String,
        /// Extension-free page path being placed.
        path: String,
        /// Human-readable description of the divergence.
        detail: String,
    },

    /// A configured target language has no section in the document.
    #[error("no navigation section for language {language}")]
    MissingSection {
        /// Language tag with no matching section.
        language: String,
    },

    /// The navigation snapshot at a commit could not be parsed, so
    /// structural move detection was skipped for this run.
    #[error("navigation snapshot at {commit} unreadable: {detail}")]
    SnapshotUnreadable {
        /// Commit the snapshot was read from.
        commit: String,
        /// Parse failure description.
        detail: String,
    },

    /// A content-file operation failed on disk; the tree edit stands.
    #[error("content file operation on `{path}` failed: {detail}")]
    ContentFile {
        /// Extension-free page path of the affected file.
        path: String,
        /// I/O failure description.
        detail: String,
    },
}

/// One change that was applied during the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedOp {
    /// A page entry was added to a target section.
    Added {
        /// Target language tag.
        language: String,
        /// Inserted extension-free page path.
        path: String,
    },
    /// A page entry was removed from a target section.
    Removed {
        /// Target language tag.
        language: String,
        /// Removed extension-free page path.
        path: String,
    },
    /// A page entry was relocated within a target section.
    Moved {
        /// Target language tag.
        language: String,
        /// Relocated extension-free page path.
        path: String,
    },
    /// A page entry's path was rewritten in place.
    Renamed {
        /// Target language tag.
        language: String,
        /// Prior extension-free page path.
        from: String,
        /// New extension-free page path.
        to: String,
    },
    /// A target content file was renamed on disk.
    FileRenamed {
        /// Prior extension-free page path.
        from: String,
        /// New extension-free page path.
        to: String,
    },
    /// A target content file was deleted on disk.
    FileRemoved {
        /// Extension-free page path of the deleted file.
        path: String,
    },
    /// A source page with no translated counterpart yet was queued for
    /// first-time translation instead of being renamed.
    QueuedAddition {
        /// Extension-free source page path.
        path: String,
    },
}

impl fmt::Display for AppliedOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { language, path } => write!(f, "[{language}] + {path}"),
            Self::Removed { language, path } => write!(f, "[{language}] - {path}"),
            Self::Moved { language, path } => write!(f, "[{language}] ~ {path}"),
            Self::Renamed { language, from, to } => {
                write!(f, "[{language}] {from} -> {to}")
            }
            Self::FileRenamed { from, to } => write!(f, "[fs] {from} -> {to}"),
            Self::FileRemoved { path } => write!(f, "[fs] - {path}"),
            Self::QueuedAddition { path } => write!(f, "[queued] + {path}"),
        }
    }
}

/// Everything a reconciliation run did and failed to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Changes applied, in application order.
    pub applied: Vec<AppliedOp>,
    /// Recoverable problems, in encounter order.
    pub warnings: Vec<SyncWarning>,
}

impl SyncReport {
    /// Whether the run changed anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.warnings.is_empty()
    }
}
