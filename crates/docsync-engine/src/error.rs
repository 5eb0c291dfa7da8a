//! Fatal failures of a reconciliation run.

use std::path::PathBuf;

use docsync_tree::TreeError;
use docsync_vcs::VcsError;

/// Errors that abort a run entirely.
///
/// Anything scoped to a single file is a
/// [`SyncWarning`](crate::SyncWarning) instead; these variants mean the
/// navigation tree itself cannot be read, understood, or written back.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The navigation document failed to parse or serialize.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Talking to the version control backend failed.
    #[error(transparent)]
    Vcs(#[from] VcsError),

    /// Reading or writing the navigation file failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document has no section for the source language; nothing can
    /// be mirrored without one.
    #[error("no navigation section for source language {0}")]
    MissingSection(String),
}
