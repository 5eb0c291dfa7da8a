//! Navigation-structure synchronization engine.
//!
//! Propagates structural changes detected in the source-language section
//! of the navigation tree (additions, deletions, moves, and explicit
//! renames) into every target-language section, preserving manually
//! translated group labels through content-based matching and re-emitting
//! the tree in its original on-disk format.
//!
//! One reconciliation run reads the tree once, threads the value through
//! the rename, move, and add/delete phases, and writes it back once.
//! Per-file failures become warnings in the [`SyncReport`]; only
//! tree-level parse and write failures abort a run.

mod detect;
mod error;
mod files;
mod reconciler;
mod report;

use std::path::Path;

pub use detect::{ChangeSet, collect_changes, detect_structural};
pub use error::SyncError;
pub use files::{ContentStore, FsStore, MemStore, StoreError};
pub use reconciler::{Reconciler, SyncOutcome};
pub use report::{AppliedOp, SyncReport, SyncWarning};

use docsync_config::SyncConfig;
use docsync_tree::{JsonStyle, NavigationDoc, format};

/// Reconcile the navigation file on disk against a change set.
///
/// Reads the file once, runs the [`Reconciler`], and writes the result
/// back atomically (temp file plus rename in the same directory) using
/// the detected formatting style. A failure to serialize or write leaves
/// the prior file untouched.
///
/// # Errors
///
/// Fatal conditions only: unreadable or unparseable navigation file,
/// missing source-language section, or a failed write.
pub fn sync_navigation_file<S: ContentStore>(
    path: &Path,
    config: &SyncConfig,
    changes: &ChangeSet,
    store: &mut S,
) -> Result<SyncReport, SyncError> {
    let text = std::fs::read_to_string(path).map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let style = JsonStyle::detect(&text);
    let doc = NavigationDoc::parse(&text)?;

    let outcome = Reconciler::new(config).run(doc, changes, store)?;
    let output = format::to_string_preserving(&outcome.doc, &style, &text)?;

    write_atomic(path, &output)?;
    tracing::info!(
        path = %path.display(),
        applied = outcome.report.applied.len(),
        warnings = outcome.report.warnings.len(),
        "navigation synchronized"
    );
    Ok(outcome.report)
}

/// Write via a sibling temp file and rename, so the target is either the
/// old content or the complete new content.
fn write_atomic(path: &Path, content: &str) -> Result<(), SyncError> {
    let io_err = |source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    std::io::Write::write_all(&mut tmp, content.as_bytes()).map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
