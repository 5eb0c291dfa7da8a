//! Shared plumbing for the sync and apply commands.

use std::path::Path;

use docsync_config::SyncConfig;
use docsync_engine::{
    ChangeSet, ContentStore, FsStore, Reconciler, StoreError, SyncError, SyncReport,
    sync_navigation_file,
};
use docsync_tree::NavigationDoc;

use crate::error::CliError;
use crate::output::Output;

/// Load configuration from an explicit file or by upward discovery from
/// the repository root.
pub fn load_config(explicit: Option<&Path>, repo: &Path) -> Result<SyncConfig, CliError> {
    let config = match explicit {
        Some(path) => SyncConfig::load(path)?,
        None => SyncConfig::discover(repo)?,
    };
    Ok(config)
}

/// Run (or preview) the reconciliation and print the outcome.
pub fn execute_sync(
    repo: &Path,
    config: &SyncConfig,
    changes: &ChangeSet,
    dry_run: bool,
    output: &Output,
) -> Result<(), CliError> {
    if changes.is_empty() && changes.warnings.is_empty() {
        output.success("Nothing to synchronize.");
        return Ok(());
    }

    print_changes(output, changes);

    let docs_path = repo.join(&config.docs_json);
    let report = if dry_run {
        let text = std::fs::read_to_string(&docs_path)?;
        let doc = NavigationDoc::parse(&text).map_err(SyncError::Tree)?;
        let mut store = DryRunStore::new(FsStore::new(repo));
        let outcome = Reconciler::new(config).run(doc, changes, &mut store)?;
        output.info("Dry run - no files were modified.");
        outcome.report
    } else {
        let mut store = FsStore::new(repo);
        sync_navigation_file(&docs_path, config, changes, &mut store)?
    };

    print_report(output, &report);
    Ok(())
}

fn print_changes(output: &Output, changes: &ChangeSet) {
    for path in &changes.added {
        output.detail(&format!("added:   {path}"));
    }
    for path in &changes.deleted {
        output.detail(&format!("deleted: {path}"));
    }
    for path in &changes.moved {
        output.detail(&format!("moved:   {path}"));
    }
    for (from, to) in &changes.renamed {
        output.detail(&format!("renamed: {from} -> {to}"));
    }
}

fn print_report(output: &Output, report: &SyncReport) {
    for op in &report.applied {
        output.info(&op.to_string());
    }
    for warning in &report.warnings {
        output.warning(&format!("warning: {warning}"));
    }
    output.success(&format!(
        "{} operations applied, {} warnings.",
        report.applied.len(),
        report.warnings.len()
    ));
}

/// Store wrapper that answers existence checks from the real filesystem
/// but swallows all mutations.
struct DryRunStore {
    inner: FsStore,
}

impl DryRunStore {
    fn new(inner: FsStore) -> Self {
        Self { inner }
    }
}

impl ContentStore for DryRunStore {
    fn exists(&self, path: &str) -> bool {
        self.inner.exists(path)
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), StoreError> {
        tracing::debug!(from, to, "dry run, skipping file rename");
        Ok(())
    }

    fn remove(&mut self, path: &str) -> Result<(), StoreError> {
        tracing::debug!(path, "dry run, skipping file removal");
        Ok(())
    }
}
