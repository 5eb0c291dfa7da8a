//! `docsync sync` command implementation.

use std::path::PathBuf;

use clap::Args;
use docsync_engine::{SyncError, collect_changes};
use docsync_vcs::GitRepo;

use crate::commands::common;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the sync command.
#[derive(Args)]
pub struct SyncArgs {
    /// Base revision of the commit range.
    #[arg(long)]
    base: String,

    /// Head revision of the commit range.
    #[arg(long, default_value = "HEAD")]
    head: String,

    /// Repository root (default: current directory).
    #[arg(long)]
    repo: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover docsync.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the change set and planned operations without touching disk.
    #[arg(long)]
    dry_run: bool,
}

impl SyncArgs {
    /// Execute the sync command.
    ///
    /// # Errors
    ///
    /// Returns an error when configuration, git, or the reconciliation
    /// itself fails.
    pub fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let repo = self.repo.unwrap_or_else(|| PathBuf::from("."));

        let config = common::load_config(self.config.as_deref(), &repo)?;
        let vcs = GitRepo::discover(&repo).map_err(SyncError::from)?;

        output.info(&format!("Comparing {}..{}", self.base, self.head));
        let changes = collect_changes(&vcs, &self.base, &self.head, &config)?;

        common::execute_sync(&repo, &config, &changes, self.dry_run, &output)
    }
}
