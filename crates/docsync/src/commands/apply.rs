//! `docsync apply` command implementation.
//!
//! Applies a locally assembled list of content paths instead of a git
//! commit range: every given file becomes an addition (or, with
//! `--delete`, a deletion) in the source language, then reconciliation
//! proceeds exactly as for `sync`.

use std::path::{Path, PathBuf};

use clap::Args;
use docsync_engine::ChangeSet;
use docsync_tree::model::strip_extension;

use crate::commands::common;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the apply command.
#[derive(Args)]
pub struct ApplyArgs {
    /// Content file to apply, relative to the repository root (repeatable).
    #[arg(long = "file", value_name = "PATH")]
    files: Vec<String>,

    /// Directory to scan for content files, relative to the repository root.
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Treat the given paths as deletions instead of additions.
    #[arg(long)]
    delete: bool,

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

impl ApplyArgs {
    /// Execute the apply command.
    ///
    /// # Errors
    ///
    /// Returns an error when no paths are given, configuration fails, or
    /// the reconciliation itself fails.
    pub fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let repo = self.repo.unwrap_or_else(|| PathBuf::from("."));

        let config = common::load_config(self.config.as_deref(), &repo)?;

        let mut paths = self.files;
        if let Some(dir) = &self.dir {
            collect_docs(&repo, &repo.join(dir), &mut paths)?;
        }
        if paths.is_empty() {
            return Err(CliError::Validation(
                "no content files given; pass --file or --dir".to_owned(),
            ));
        }

        let mut changes = ChangeSet::default();
        for path in paths {
            if !config.is_source_doc(&path) {
                output.warning(&format!("skipping non-source path: {path}"));
                continue;
            }
            let stripped = strip_extension(&path).to_owned();
            if self.delete {
                changes.deleted.push(stripped);
            } else {
                changes.added.push(stripped);
            }
        }

        common::execute_sync(&repo, &config, &changes, self.dry_run, &output)
    }
}

/// Recursively collect `.md`/`.mdx` files under `dir`, as repo-relative
/// forward-slash paths, in sorted order.
fn collect_docs(repo: &Path, dir: &Path, out: &mut Vec<String>) -> Result<(), std::io::Error> {
    let mut found = Vec::new();
    walk(repo, dir, &mut found)?;
    found.sort();
    out.extend(found);
    Ok(())
}

fn walk(repo: &Path, dir: &Path, out: &mut Vec<String>) -> Result<(), std::io::Error> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(repo, &path, out)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext == "md" || ext == "mdx")
        {
            let rel = path.strip_prefix(repo).unwrap_or(&path);
            out.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_docs_finds_only_content_files() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("en/guides");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("b.mdx"), "").unwrap();
        std::fs::write(docs.join("a.md"), "").unwrap();
        std::fs::write(docs.join("image.png"), "").unwrap();

        let mut out = Vec::new();
        collect_docs(dir.path(), &dir.path().join("en"), &mut out).unwrap();

        assert_eq!(out, vec!["en/guides/a.md", "en/guides/b.mdx"]);
    }
}
