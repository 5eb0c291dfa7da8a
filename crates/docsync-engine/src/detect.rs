//! Change detection between two commits.
//!
//! Two signals are merged into one [`ChangeSet`]:
//!
//! - file-level statuses from the version control backend, filtered to
//!   source-language content pages; renames come exclusively from the
//!   backend's explicit similarity detection, never inferred here
//! - a structural diff of the source section across the two navigation
//!   snapshots, which is what surfaces moves between groups
//!
//! All paths in the resulting set are extension-free tree paths in the
//! source language.

use std::collections::{BTreeMap, BTreeSet};

use docsync_config::SyncConfig;
use docsync_tree::model::strip_extension;
use docsync_tree::{LanguageSection, NavigationDoc, PageNode};
use docsync_vcs::{FileStatus, Vcs};

use crate::error::SyncError;
use crate::report::SyncWarning;

/// Source-language changes to mirror into the target sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Pages new in the head commit.
    pub added: Vec<String>,
    /// Pages gone in the head commit.
    pub deleted: Vec<String>,
    /// Pages whose parent chain changed between the snapshots.
    pub moved: Vec<String>,
    /// Explicit renames, `(old, new)`.
    pub renamed: Vec<(String, String)>,
    /// Problems encountered while building the set.
    pub warnings: Vec<SyncWarning>,
}

impl ChangeSet {
    /// Whether there is anything to mirror.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.deleted.is_empty()
            && self.moved.is_empty()
            && self.renamed.is_empty()
    }
}

/// Diff the source section between two navigation snapshots.
///
/// Pages present in both snapshots whose parent chain (dropdown name plus
/// group labels) differs are moves. Labels rather than indices identify
/// the chain: removing a sibling shifts every following index without
/// moving anything. Reordering under the same parent is not reported.
/// Pages present on only one side are additions or deletions.
#[must_use]
pub fn detect_structural(old: &LanguageSection, new: &LanguageSection) -> ChangeSet {
    let old_chains = label_chains(old);
    let new_chains = label_chains(new);

    let mut set = ChangeSet::default();
    for (path, chain) in &new_chains {
        match old_chains.get(path) {
            None => set.added.push(path.clone()),
            Some(prior) if prior != chain => set.moved.push(path.clone()),
            Some(_) => {}
        }
    }
    for path in old_chains.keys() {
        if !new_chains.contains_key(path) {
            set.deleted.push(path.clone());
        }
    }
    set
}

/// Map each content page to its parent chain of labels, dropdown name
/// first.
fn label_chains(section: &LanguageSection) -> BTreeMap<String, Vec<String>> {
    let mut map = BTreeMap::new();
    for dropdown in &section.dropdowns {
        let mut chain = vec![dropdown.dropdown.clone()];
        collect_chains(&dropdown.pages, &mut chain, &mut map);
    }
    map
}

fn collect_chains(
    pages: &[PageNode],
    chain: &mut Vec<String>,
    out: &mut BTreeMap<String, Vec<String>>,
) {
    for node in pages {
        match node {
            PageNode::Page(path) => {
                out.insert(path.clone(), chain.clone());
            }
            PageNode::Group(group) => {
                chain.push(group.group.clone());
                collect_chains(&group.pages, chain, out);
                chain.pop();
            }
            PageNode::OpenApi(_) => {}
        }
    }
}

/// Build the change set for `base..head`.
///
/// File statuses outside the source language's content directory are
/// ignored. When the navigation file itself changed, both snapshots are
/// fetched and structurally diffed; an unreadable snapshot degrades the
/// run to file-level detection with a warning rather than failing it.
///
/// # Errors
///
/// Only backend failures (spawning `git`, a failing diff) are fatal.
pub fn collect_changes<V: Vcs>(
    vcs: &V,
    base: &str,
    head: &str,
    config: &SyncConfig,
) -> Result<ChangeSet, SyncError> {
    let mut set = ChangeSet::default();
    let mut nav_changed = false;
    let nav_path = config.docs_json.to_string_lossy();

    for change in vcs.changed_files(base, head)? {
        if change.path == nav_path {
            nav_changed = true;
            continue;
        }
        if !config.is_source_doc(&change.path) {
            continue;
        }
        let path = strip_extension(&change.path).to_owned();
        match change.status {
            FileStatus::Added => set.added.push(path),
            FileStatus::Deleted => set.deleted.push(path),
            FileStatus::Renamed { from } => {
                set.renamed.push((strip_extension(&from).to_owned(), path));
            }
            FileStatus::Modified => {}
        }
    }

    if nav_changed {
        merge_structural(vcs, base, head, &nav_path, config, &mut set)?;
    }

    // A rename shows up in the snapshot diff as a delete plus an add;
    // the explicit signal wins.
    let rename_old: BTreeSet<&str> = set.renamed.iter().map(|(old, _)| old.as_str()).collect();
    let rename_new: BTreeSet<&str> = set.renamed.iter().map(|(_, new)| new.as_str()).collect();
    set.added.retain(|p| !rename_new.contains(p.as_str()));
    set.deleted.retain(|p| !rename_old.contains(p.as_str()));

    dedup(&mut set.added);
    dedup(&mut set.deleted);
    dedup(&mut set.moved);

    tracing::debug!(
        added = set.added.len(),
        deleted = set.deleted.len(),
        moved = set.moved.len(),
        renamed = set.renamed.len(),
        "change set collected"
    );
    Ok(set)
}

fn merge_structural<V: Vcs>(
    vcs: &V,
    base: &str,
    head: &str,
    nav_path: &str,
    config: &SyncConfig,
    set: &mut ChangeSet,
) -> Result<(), SyncError> {
    let Some(source) = config.source_spec() else {
        return Ok(());
    };
    let mut snapshot = |commit: &str| -> Result<Option<LanguageSection>, SyncError> {
        let Some(text) = vcs.file_at(commit, nav_path)? else {
            tracing::debug!(commit, "navigation file absent at commit");
            return Ok(None);
        };
        match NavigationDoc::parse(&text) {
            Ok(doc) => Ok(doc.section(&source.tag).cloned()),
            Err(err) => {
                set.warnings.push(SyncWarning::SnapshotUnreadable {
                    commit: commit.to_owned(),
                    detail: err.to_string(),
                });
                Ok(None)
            }
        }
    };

    let (Some(old), Some(new)) = (snapshot(base)?, snapshot(head)?) else {
        return Ok(());
    };

    let structural = detect_structural(&old, &new);
    set.added.extend(structural.added);
    set.deleted.extend(structural.deleted);
    set.moved.extend(structural.moved);
    Ok(())
}

fn dedup(paths: &mut Vec<String>) {
    let mut seen = BTreeSet::new();
    paths.retain(|p| seen.insert(p.clone()));
}
