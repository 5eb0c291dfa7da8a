//! Recursive traversal and mutation of language sections.
//!
//! Extraction walks a section once and produces a map from leaf path to
//! [`Location`]. Insertion replays a source location against a *target*
//! section, resolving each level through the content-based group matcher
//! rather than literal index replay, and creating structurally equivalent
//! groups where the target has none yet. Removal and renaming resolve by
//! content identity so they keep working after the structures have
//! drifted apart.

use std::collections::BTreeMap;

use crate::Location;
use crate::matcher::find_matching_group;
use crate::model::{Dropdown, Group, LanguageSection, PageNode};

/// Structural failure while navigating a section.
///
/// These are recoverable at the batch level: the engine reports the
/// affected file as a warning and continues with the rest.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    /// The source location names a dropdown index the section lacks.
    #[error("no dropdown at index {0}")]
    MissingDropdown(usize),

    /// The source location names a child index past the present entries.
    #[error("no entry at {location} in dropdown `{dropdown}`")]
    MissingEntry {
        /// Dropdown display name.
        dropdown: String,
        /// Stringified index chain that failed to resolve.
        location: String,
    },

    /// Navigation hit a leaf where a group was expected.
    #[error("expected a group at {location} in dropdown `{dropdown}`")]
    NotAGroup {
        /// Dropdown display name.
        dropdown: String,
        /// Stringified index chain that failed to resolve.
        location: String,
    },
}

/// Extract the location of every content page in a section.
///
/// Leaf paths are expected to be unique within one section; a duplicate
/// keeps its first occurrence and is logged.
#[must_use]
pub fn page_locations(section: &LanguageSection) -> BTreeMap<String, Location> {
    let mut map = BTreeMap::new();
    for (dropdown, entry) in section.dropdowns.iter().enumerate() {
        let mut groups = Vec::new();
        collect(&entry.pages, dropdown, &mut groups, &mut map);
    }
    map
}

fn collect(
    pages: &[PageNode],
    dropdown: usize,
    groups: &mut Vec<usize>,
    out: &mut BTreeMap<String, Location>,
) {
    for (index, node) in pages.iter().enumerate() {
        match node {
            PageNode::Page(path) => {
                let location = Location {
                    dropdown,
                    groups: groups.clone(),
                    index,
                };
                if out.insert(path.clone(), location).is_some() {
                    tracing::warn!(path = %path, "duplicate page path in section");
                }
            }
            PageNode::Group(group) => {
                groups.push(index);
                collect(&group.pages, dropdown, groups, out);
                groups.pop();
            }
            PageNode::OpenApi(_) => {}
        }
    }
}

/// Insert `page` into `target` at the position `location` describes in
/// `source`.
///
/// The group chain is translated level by level: an existing target group
/// with the same content set is reused, otherwise a new group is created
/// mirroring the source group's structure (icon carried over, label passed
/// through `label_for`). The dropdown is resolved by translated or
/// original name and created when absent.
///
/// # Errors
///
/// [`WalkError::MissingDropdown`] / [`WalkError::MissingEntry`] when the
/// location does not resolve in the *source* section, and
/// [`WalkError::NotAGroup`] when an intermediate node of the source chain
/// that should be a group is a leaf.
pub fn insert_at<F>(
    target: &mut LanguageSection,
    source: &LanguageSection,
    location: &Location,
    page: PageNode,
    language_dirs: &[String],
    mut label_for: F,
) -> Result<(), WalkError>
where
    F: FnMut(&str) -> String,
{
    let source_dropdown = source
        .dropdowns
        .get(location.dropdown)
        .ok_or(WalkError::MissingDropdown(location.dropdown))?;

    // The page being placed is already in the source tree but not yet in
    // the target; matching must not count it on either side.
    let exclude = match &page {
        PageNode::Page(path) => Some(crate::model::normalize_path(path, language_dirs).to_owned()),
        _ => None,
    };

    let dropdown_idx = resolve_dropdown(target, source_dropdown, &mut label_for);
    let dropdown_name = target.dropdowns[dropdown_idx].dropdown.clone();

    let mut source_pages = &source_dropdown.pages;
    let mut target_pages = &mut target.dropdowns[dropdown_idx].pages;

    for (depth, &group_idx) in location.groups.iter().enumerate() {
        let chain = || {
            let mut loc = format!("dropdown[{}]", location.dropdown);
            for g in &location.groups[..=depth] {
                loc.push_str(&format!(".pages[{g}]"));
            }
            loc
        };
        let source_group = match source_pages.get(group_idx) {
            Some(PageNode::Group(group)) => group,
            Some(_) => {
                return Err(WalkError::NotAGroup {
                    dropdown: source_dropdown.dropdown.clone(),
                    location: chain(),
                });
            }
            None => {
                return Err(WalkError::MissingEntry {
                    dropdown: source_dropdown.dropdown.clone(),
                    location: chain(),
                });
            }
        };

        let translated = label_for(&source_group.group);
        let idx = match find_matching_group(
            source_group,
            target_pages.as_slice(),
            language_dirs,
            &translated,
            exclude.as_deref(),
        ) {
            Some(idx) => idx,
            None => {
                let created = Group {
                    icon: source_group.icon.clone(),
                    ..Group::new(translated)
                };
                let at = group_idx.min(target_pages.len());
                tracing::info!(
                    group = %created.group,
                    dropdown = %dropdown_name,
                    "creating group in target section"
                );
                target_pages.insert(at, PageNode::Group(created));
                at
            }
        };

        source_pages = &source_group.pages;
        let parent = target_pages;
        target_pages = match &mut parent[idx] {
            PageNode::Group(group) => &mut group.pages,
            _ => {
                return Err(WalkError::NotAGroup {
                    dropdown: dropdown_name,
                    location: chain(),
                });
            }
        };
    }

    let at = location.index.min(target_pages.len());
    target_pages.insert(at, page);
    Ok(())
}

/// Resolve the target dropdown for a source dropdown, creating it when
/// the target section has no counterpart.
fn resolve_dropdown<F>(
    target: &mut LanguageSection,
    source_dropdown: &Dropdown,
    label_for: &mut F,
) -> usize
where
    F: FnMut(&str) -> String,
{
    let translated = label_for(&source_dropdown.dropdown);
    if let Some(idx) = target
        .dropdowns
        .iter()
        .position(|d| d.dropdown == translated || d.dropdown == source_dropdown.dropdown)
    {
        return idx;
    }

    tracing::info!(dropdown = %translated, language = %target.language, "creating dropdown");
    target.dropdowns.push(Dropdown {
        dropdown: translated,
        icon: source_dropdown.icon.clone(),
        pages: Vec::new(),
        extra: serde_json::Map::new(),
    });
    target.dropdowns.len() - 1
}

/// Remove a content page by path, wherever it sits in the section.
///
/// Groups left without any entries are pruned; groups that still hold
/// siblings are kept. Returns whether the page was found.
pub fn remove_page(section: &mut LanguageSection, path: &str) -> bool {
    for dropdown in &mut section.dropdowns {
        if remove_from(&mut dropdown.pages, path) {
            return true;
        }
    }
    false
}

fn remove_from(pages: &mut Vec<PageNode>, path: &str) -> bool {
    if let Some(pos) = pages
        .iter()
        .position(|n| matches!(n, PageNode::Page(p) if p == path))
    {
        pages.remove(pos);
        return true;
    }

    for idx in 0..pages.len() {
        let PageNode::Group(group) = &mut pages[idx] else {
            continue;
        };
        if remove_from(&mut group.pages, path) {
            if group.pages.is_empty() {
                tracing::debug!(group = %group.group, "pruning empty group");
                pages.remove(idx);
            }
            return true;
        }
    }
    false
}

/// Replace a content page's path in place, keeping its position.
///
/// Returns whether the page was found.
pub fn rename_page(section: &mut LanguageSection, from: &str, to: &str) -> bool {
    for dropdown in &mut section.dropdowns {
        if rename_in(&mut dropdown.pages, from, to) {
            return true;
        }
    }
    false
}

fn rename_in(pages: &mut [PageNode], from: &str, to: &str) -> bool {
    for node in pages {
        match node {
            PageNode::Page(path) if path == from => {
                to.clone_into(path);
                return true;
            }
            PageNode::Group(group) => {
                if rename_in(&mut group.pages, from, to) {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}
