//! Content-based group matching across language sections.
//!
//! Group labels are translated independently per language and dropdown
//! ordering drifts under manual editing, so neither labels nor positions
//! identify "the same group" across sections. The one stable signal is the
//! *content*: the set of normalized leaf paths a group contains. Two groups
//! match when those sets are exactly equal; partial overlap is never
//! merged, to avoid folding unrelated groups into each other.

use std::collections::BTreeSet;

use crate::model::{Group, PageNode, normalize_path};

/// Recursive set of normalized leaf paths contained in `pages`.
///
/// Only content pages contribute; OpenAPI references have no content path
/// and are ignored for matching purposes.
#[must_use]
pub fn leaf_path_set(pages: &[PageNode], language_dirs: &[String]) -> BTreeSet<String> {
    let mut set = BTreeSet::new();
    collect_paths(pages, language_dirs, &mut set);
    set
}

fn collect_paths(pages: &[PageNode], language_dirs: &[String], out: &mut BTreeSet<String>) {
    for node in pages {
        match node {
            PageNode::Page(path) => {
                out.insert(normalize_path(path, language_dirs).to_owned());
            }
            PageNode::Group(group) => collect_paths(&group.pages, language_dirs, out),
            PageNode::OpenApi(_) => {}
        }
    }
}

/// Find a group among `siblings` that is semantically the same as `source`.
///
/// Matching is by exact equality of the recursive normalized leaf-path
/// sets. `exclude` names the normalized path currently being placed: the
/// source tree already contains it while the target does not yet, so it
/// is dropped from both sides before comparing. Groups whose remaining
/// set is empty carry no content signal and fall back to label comparison
/// against `translated_label` or the source label verbatim.
///
/// Returns the index of the matching sibling, or `None` when a genuinely
/// new group must be created.
#[must_use]
pub fn find_matching_group(
    source: &Group,
    siblings: &[PageNode],
    language_dirs: &[String],
    translated_label: &str,
    exclude: Option<&str>,
) -> Option<usize> {
    let mut source_set = leaf_path_set(&source.pages, language_dirs);
    if let Some(path) = exclude {
        source_set.remove(path);
    }

    if source_set.is_empty() {
        return siblings.iter().position(|node| {
            matches!(node, PageNode::Group(g)
                if g.group == translated_label || g.group == source.group)
        });
    }

    for (idx, node) in siblings.iter().enumerate() {
        let PageNode::Group(candidate) = node else {
            continue;
        };
        let mut candidate_set = leaf_path_set(&candidate.pages, language_dirs);
        if let Some(path) = exclude {
            candidate_set.remove(path);
        }
        if candidate_set == source_set {
            tracing::debug!(
                source = %source.group,
                target = %candidate.group,
                "matched group by content"
            );
            return Some(idx);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Group;

    fn dirs() -> Vec<String> {
        vec!["en".to_owned(), "zh-hans".to_owned()]
    }

    fn group(label: &str, pages: &[&str]) -> Group {
        Group {
            pages: pages
                .iter()
                .map(|p| PageNode::Page((*p).to_owned()))
                .collect(),
            ..Group::new(label)
        }
    }

    #[test]
    fn test_match_by_content_across_languages() {
        let source = group("Basics", &["en/basics/intro", "en/basics/setup"]);
        let siblings = vec![
            PageNode::Group(group("进阶", &["zh-hans/advanced/tips"])),
            PageNode::Group(group("基础", &["zh-hans/basics/intro", "zh-hans/basics/setup"])),
        ];

        let idx = find_matching_group(&source, &siblings, &dirs(), "无关", None);
        assert_eq!(idx, Some(1));
    }

    #[test]
    fn test_partial_overlap_is_not_a_match() {
        let source = group("Basics", &["en/basics/intro", "en/basics/setup"]);
        let siblings = vec![PageNode::Group(group("基础", &["zh-hans/basics/intro"]))];

        assert_eq!(
            find_matching_group(&source, &siblings, &dirs(), "基础", None),
            None
        );
    }

    #[test]
    fn test_excluded_page_does_not_block_the_match() {
        // The source already holds the page being placed; the target
        // only catches up after matching succeeds.
        let source = group("Basics", &["en/basics/intro", "en/basics/new"]);
        let siblings = vec![PageNode::Group(group("基础", &["zh-hans/basics/intro"]))];

        assert_eq!(
            find_matching_group(&source, &siblings, &dirs(), "基础", Some("basics/new")),
            Some(0)
        );
        assert_eq!(
            find_matching_group(&source, &siblings, &dirs(), "基础", None),
            None
        );
    }

    #[test]
    fn test_nested_paths_contribute_to_the_set() {
        let mut source = group("Guides", &["en/guides/start"]);
        source
            .pages
            .push(PageNode::Group(group("Deep", &["en/guides/deep/one"])));

        let mut target = group("指南", &["zh-hans/guides/start"]);
        target
            .pages
            .push(PageNode::Group(group("深入", &["zh-hans/guides/deep/one"])));

        let siblings = vec![PageNode::Group(target)];
        assert_eq!(
            find_matching_group(&source, &siblings, &dirs(), "x", None),
            Some(0)
        );
    }

    #[test]
    fn test_empty_group_falls_back_to_label() {
        let source = Group::new("Reference");
        let siblings = vec![
            PageNode::Group(Group::new("参考")),
            PageNode::Page("zh-hans/misc".to_owned()),
        ];

        assert_eq!(
            find_matching_group(&source, &siblings, &dirs(), "参考", None),
            Some(0)
        );
        assert_eq!(
            find_matching_group(&source, &siblings, &dirs(), "别的", None),
            None
        );
    }

    #[test]
    fn test_leaf_set_ignores_openapi_refs() {
        let mut g = group("API", &["en/api/usage"]);
        g.pages.push(PageNode::OpenApi(crate::model::OpenApiRef {
            group: "Spec".to_owned(),
            openapi: serde_json::Value::String("en/openapi.json".to_owned()),
            extra: serde_json::Map::new(),
        }));

        let set = leaf_path_set(&g.pages, &dirs());
        assert_eq!(set.len(), 1);
        assert!(set.contains("api/usage"));
    }
}
