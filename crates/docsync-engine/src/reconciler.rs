//! Mirrors source-section changes into every target section.
//!
//! The source section is cloned once at the start and used as an
//! immutable snapshot throughout; all mutation happens on the target
//! sections of the same document value. Changes apply in three phases
//! (renames, moves, then additions and deletions) so a page that was
//! both renamed and moved in one commit range lands correctly.
//!
//! Per-file problems are reported and skipped; only a missing source
//! section aborts the run.

use docsync_config::{LanguageSpec, SyncConfig};
use docsync_tree::{Location, NavigationDoc, PageNode, walker};

use crate::detect::ChangeSet;
use crate::error::SyncError;
use crate::files::ContentStore;
use crate::report::{AppliedOp, SyncReport, SyncWarning};

/// The document after a run, plus the account of what was done.
#[derive(Debug)]
pub struct SyncOutcome {
    /// The updated navigation document.
    pub doc: NavigationDoc,
    /// Applied operations and warnings.
    pub report: SyncReport,
}

/// Applies a [`ChangeSet`] to the target sections of a document.
#[derive(Debug)]
pub struct Reconciler<'a> {
    config: &'a SyncConfig,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler over the given configuration.
    #[must_use]
    pub fn new(config: &'a SyncConfig) -> Self {
        Self { config }
    }

    /// Apply `changes` to every configured target section of `doc`.
    ///
    /// # Errors
    ///
    /// [`SyncError::MissingSection`] when the document lacks a section
    /// for the source language. Target problems are warnings instead.
    pub fn run<S: ContentStore>(
        &self,
        mut doc: NavigationDoc,
        changes: &ChangeSet,
        store: &mut S,
    ) -> Result<SyncOutcome, SyncError> {
        let source = self
            .config
            .source_spec()
            .ok_or_else(|| SyncError::MissingSection(self.config.source.clone()))?;
        let snapshot = doc
            .section(&source.tag)
            .cloned()
            .ok_or_else(|| SyncError::MissingSection(source.tag.clone()))?;
        let source_locations = walker::page_locations(&snapshot);
        let dirs = self.config.language_dirs();

        let mut report = SyncReport {
            applied: Vec::new(),
            warnings: changes.warnings.clone(),
        };

        // Targets checked up front; a section cannot disappear mid-run.
        let mut targets: Vec<&LanguageSpec> = Vec::new();
        for key in &self.config.targets {
            let Some(spec) = self.config.language(key) else {
                tracing::warn!(language = %key, "target language not configured, skipping");
                continue;
            };
            if doc.section(&spec.tag).is_some() {
                targets.push(spec);
            } else {
                report.warnings.push(SyncWarning::MissingSection {
                    language: spec.tag.clone(),
                });
            }
        }

        let mut queued = Vec::new();
        for (from, to) in &changes.renamed {
            self.apply_rename(&mut doc, &targets, store, from, to, &mut queued, &mut report);
        }

        for path in &changes.moved {
            let Some(location) = source_locations.get(path) else {
                report.warnings.push(SyncWarning::LocationNotFound {
                    language: source.tag.clone(),
                    path: path.clone(),
                });
                continue;
            };
            for spec in &targets {
                self.apply_move(&mut doc, &snapshot, spec, path, location, &dirs, &mut report);
            }
        }

        for path in changes.added.iter().chain(&queued) {
            let Some(location) = source_locations.get(path) else {
                report.warnings.push(SyncWarning::LocationNotFound {
                    language: source.tag.clone(),
                    path: path.clone(),
                });
                continue;
            };
            for spec in &targets {
                self.apply_add(&mut doc, &snapshot, spec, path, location, &dirs, &mut report);
            }
        }

        for path in &changes.deleted {
            for spec in &targets {
                self.apply_delete(&mut doc, spec, store, path, &mut report);
            }
        }

        Ok(SyncOutcome { doc, report })
    }

    /// Rename the translated file and tree entry in every target; a
    /// target with no translated file yet gets the new source page queued
    /// for first-time addition instead.
    #[allow(clippy::too_many_arguments)]
    fn apply_rename<S: ContentStore>(
        &self,
        doc: &mut NavigationDoc,
        targets: &[&LanguageSpec],
        store: &mut S,
        from: &str,
        to: &str,
        queued: &mut Vec<String>,
        report: &mut SyncReport,
    ) {
        for spec in targets {
            let target_from = self.config.retarget_path(from, spec);
            let target_to = self.config.retarget_path(to, spec);

            if store.exists(&target_from) {
                match store.rename(&target_from, &target_to) {
                    Ok(()) => report.applied.push(AppliedOp::FileRenamed {
                        from: target_from.clone(),
                        to: target_to.clone(),
                    }),
                    Err(err) => report.warnings.push(SyncWarning::ContentFile {
                        path: target_from.clone(),
                        detail: err.to_string(),
                    }),
                }
            } else if !queued.iter().any(|q| q == to) {
                tracing::info!(path = %to, "no translation yet, queueing as addition");
                queued.push(to.to_owned());
                report
                    .applied
                    .push(AppliedOp::QueuedAddition { path: to.to_owned() });
            }

            let Some(section) = doc.section_mut(&spec.tag) else {
                continue;
            };
            if walker::rename_page(section, &target_from, &target_to) {
                report.applied.push(AppliedOp::Renamed {
                    language: spec.tag.clone(),
                    from: target_from,
                    to: target_to,
                });
            } else {
                tracing::debug!(path = %target_from, language = %spec.tag, "nothing to rename");
            }
        }
    }

    /// Remove the page from its old place and re-insert it at the source
    /// location, matching groups by content rather than index.
    #[allow(clippy::too_many_arguments)]
    fn apply_move(
        &self,
        doc: &mut NavigationDoc,
        snapshot: &docsync_tree::LanguageSection,
        spec: &LanguageSpec,
        path: &str,
        location: &Location,
        dirs: &[String],
        report: &mut SyncReport,
    ) {
        let target_path = self.config.retarget_path(path, spec);
        let Some(section) = doc.section_mut(&spec.tag) else {
            return;
        };
        if !walker::remove_page(section, &target_path) {
            tracing::debug!(path = %target_path, language = %spec.tag, "move source absent");
        }
        match walker::insert_at(
            section,
            snapshot,
            location,
            PageNode::Page(target_path.clone()),
            dirs,
            |label| self.config.label_for(spec, label).to_owned(),
        ) {
            Ok(()) => report.applied.push(AppliedOp::Moved {
                language: spec.tag.clone(),
                path: target_path,
            }),
            Err(err) => report.warnings.push(SyncWarning::StructureMismatch {
                language: spec.tag.clone(),
                path: target_path,
                detail: err.to_string(),
            }),
        }
    }

    /// Insert the page at the source location unless the target already
    /// has it, which keeps repeated runs idempotent.
    #[allow(clippy::too_many_arguments)]
    fn apply_add(
        &self,
        doc: &mut NavigationDoc,
        snapshot: &docsync_tree::LanguageSection,
        spec: &LanguageSpec,
        path: &str,
        location: &Location,
        dirs: &[String],
        report: &mut SyncReport,
    ) {
        let target_path = self.config.retarget_path(path, spec);
        let Some(section) = doc.section_mut(&spec.tag) else {
            return;
        };
        if walker::page_locations(section).contains_key(&target_path) {
            tracing::debug!(path = %target_path, language = %spec.tag, "already present");
            return;
        }
        match walker::insert_at(
            section,
            snapshot,
            location,
            PageNode::Page(target_path.clone()),
            dirs,
            |label| self.config.label_for(spec, label).to_owned(),
        ) {
            Ok(()) => report.applied.push(AppliedOp::Added {
                language: spec.tag.clone(),
                path: target_path,
            }),
            Err(err) => report.warnings.push(SyncWarning::StructureMismatch {
                language: spec.tag.clone(),
                path: target_path,
                detail: err.to_string(),
            }),
        }
    }

    /// Remove the tree entry and the translated content file.
    fn apply_delete<S: ContentStore>(
        &self,
        doc: &mut NavigationDoc,
        spec: &LanguageSpec,
        store: &mut S,
        path: &str,
        report: &mut SyncReport,
    ) {
        let target_path = self.config.retarget_path(path, spec);
        let Some(section) = doc.section_mut(&spec.tag) else {
            return;
        };
        if walker::remove_page(section, &target_path) {
            report.applied.push(AppliedOp::Removed {
                language: spec.tag.clone(),
                path: target_path.clone(),
            });
        } else {
            report.warnings.push(SyncWarning::LocationNotFound {
                language: spec.tag.clone(),
                path: target_path.clone(),
            });
        }

        if store.exists(&target_path) {
            match store.remove(&target_path) {
                Ok(()) => report
                    .applied
                    .push(AppliedOp::FileRemoved { path: target_path }),
                Err(err) => report.warnings.push(SyncWarning::ContentFile {
                    path: target_path,
                    detail: err.to_string(),
                }),
            }
        } else {
            tracing::debug!(path = %target_path, "no content file to remove");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::MemStore;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"{
        "navigation": {
            "languages": [
                {
                    "language": "en",
                    "dropdowns": [{
                        "dropdown": "Documentation",
                        "icon": "book-open",
                        "pages": [
                            "en/intro",
                            {
                                "group": "Basics",
                                "pages": ["en/basics/setup", "en/basics/faq"]
                            },
                            {
                                "group": "Guides",
                                "pages": ["en/guides/deploy"]
                            }
                        ]
                    }]
                },
                {
                    "language": "zh-Hans",
                    "dropdowns": [{
                        "dropdown": "文档",
                        "icon": "book-open",
                        "pages": [
                            "zh-hans/intro",
                            {
                                "group": "基础",
                                "pages": ["zh-hans/basics/setup", "zh-hans/basics/faq"]
                            },
                            {
                                "group": "指南",
                                "pages": ["zh-hans/guides/deploy"]
                            }
                        ]
                    }]
                }
            ]
        }
    }"#;

    fn config() -> SyncConfig {
        let mut config = SyncConfig::default();
        config.targets = vec!["zh-hans".to_owned()];
        config
    }

    fn doc() -> NavigationDoc {
        NavigationDoc::parse(DOC).unwrap()
    }

    fn zh_paths(doc: &NavigationDoc) -> Vec<String> {
        walker::page_locations(doc.section("zh-Hans").unwrap())
            .into_keys()
            .collect()
    }

    #[test]
    fn test_delete_removes_from_matched_translated_group() {
        let config = config();
        let changes = ChangeSet {
            deleted: vec!["en/basics/faq".to_owned()],
            ..ChangeSet::default()
        };
        let mut store = MemStore::default();
        store.insert("zh-hans/basics/faq", "旧译文");

        let outcome = Reconciler::new(&config)
            .run(doc(), &changes, &mut store)
            .unwrap();

        assert!(outcome.report.warnings.is_empty());
        let paths = zh_paths(&outcome.doc);
        assert!(!paths.contains(&"zh-hans/basics/faq".to_owned()));
        assert!(paths.contains(&"zh-hans/basics/setup".to_owned()));
        assert!(!store.exists("zh-hans/basics/faq"));
        // The manually translated group label survives untouched.
        let zh = outcome.doc.section("zh-Hans").unwrap();
        let PageNode::Group(basics) = &zh.dropdowns[0].pages[1] else {
            panic!("expected group");
        };
        assert_eq!(basics.group, "基础");
        assert!(outcome
            .report
            .applied
            .contains(&AppliedOp::FileRemoved {
                path: "zh-hans/basics/faq".to_owned()
            }));
    }

    #[test]
    fn test_add_into_new_group_uses_translated_label() {
        let config = config();
        // Source gained a page under a brand-new group that the target
        // section has no counterpart for.
        let mut doc = doc();
        let en = doc.section_mut("en").unwrap();
        en.dropdowns[0].pages.push(PageNode::Group({
            let mut g = docsync_tree::Group::new("Getting Started");
            g.pages.push(PageNode::Page("en/start/install".to_owned()));
            g
        }));

        let changes = ChangeSet {
            added: vec!["en/start/install".to_owned()],
            ..ChangeSet::default()
        };
        let mut store = MemStore::default();
        let outcome = Reconciler::new(&config).run(doc, &changes, &mut store).unwrap();

        assert!(outcome.report.warnings.is_empty());
        let zh = outcome.doc.section("zh-Hans").unwrap();
        let PageNode::Group(created) = zh.dropdowns[0].pages.last().unwrap() else {
            panic!("expected created group");
        };
        // Default config carries the label table from zh-hans.
        assert_eq!(created.group, "快速开始");
        assert!(matches!(
            &created.pages[0],
            PageNode::Page(p) if p == "zh-hans/start/install"
        ));
    }

    #[test]
    fn test_add_is_idempotent() {
        let config = config();
        let changes = ChangeSet {
            added: vec!["en/basics/setup".to_owned()],
            ..ChangeSet::default()
        };
        let mut store = MemStore::default();

        let outcome = Reconciler::new(&config)
            .run(doc(), &changes, &mut store)
            .unwrap();

        // Already present in the target, so nothing happens.
        assert!(outcome.report.applied.is_empty());
        assert!(outcome.report.warnings.is_empty());
        assert_eq!(outcome.doc, doc());
    }

    #[test]
    fn test_rename_with_existing_translation_renames_file_and_entry() {
        let config = config();
        let changes = ChangeSet {
            renamed: vec![("en/basics/faq".to_owned(), "en/basics/questions".to_owned())],
            ..ChangeSet::default()
        };
        let mut store = MemStore::default();
        store.insert("zh-hans/basics/faq", "常见问题");

        let outcome = Reconciler::new(&config)
            .run(doc(), &changes, &mut store)
            .unwrap();

        assert!(outcome.report.warnings.is_empty());
        assert_eq!(store.content("zh-hans/basics/questions"), Some("常见问题"));
        let paths = zh_paths(&outcome.doc);
        assert!(paths.contains(&"zh-hans/basics/questions".to_owned()));
        assert!(!paths.contains(&"zh-hans/basics/faq".to_owned()));
    }

    #[test]
    fn test_rename_without_translation_queues_addition() {
        let config = config();
        // Source page exists in the tree under its new name.
        let mut source_doc = doc();
        let en = source_doc.section_mut("en").unwrap();
        assert!(walker::rename_page(en, "en/basics/faq", "en/basics/questions"));
        // The target tree never had the page and no translated file exists.
        let zh = source_doc.section_mut("zh-Hans").unwrap();
        assert!(walker::remove_page(zh, "zh-hans/basics/faq"));

        let changes = ChangeSet {
            renamed: vec![("en/basics/faq".to_owned(), "en/basics/questions".to_owned())],
            ..ChangeSet::default()
        };
        let mut store = MemStore::default();

        let outcome = Reconciler::new(&config)
            .run(source_doc, &changes, &mut store)
            .unwrap();

        assert!(outcome
            .report
            .applied
            .contains(&AppliedOp::QueuedAddition {
                path: "en/basics/questions".to_owned()
            }));
        // The queued page was inserted into the target tree at the
        // source position.
        let paths = zh_paths(&outcome.doc);
        assert!(paths.contains(&"zh-hans/basics/questions".to_owned()));
    }

    #[test]
    fn test_move_relocates_between_matched_groups() {
        let config = config();
        // Source: faq moved from Basics into Guides.
        let mut source_doc = doc();
        let en = source_doc.section_mut("en").unwrap();
        assert!(walker::remove_page(en, "en/basics/faq"));
        let PageNode::Group(guides) = &mut en.dropdowns[0].pages[2] else {
            panic!("expected group");
        };
        guides.pages.push(PageNode::Page("en/basics/faq".to_owned()));

        let changes = ChangeSet {
            moved: vec!["en/basics/faq".to_owned()],
            ..ChangeSet::default()
        };
        let mut store = MemStore::default();

        let outcome = Reconciler::new(&config)
            .run(source_doc, &changes, &mut store)
            .unwrap();

        assert!(outcome.report.warnings.is_empty());
        let zh = outcome.doc.section("zh-Hans").unwrap();
        let PageNode::Group(guides) = &zh.dropdowns[0].pages[2] else {
            panic!("expected group");
        };
        assert_eq!(guides.group, "指南");
        assert!(matches!(
            guides.pages.last(),
            Some(PageNode::Page(p)) if p == "zh-hans/basics/faq"
        ));
        // The old group kept its remaining sibling.
        let PageNode::Group(basics) = &zh.dropdowns[0].pages[1] else {
            panic!("expected group");
        };
        assert_eq!(basics.pages.len(), 1);
    }

    #[test]
    fn test_add_lands_at_source_position_in_matching_group() {
        let config = config();
        let mut source_doc = doc();
        let en = source_doc.section_mut("en").unwrap();
        let PageNode::Group(basics) = &mut en.dropdowns[0].pages[1] else {
            panic!("expected group");
        };
        basics
            .pages
            .insert(1, PageNode::Page("en/basics/new".to_owned()));

        let changes = ChangeSet {
            added: vec!["en/basics/new".to_owned()],
            ..ChangeSet::default()
        };
        let mut store = MemStore::default();

        let outcome = Reconciler::new(&config)
            .run(source_doc, &changes, &mut store)
            .unwrap();

        assert!(outcome.report.warnings.is_empty());
        let locations = walker::page_locations(outcome.doc.section("zh-Hans").unwrap());
        assert_eq!(locations["zh-hans/basics/new"], Location {
            dropdown: 0,
            groups: vec![1],
            index: 1,
        });
    }

    #[test]
    fn test_move_to_new_group_creates_it_with_translated_label() {
        let config = config();
        // Source: faq moved out of Basics into a brand-new FAQ group.
        let mut source_doc = doc();
        let en = source_doc.section_mut("en").unwrap();
        assert!(walker::remove_page(en, "en/basics/faq"));
        en.dropdowns[0].pages.push(PageNode::Group({
            let mut g = docsync_tree::Group::new("FAQ");
            g.pages.push(PageNode::Page("en/basics/faq".to_owned()));
            g
        }));

        let changes = ChangeSet {
            moved: vec!["en/basics/faq".to_owned()],
            ..ChangeSet::default()
        };
        let mut store = MemStore::default();

        let outcome = Reconciler::new(&config)
            .run(source_doc, &changes, &mut store)
            .unwrap();

        assert!(outcome.report.warnings.is_empty());
        let zh = outcome.doc.section("zh-Hans").unwrap();
        let PageNode::Group(created) = zh.dropdowns[0].pages.last().unwrap() else {
            panic!("expected created group");
        };
        assert_eq!(created.group, "常见问题");
        assert!(matches!(
            created.pages.as_slice(),
            [PageNode::Page(p)] if p == "zh-hans/basics/faq"
        ));
        // The prior group keeps its surviving sibling and its label.
        let PageNode::Group(basics) = &zh.dropdowns[0].pages[1] else {
            panic!("expected group");
        };
        assert_eq!(basics.group, "基础");
        assert!(matches!(
            basics.pages.as_slice(),
            [PageNode::Page(p)] if p == "zh-hans/basics/setup"
        ));
    }

    #[test]
    fn test_delete_missing_page_warns_and_continues() {
        let config = config();
        let changes = ChangeSet {
            deleted: vec!["en/ghost".to_owned(), "en/basics/faq".to_owned()],
            ..ChangeSet::default()
        };
        let mut store = MemStore::default();

        let outcome = Reconciler::new(&config)
            .run(doc(), &changes, &mut store)
            .unwrap();

        // The missing page warned; the real one was still removed.
        assert!(matches!(
            outcome.report.warnings.as_slice(),
            [SyncWarning::LocationNotFound { path, .. }] if path == "zh-hans/ghost"
        ));
        assert!(!zh_paths(&outcome.doc).contains(&"zh-hans/basics/faq".to_owned()));
    }

    #[test]
    fn test_missing_target_section_is_a_warning() {
        let mut config = config();
        config.targets.push("ja-jp".to_owned());
        let changes = ChangeSet {
            deleted: vec!["en/basics/faq".to_owned()],
            ..ChangeSet::default()
        };
        let mut store = MemStore::default();

        let outcome = Reconciler::new(&config)
            .run(doc(), &changes, &mut store)
            .unwrap();

        assert!(outcome
            .report
            .warnings
            .contains(&SyncWarning::MissingSection {
                language: "jp".to_owned()
            }));
        // The present target was still synchronized.
        assert!(!zh_paths(&outcome.doc).contains(&"zh-hans/basics/faq".to_owned()));
    }

    #[test]
    fn test_missing_source_section_is_fatal() {
        let config = config();
        let doc = NavigationDoc::parse(
            r#"{"navigation": {"languages": [{"language": "zh-Hans", "dropdowns": []}]}}"#,
        )
        .unwrap();
        let mut store = MemStore::default();

        let err = Reconciler::new(&config)
            .run(doc, &ChangeSet::default(), &mut store)
            .unwrap_err();
        assert!(matches!(err, SyncError::MissingSection(tag) if tag == "en"));
    }
}
