//! Typed model of the navigation configuration file.
//!
//! The on-disk document is a JSON object with a `navigation` root holding
//! either a flat `languages` array or a `versions` array whose entries each
//! hold a `languages` array. Both layouts are tolerated; keys the model does
//! not know about are captured in flattened maps so a parse/serialize cycle
//! does not drop them.
//!
//! Page entries come in three shapes and are modeled as an explicit sum
//! type rather than by probing for optional keys:
//!
//! - a bare string: a content page path, stored without file extension
//! - `{ "group": …, "openapi": … }`: an OpenAPI specification reference
//! - `{ "group": …, "pages": […] }`: a named group, nesting arbitrarily

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::TreeError;

/// Root of the navigation configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationDoc {
    /// The navigation tree.
    pub navigation: Navigation,
    /// Keys outside `navigation`, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `navigation` object, in either the flat or the versioned layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Navigation {
    /// Flat layout: language sections directly under `navigation`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<LanguageSection>>,
    /// Versioned layout: language sections nested per version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<Version>>,
    /// Unknown keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the `versions` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    /// Language sections of this version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<LanguageSection>>,
    /// Unknown keys (version label and the like), preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Navigation for one language, identified by its language tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageSection {
    /// Language tag as it appears in the document (e.g. `en`, `zh-Hans`).
    pub language: String,
    /// Ordered top-level navigation entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropdowns: Vec<Dropdown>,
    /// Unknown keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named top-level navigation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dropdown {
    /// Display name, language-specific.
    pub dropdown: String,
    /// Icon identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Ordered child entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<PageNode>,
    /// Unknown keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry in a `pages` array.
///
/// The untagged variants are tried in declaration order; [`OpenApiRef`]
/// must come before [`Group`] because a group's `pages` key has a default
/// and would otherwise swallow OpenAPI references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageNode {
    /// A content page, referenced by extension-free path.
    Page(String),
    /// An OpenAPI specification reference.
    OpenApi(OpenApiRef),
    /// A named group of further entries.
    Group(Group),
}

/// An OpenAPI specification reference leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiRef {
    /// Display label of the reference.
    pub group: String,
    /// Specification location; the renderer also accepts object forms,
    /// so this is kept as raw JSON.
    pub openapi: Value,
    /// Unknown keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named, nestable container of pages and sub-groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Display label, language-specific and independently translatable.
    pub group: String,
    /// Icon identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Ordered child entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<PageNode>,
    /// Unknown keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NavigationDoc {
    /// Parse a navigation document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Json`] for malformed JSON and
    /// [`TreeError::MissingLanguages`] when the `navigation` object has
    /// neither a `languages` nor a `versions` array.
    pub fn parse(text: &str) -> Result<Self, TreeError> {
        let doc: Self = serde_json::from_str(text)?;
        if doc.navigation.languages.is_none() && doc.navigation.versions.is_none() {
            return Err(TreeError::MissingLanguages);
        }
        Ok(doc)
    }

    /// All language sections, across both layouts, in document order.
    pub fn sections(&self) -> impl Iterator<Item = &LanguageSection> {
        self.navigation.languages.iter().flatten().chain(
            self.navigation
                .versions
                .iter()
                .flatten()
                .flat_map(|v| v.languages.iter().flatten()),
        )
    }

    /// Mutable view over all language sections.
    pub fn sections_mut(&mut self) -> impl Iterator<Item = &mut LanguageSection> {
        self.navigation.languages.iter_mut().flatten().chain(
            self.navigation
                .versions
                .iter_mut()
                .flatten()
                .flat_map(|v| v.languages.iter_mut().flatten()),
        )
    }

    /// Find the first section with the given language tag.
    #[must_use]
    pub fn section(&self, tag: &str) -> Option<&LanguageSection> {
        self.sections().find(|s| s.language == tag)
    }

    /// Find the first section with the given language tag, mutably.
    pub fn section_mut(&mut self, tag: &str) -> Option<&mut LanguageSection> {
        self.sections_mut().find(|s| s.language == tag)
    }
}

impl Group {
    /// Create an empty group with the given label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            group: label.into(),
            icon: None,
            pages: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// Strip a trailing `.md`/`.mdx` extension, yielding the canonical leaf
/// identity used throughout the tree.
#[must_use]
pub fn strip_extension(path: &str) -> &str {
    path.strip_suffix(".mdx")
        .or_else(|| path.strip_suffix(".md"))
        .unwrap_or(path)
}

/// Strip a leading language directory (`en/…` → `…`) if present.
#[must_use]
pub fn strip_language_dir<'a>(path: &'a str, dirs: &[String]) -> &'a str {
    for dir in dirs {
        if let Some(rest) = path.strip_prefix(dir.as_str())
            && let Some(rest) = rest.strip_prefix('/')
        {
            return rest;
        }
    }
    path
}

/// Normalize a leaf path for cross-language comparison: extension and
/// language prefix stripped.
#[must_use]
pub fn normalize_path<'a>(path: &'a str, dirs: &[String]) -> &'a str {
    strip_language_dir(strip_extension(path), dirs)
}
