//! Configuration management for docsync.
//!
//! Parses `docsync.toml` with serde and provides auto-discovery of the
//! config file in parent directories. The configuration names the
//! navigation file, the source language, the target languages, and for
//! each language its `docs.json` tag, its directory prefix, and a table
//! of label translations used as fallback when new groups or dropdowns
//! are created in a target section.
//!
//! ```toml
//! docs_json = "docs.json"
//! source = "en"
//! targets = ["zh-hans", "ja-jp"]
//!
//! [languages.en]
//! tag = "en"
//! directory = "en"
//!
//! [languages.zh-hans]
//! tag = "zh-Hans"
//! directory = "zh-hans"
//!
//! [languages.zh-hans.labels]
//! "Getting Started" = "快速开始"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "docsync.toml";

/// Configuration load/validation error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML.
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A referenced language has no `[languages.<key>]` entry.
    #[error("language `{key}` ({role}) has no [languages] entry")]
    UnknownLanguage {
        /// Language key missing from the table.
        key: String,
        /// Whether it was referenced as source or target.
        role: &'static str,
    },
}

/// One language's settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LanguageSpec {
    /// Language tag as written in the navigation file (e.g. `zh-Hans`).
    pub tag: String,
    /// Leading path directory of this language's content (e.g. `zh-hans`).
    pub directory: String,
    /// Group/dropdown label translations, source label to local label.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// Synchronization configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncConfig {
    /// Navigation file path, relative to the repository root.
    pub docs_json: PathBuf,
    /// Source language key.
    pub source: String,
    /// Target language keys, in sync order.
    pub targets: Vec<String>,
    /// Per-language settings, keyed by language key.
    pub languages: BTreeMap<String, LanguageSpec>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let mut languages = BTreeMap::new();
        languages.insert("en".to_owned(), LanguageSpec {
            tag: "en".to_owned(),
            directory: "en".to_owned(),
            labels: BTreeMap::new(),
        });
        languages.insert("zh-hans".to_owned(), LanguageSpec {
            tag: "zh-Hans".to_owned(),
            directory: "zh-hans".to_owned(),
            labels: BTreeMap::from([
                ("Documentation".to_owned(), "文档".to_owned()),
                ("Getting Started".to_owned(), "快速开始".to_owned()),
                ("FAQ".to_owned(), "常见问题".to_owned()),
            ]),
        });
        languages.insert("ja-jp".to_owned(), LanguageSpec {
            tag: "jp".to_owned(),
            directory: "ja-jp".to_owned(),
            labels: BTreeMap::from([
                ("Documentation".to_owned(), "ドキュメント".to_owned()),
                ("Getting Started".to_owned(), "はじめに".to_owned()),
                ("FAQ".to_owned(), "よくある質問".to_owned()),
            ]),
        });

        Self {
            docs_json: PathBuf::from("docs.json"),
            source: "en".to_owned(),
            targets: vec!["zh-hans".to_owned(), "ja-jp".to_owned()],
            languages,
        }
    }
}

impl SyncConfig {
    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// I/O and TOML errors, plus validation failures per [`Self::validate`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Discover `docsync.toml` walking up from `start`, or fall back to
    /// the built-in defaults when none exists.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::load`] errors for a file that exists but does
    /// not parse or validate.
    pub fn discover(start: &Path) -> Result<Self, ConfigError> {
        let mut dir = Some(start);
        while let Some(current) = dir {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Self::load(&candidate);
            }
            dir = current.parent();
        }
        tracing::debug!(start = %start.display(), "no config file found, using defaults");
        Ok(Self::default())
    }

    /// Check that the source and every target have a language entry.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownLanguage`] naming the first missing key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.languages.contains_key(&self.source) {
            return Err(ConfigError::UnknownLanguage {
                key: self.source.clone(),
                role: "source",
            });
        }
        for target in &self.targets {
            if !self.languages.contains_key(target) {
                return Err(ConfigError::UnknownLanguage {
                    key: target.clone(),
                    role: "target",
                });
            }
        }
        Ok(())
    }

    /// Settings for a language key.
    #[must_use]
    pub fn language(&self, key: &str) -> Option<&LanguageSpec> {
        self.languages.get(key)
    }

    /// Settings of the source language.
    ///
    /// Present for any validated configuration.
    #[must_use]
    pub fn source_spec(&self) -> Option<&LanguageSpec> {
        self.languages.get(&self.source)
    }

    /// Directory prefixes of all configured languages, used for path
    /// normalization.
    #[must_use]
    pub fn language_dirs(&self) -> Vec<String> {
        self.languages.values().map(|l| l.directory.clone()).collect()
    }

    /// Whether `path` is a source-language content file eligible for sync.
    ///
    /// Only plain repository-relative paths qualify; absolute paths and
    /// paths with `..` components are rejected.
    #[must_use]
    pub fn is_source_doc(&self, path: &str) -> bool {
        let Some(source) = self.source_spec() else {
            return false;
        };
        let plain = Path::new(path)
            .components()
            .all(|c| matches!(c, std::path::Component::Normal(_)));
        plain
            && path
                .strip_prefix(&source.directory)
                .is_some_and(|rest| rest.starts_with('/'))
            && (path.ends_with(".md") || path.ends_with(".mdx"))
    }

    /// Swap the leading source directory for the target language's.
    #[must_use]
    pub fn retarget_path(&self, path: &str, target: &LanguageSpec) -> String {
        let Some(source) = self.source_spec() else {
            return path.to_owned();
        };
        match path.strip_prefix(&source.directory) {
            Some(rest) if rest.starts_with('/') => format!("{}{rest}", target.directory),
            _ => path.to_owned(),
        }
    }

    /// Translate a group/dropdown label for a target language, falling
    /// back to the source label verbatim.
    #[must_use]
    pub fn label_for<'a>(&self, target: &'a LanguageSpec, label: &'a str) -> &'a str {
        target.labels.get(label).map_or(label, String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
docs_json = "docs.json"
source = "en"
targets = ["zh-hans"]

[languages.en]
tag = "en"
directory = "en"

[languages.zh-hans]
tag = "zh-Hans"
directory = "zh-hans"

[languages.zh-hans.labels]
"Getting Started" = "快速开始"
"#;

    #[test]
    fn test_parse_sample() {
        let config: SyncConfig = toml::from_str(SAMPLE).unwrap();
        config.validate().unwrap();
        assert_eq!(config.source, "en");
        assert_eq!(config.targets, vec!["zh-hans".to_owned()]);
        let zh = config.language("zh-hans").unwrap();
        assert_eq!(zh.tag, "zh-Hans");
        assert_eq!(zh.labels["Getting Started"], "快速开始");
    }

    #[test]
    fn test_validate_rejects_unknown_target() {
        let mut config: SyncConfig = toml::from_str(SAMPLE).unwrap();
        config.targets.push("ko".to_owned());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLanguage { key, role: "target" } if key == "ko"));
    }

    #[test]
    fn test_default_config_validates() {
        SyncConfig::default().validate().unwrap();
    }

    #[test]
    fn test_is_source_doc() {
        let config = SyncConfig::default();
        assert!(config.is_source_doc("en/guides/intro.mdx"));
        assert!(config.is_source_doc("en/faq.md"));
        assert!(!config.is_source_doc("en/openapi.json"));
        assert!(!config.is_source_doc("zh-hans/guides/intro.mdx"));
        assert!(!config.is_source_doc("enx/guides/intro.mdx"));
    }

    #[test]
    fn test_is_source_doc_rejects_escaping_paths() {
        let config = SyncConfig::default();
        assert!(!config.is_source_doc("en/../../etc/passwd.md"));
        assert!(!config.is_source_doc("en/../zh-hans/intro.mdx"));
        assert!(!config.is_source_doc("/en/intro.mdx"));
    }

    #[test]
    fn test_retarget_path() {
        let config = SyncConfig::default();
        let ja = config.language("ja-jp").unwrap();
        assert_eq!(config.retarget_path("en/guides/intro", ja), "ja-jp/guides/intro");
        assert_eq!(config.retarget_path("docs.json", ja), "docs.json");
    }

    #[test]
    fn test_label_fallback() {
        let config = SyncConfig::default();
        let zh = config.language("zh-hans").unwrap();
        assert_eq!(config.label_for(zh, "FAQ"), "常见问题");
        assert_eq!(config.label_for(zh, "Never Translated"), "Never Translated");
    }

    #[test]
    fn test_discover_walks_upward() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), SAMPLE).unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = SyncConfig::discover(&nested).unwrap();
        assert_eq!(config.targets, vec!["zh-hans".to_owned()]);
    }

    #[test]
    fn test_discover_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SyncConfig::discover(dir.path()).unwrap();
        assert_eq!(config, SyncConfig::default());
    }
}
