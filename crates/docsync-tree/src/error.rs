//! Error types for navigation tree parsing.

/// Error while parsing or serializing the navigation configuration.
///
/// These are fatal for a reconciliation run; recoverable per-file
/// conditions are reported as warnings by the engine instead.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The document is not valid JSON or does not fit the tree shape.
    #[error("navigation JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The `navigation` object carries neither `languages` nor `versions`.
    #[error("navigation contains no language sections")]
    MissingLanguages,
}
