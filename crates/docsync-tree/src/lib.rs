//! Navigation tree model and traversal for the docsync engine.
//!
//! The navigation configuration (`docs.json`) holds one section per
//! language, each a list of dropdowns containing pages and arbitrarily
//! nested groups. This crate provides:
//!
//! - the typed tree model with unknown-key passthrough ([`model`])
//! - index-chain locations and recursive traversal ([`walker`])
//! - content-based group matching across languages ([`matcher`])
//! - format-preserving JSON serialization ([`format`])
//!
//! Mutation helpers operate on a single in-memory tree value; callers
//! thread the tree through each step and persist it once at the end.

mod error;
pub mod format;
mod location;
pub mod matcher;
pub mod model;
pub mod walker;

pub use error::TreeError;
pub use format::JsonStyle;
pub use location::Location;
pub use model::{Dropdown, Group, LanguageSection, NavigationDoc, OpenApiRef, PageNode};
pub use walker::WalkError;
