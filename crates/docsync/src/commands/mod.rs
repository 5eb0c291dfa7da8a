//! CLI command implementations.

pub mod apply;
mod common;
pub mod sync;

pub use apply::ApplyArgs;
pub use sync::SyncArgs;
