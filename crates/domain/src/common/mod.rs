//! Common utility functions over JSON documents.
//!
//! # Design Principles
//!
//! - **Pure functions only** - no side effects, no I/O
//! - **Never fail on write** - malformed paths are repaired, not rejected

pub mod merge;
pub mod path;

// Re-export commonly used functions at crate root for convenience
pub use merge::{deep_merge, reconcile_edits};
pub use path::{get_nested_value, set_nested_value};
