//! Thinking aggregation: merging incremental sub-task updates into a stable
//! collection the UI can render without regressions.

pub mod merge;
pub mod model;

pub use merge::merge_entries;
pub use model::ThinkEntry;
