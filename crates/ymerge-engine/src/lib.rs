//! Tree merge and change-tracking engine.
//!
//! Merges a source configuration tree into a target tree under a
//! [`MergeContext`], producing the merged tree and an ordered [`ChangeLog`]
//! of every structural decision. The engine performs no I/O and cannot fail
//! on well-formed trees.

mod change;
mod context;
mod engine;
mod identify;
mod list;
mod tree;
mod version;

pub use change::{ChangeKind, ChangeLog, ChangePath, ChangeRecord, PathSegment};
pub use context::{
    DeletionStrategy, ListStrategy, MergeContext, StrategyError, DEFAULT_IDENTIFIER_KEYS,
};
pub use engine::{merge, DeepMerger, MergeOutcome};
pub use identify::find_by_identifier;
pub use list::merge_lists;
pub use tree::{ConfigTree, Mapping, Scalar};
pub use version::{extract_versions, versions_in_context, BaselineVersionSet, VersionDetector};
