//! Deep merge engine
//!
//! Walks the source tree and folds it into a private copy of the target:
//! - keys only in the source are added
//! - mappings on both sides are merged key by key
//! - sequences on both sides go through the configured list strategy
//! - anything else that differs is replaced wholesale
//!
//! Keys in the skip list, and source values that mention a version
//! already pinned in the target, are left untouched and unrecorded.

use tracing::{debug, trace};

use crate::change::{ChangeLog, ChangePath};
use crate::context::{DeletionStrategy, MergeContext};
use crate::tree::{ConfigTree, Mapping};
use crate::version::{BaselineVersionSet, VersionDetector};

/// Merged tree plus the record of how it was produced
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub merged: ConfigTree,
    pub changes: ChangeLog,
    pub baseline: BaselineVersionSet,
}

/// Merge `source` into `target` under `context`.
///
/// Neither input is modified. Null documents count as empty mappings.
pub fn merge(source: &ConfigTree, target: &ConfigTree, context: &MergeContext) -> MergeOutcome {
    let source = source.clone().or_empty();
    let mut working = target.clone().or_empty();

    let baseline = VersionDetector::new(&context.fields_always_skipped).extract(&working);
    debug!(
        versions = baseline.len(),
        list_strategy = %context.list_strategy,
        deletion_strategy = %context.deletion_strategy,
        "starting merge"
    );

    let pass = MergePass::new(context, &baseline);
    let mut changes = ChangeLog::new();
    let root = ChangePath::root();

    if let (ConfigTree::Mapping(src), ConfigTree::Mapping(dst)) = (&source, &mut working) {
        pass.merge_mapping(src, dst, &root, &mut changes);
        if context.deletion_strategy == DeletionStrategy::Remove {
            pass.remove_absent(src, dst, &root, &mut changes);
        }
    } else {
        pass.merge_value(&source, &mut working, root, &mut changes);
    }

    debug!(records = changes.len(), "merge complete");
    MergeOutcome {
        merged: working,
        changes,
        baseline,
    }
}

/// Holds a context for repeated merges
#[derive(Debug, Clone, Default)]
pub struct DeepMerger {
    context: MergeContext,
}

impl DeepMerger {
    pub fn new(context: MergeContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &MergeContext {
        &self.context
    }

    /// Each call starts a fresh change log
    pub fn merge(&self, source: &ConfigTree, target: &ConfigTree) -> MergeOutcome {
        merge(source, target, &self.context)
    }
}

/// State shared by every step of one merge call
pub(crate) struct MergePass<'a> {
    pub(crate) context: &'a MergeContext,
    pub(crate) baseline: &'a BaselineVersionSet,
}

impl<'a> MergePass<'a> {
    pub(crate) fn new(context: &'a MergeContext, baseline: &'a BaselineVersionSet) -> Self {
        Self { context, baseline }
    }

    fn is_guarded(&self, key: &str, value: &ConfigTree) -> bool {
        if self.context.is_skipped(key) {
            trace!(key, "skip-listed field left as is");
            return true;
        }
        if self.baseline.guards(value) {
            debug!(key, "value mentions a pinned version; left as is");
            return true;
        }
        false
    }

    pub(crate) fn merge_mapping(
        &self,
        source: &Mapping,
        target: &mut Mapping,
        path: &ChangePath,
        changes: &mut ChangeLog,
    ) {
        for (key, source_value) in source.iter() {
            if self.is_guarded(key, source_value) {
                continue;
            }
            let child = path.key(key);
            match target.get_mut(key) {
                Some(target_value) => self.merge_value(source_value, target_value, child, changes),
                None => {
                    target.insert(key.clone(), source_value.clone());
                    changes.added(child, source_value.clone());
                }
            }
        }
    }

    /// Merge one value into an existing slot
    pub(crate) fn merge_value(
        &self,
        source: &ConfigTree,
        target: &mut ConfigTree,
        path: ChangePath,
        changes: &mut ChangeLog,
    ) {
        if let (ConfigTree::Mapping(src), ConfigTree::Mapping(dst)) = (source, &mut *target) {
            self.merge_mapping(src, dst, &path, changes);
            return;
        }
        if let (ConfigTree::Sequence(src), ConfigTree::Sequence(dst)) = (source, &mut *target) {
            let merged = self.merge_lists(src, dst);
            if merged != *dst {
                let old = std::mem::replace(dst, merged);
                changes.modified(
                    path,
                    ConfigTree::Sequence(old),
                    ConfigTree::Sequence(dst.clone()),
                );
            }
            return;
        }
        if source != &*target {
            let old = std::mem::replace(target, source.clone());
            changes.modified(path, old, source.clone());
        } else {
            changes.unchanged(path, target.clone());
        }
    }

    /// Delete target keys the source does not have, at every mapping level
    fn remove_absent(
        &self,
        source: &Mapping,
        target: &mut Mapping,
        path: &ChangePath,
        changes: &mut ChangeLog,
    ) {
        let mut absent = Vec::new();
        for (key, target_value) in target.iter_mut() {
            match source.get(key) {
                None => {
                    changes.removed(path.key(key), target_value.clone());
                    absent.push(key.clone());
                }
                Some(source_value) => {
                    if self.is_guarded(key, source_value) {
                        continue;
                    }
                    if let (ConfigTree::Mapping(src), ConfigTree::Mapping(dst)) =
                        (source_value, target_value)
                    {
                        self.remove_absent(src, dst, &path.key(key), changes);
                    }
                }
            }
        }
        if !absent.is_empty() {
            debug!(path = %path, count = absent.len(), "removing keys absent from source");
            target.retain(|key, _| !absent.iter().any(|a| a == key));
        }
    }
}
