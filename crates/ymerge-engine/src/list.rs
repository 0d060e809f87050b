//! List merge strategies

use crate::change::{ChangeLog, ChangePath};
use crate::context::{ListStrategy, MergeContext};
use crate::engine::MergePass;
use crate::identify::find_by_identifier;
use crate::tree::ConfigTree;
use crate::version::BaselineVersionSet;

/// Combine two sequences under `context.list_strategy`.
///
/// Matched items in intelligent mode are merged with no version baseline;
/// inside a full merge the baseline of that merge is used instead.
pub fn merge_lists(
    source: &[ConfigTree],
    target: &[ConfigTree],
    context: &MergeContext,
) -> Vec<ConfigTree> {
    let baseline = BaselineVersionSet::new();
    MergePass::new(context, &baseline).merge_lists(source, target)
}

impl MergePass<'_> {
    pub(crate) fn merge_lists(&self, source: &[ConfigTree], target: &[ConfigTree]) -> Vec<ConfigTree> {
        match self.context.list_strategy {
            ListStrategy::Replace => source.to_vec(),
            ListStrategy::Append => {
                let mut merged = Vec::with_capacity(target.len() + source.len());
                merged.extend_from_slice(target);
                merged.extend_from_slice(source);
                merged
            }
            ListStrategy::Intelligent => self.merge_intelligent(source, target),
        }
    }

    fn merge_intelligent(&self, source: &[ConfigTree], target: &[ConfigTree]) -> Vec<ConfigTree> {
        if source.is_empty() {
            return target.to_vec();
        }
        if target.is_empty() {
            return source.to_vec();
        }

        let mut merged = target.to_vec();
        for item in source {
            match item {
                ConfigTree::Mapping(src) => {
                    match find_by_identifier(&self.context.identifier_key_priority, src, &merged) {
                        Some(index) => {
                            if let ConfigTree::Mapping(dst) = &mut merged[index] {
                                // item-level records are folded into the list's Modified record
                                let mut scratch = ChangeLog::new();
                                self.merge_mapping(src, dst, &ChangePath::root(), &mut scratch);
                            }
                        }
                        None => merged.push(item.clone()),
                    }
                }
                other => {
                    if !merged.contains(other) {
                        merged.push(other.clone());
                    }
                }
            }
        }
        merged
    }
}
