//! Merge context: the strategy choices and field lists for one merge

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier keys tried, in order, when matching sequence items
pub const DEFAULT_IDENTIFIER_KEYS: &[&str] = &["id", "name", "key", "uuid", "identifier"];

/// How two sequences present on both sides are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStrategy {
    /// Source list wins entirely
    #[default]
    Replace,
    /// Target items followed by source items
    Append,
    /// Match mapping items by identifier key, set semantics for scalars
    Intelligent,
}

impl ListStrategy {
    pub const VALID: &'static [&'static str] = &["replace", "append", "intelligent"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListStrategy::Replace => "replace",
            ListStrategy::Append => "append",
            ListStrategy::Intelligent => "intelligent",
        }
    }
}

impl FromStr for ListStrategy {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replace" => Ok(ListStrategy::Replace),
            "append" => Ok(ListStrategy::Append),
            "intelligent" => Ok(ListStrategy::Intelligent),
            other => Err(StrategyError::new("list_merge_strategy", other, Self::VALID)),
        }
    }
}

impl fmt::Display for ListStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to target keys that the source no longer has
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionStrategy {
    /// Keep them
    #[default]
    Ignore,
    /// Delete them and record `Removed`
    Remove,
}

impl DeletionStrategy {
    pub const VALID: &'static [&'static str] = &["ignore", "remove"];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeletionStrategy::Ignore => "ignore",
            DeletionStrategy::Remove => "remove",
        }
    }
}

impl FromStr for DeletionStrategy {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ignore" => Ok(DeletionStrategy::Ignore),
            "remove" => Ok(DeletionStrategy::Remove),
            other => Err(StrategyError::new("handle_deletions", other, Self::VALID)),
        }
    }
}

impl fmt::Display for DeletionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An enumerated setting received a value outside its valid set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {setting}: {value}. Valid options: {}", .valid.join(", "))]
pub struct StrategyError {
    pub setting: &'static str,
    pub value: String,
    pub valid: &'static [&'static str],
}

impl StrategyError {
    pub fn new(setting: &'static str, value: &str, valid: &'static [&'static str]) -> Self {
        Self {
            setting,
            value: value.to_string(),
            valid,
        }
    }
}

/// Read-only configuration consulted by the engine for one merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeContext {
    pub list_strategy: ListStrategy,
    pub deletion_strategy: DeletionStrategy,

    /// Keys never overwritten regardless of content
    pub fields_always_skipped: BTreeSet<String>,

    /// Keys used to pair up sequence items, highest priority first
    pub identifier_key_priority: Vec<String>,
}

impl Default for MergeContext {
    fn default() -> Self {
        Self {
            list_strategy: ListStrategy::default(),
            deletion_strategy: DeletionStrategy::default(),
            fields_always_skipped: BTreeSet::new(),
            identifier_key_priority: DEFAULT_IDENTIFIER_KEYS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

impl MergeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list_strategy(mut self, strategy: ListStrategy) -> Self {
        self.list_strategy = strategy;
        self
    }

    pub fn with_deletion_strategy(mut self, strategy: DeletionStrategy) -> Self {
        self.deletion_strategy = strategy;
        self
    }

    pub fn with_skipped_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields_always_skipped = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_identifier_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifier_key_priority = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_skipped(&self, key: &str) -> bool {
        self.fields_always_skipped.contains(key)
    }
}
