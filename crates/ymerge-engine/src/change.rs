//! Change log recorded during a merge pass

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::tree::ConfigTree;

/// One step of a change path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a change inside the tree. The root path is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangePath(Vec<PathSegment>);

impl ChangePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// A new path one key deeper
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self(segments)
    }

    /// A new path one sequence index deeper
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for ChangePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                PathSegment::Key(key) => f.write_str(key)?,
                PathSegment::Index(index) => write!(f, "{}", index)?,
            }
        }
        Ok(())
    }
}

impl Serialize for ChangePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What happened at a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
    Unchanged,
}

impl ChangeKind {
    /// All kinds in report order
    pub const ALL: [ChangeKind; 4] = [
        ChangeKind::Added,
        ChangeKind::Modified,
        ChangeKind::Removed,
        ChangeKind::Unchanged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "Added",
            ChangeKind::Modified => "Modified",
            ChangeKind::Removed => "Removed",
            ChangeKind::Unchanged => "Unchanged",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single structural decision
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRecord {
    #[serde(rename = "type")]
    pub kind: ChangeKind,

    pub path: ChangePath,

    /// Value before the merge; absent for `Added`
    pub old_value: Option<ConfigTree>,

    /// Value after the merge; absent for `Removed`
    pub new_value: Option<ConfigTree>,
}

/// Ordered, append-only account of one merge pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeLog {
    records: Vec<ChangeRecord>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn added(&mut self, path: ChangePath, new_value: ConfigTree) {
        self.push(ChangeKind::Added, path, None, Some(new_value));
    }

    pub fn modified(&mut self, path: ChangePath, old_value: ConfigTree, new_value: ConfigTree) {
        self.push(ChangeKind::Modified, path, Some(old_value), Some(new_value));
    }

    pub fn removed(&mut self, path: ChangePath, old_value: ConfigTree) {
        self.push(ChangeKind::Removed, path, Some(old_value), None);
    }

    pub fn unchanged(&mut self, path: ChangePath, value: ConfigTree) {
        self.push(ChangeKind::Unchanged, path, Some(value.clone()), Some(value));
    }

    fn push(
        &mut self,
        kind: ChangeKind,
        path: ChangePath,
        old_value: Option<ConfigTree>,
        new_value: Option<ConfigTree>,
    ) {
        self.records.push(ChangeRecord {
            kind,
            path,
            old_value,
            new_value,
        });
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records of one kind
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }

    /// First record at the given dot-joined path
    pub fn find(&self, path: &str) -> Option<&ChangeRecord> {
        self.records.iter().find(|r| r.path.to_string() == path)
    }

    /// True when something other than `Unchanged` was recorded
    pub fn has_changes(&self) -> bool {
        self.records.iter().any(|r| r.kind != ChangeKind::Unchanged)
    }

    pub fn into_records(self) -> Vec<ChangeRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a ChangeLog {
    type Item = &'a ChangeRecord;
    type IntoIter = std::slice::Iter<'a, ChangeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
