//! Version string detection
//!
//! Finds strings in a tree that look like pinned versions so the merge
//! can leave them alone. Two sources feed the set:
//! - `x.y.z` / `vx.y.z` substrings that sit in a version-like context
//!   (after `": "`, or later on a line that mentions "version" or "image")
//! - whole string values of keys in the skip list, taken verbatim
//!
//! A scalar under a mapping key is scanned as the line `"<key>: <value>"`,
//! which is how it reads in the source document.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex_lite::Regex;

use crate::tree::{ConfigTree, Scalar};

const BARE_PATTERN: &str = r"\d+\.\d+\.\d+";
const PREFIXED_PATTERN: &str = r"v\d+\.\d+\.\d+";

fn version_regexes() -> &'static [Regex; 2] {
    static RES: OnceLock<[Regex; 2]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            Regex::new(BARE_PATTERN).expect("bare version pattern compiles"),
            Regex::new(PREFIXED_PATTERN).expect("prefixed version pattern compiles"),
        ]
    })
}

/// Version-like strings found in the target before merging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaselineVersionSet {
    versions: BTreeSet<String>,
}

impl BaselineVersionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, version: impl Into<String>) {
        let version = version.into();
        // an empty needle would guard every value
        if !version.is_empty() {
            self.versions.insert(version);
        }
    }

    pub fn contains(&self, version: &str) -> bool {
        self.versions.contains(version)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.versions.iter()
    }

    /// Whether any string or number inside `value` textually contains a
    /// known version
    pub fn guards(&self, value: &ConfigTree) -> bool {
        if self.versions.is_empty() {
            return false;
        }
        let mut hit = false;
        value.for_each_scalar(&mut |scalar| {
            if hit {
                return;
            }
            if let Some(text) = scalar.text() {
                hit = self.versions.iter().any(|v| text.contains(v.as_str()));
            }
        });
        hit
    }
}

impl FromIterator<String> for BaselineVersionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = BaselineVersionSet::new();
        for version in iter {
            set.insert(version);
        }
        set
    }
}

/// Scans trees for version-like strings
#[derive(Debug, Clone)]
pub struct VersionDetector<'a> {
    skip_fields: &'a BTreeSet<String>,
}

impl<'a> VersionDetector<'a> {
    pub fn new(skip_fields: &'a BTreeSet<String>) -> Self {
        Self { skip_fields }
    }

    /// Collect every version found anywhere in `tree`
    pub fn extract(&self, tree: &ConfigTree) -> BaselineVersionSet {
        let mut found = BaselineVersionSet::new();
        self.scan(None, tree, &mut found);
        found
    }

    fn scan(&self, key: Option<&str>, node: &ConfigTree, found: &mut BaselineVersionSet) {
        match node {
            ConfigTree::Mapping(map) => {
                for (k, v) in map.iter() {
                    self.scan(Some(k), v, found);
                }
            }
            ConfigTree::Sequence(items) => {
                for item in items {
                    self.scan(None, item, found);
                }
            }
            ConfigTree::Scalar(Scalar::String(text)) => {
                if let Some(k) = key.filter(|k| self.skip_fields.contains(*k)) {
                    tracing::trace!(key = k, value = %text, "pinned field value");
                    found.insert(text.clone());
                }
                let line = match key {
                    Some(k) => format!("{}: {}", k, text),
                    None => text.clone(),
                };
                for version in versions_in_context(&line) {
                    found.insert(version);
                }
            }
            ConfigTree::Scalar(_) => {}
        }
    }
}

/// Version substrings of `text` that appear in a version-like context
///
/// `v1.2.3` yields both `1.2.3` and `v1.2.3`, bare matches first.
pub fn versions_in_context(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for re in version_regexes() {
        for m in re.find_iter(text) {
            let line_start = text[..m.start()].rfind('\n').map(|i| i + 1).unwrap_or(0);
            let prefix = &text[line_start..m.start()];
            if in_version_context(prefix) {
                out.push(m.as_str().to_string());
            }
        }
    }
    out
}

fn in_version_context(prefix: &str) -> bool {
    // the bare half of `v1.2.3` shares its context
    let prefix = prefix.strip_suffix('v').unwrap_or(prefix);
    if prefix.ends_with(": ") {
        return true;
    }
    let lower = prefix.to_ascii_lowercase();
    lower.contains("version") || lower.contains("image")
}

/// Shorthand for [`VersionDetector::extract`]
pub fn extract_versions(tree: &ConfigTree, skip_fields: &BTreeSet<String>) -> BaselineVersionSet {
    VersionDetector::new(skip_fields).extract(tree)
}
