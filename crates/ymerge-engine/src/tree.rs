//! Configuration tree model
//!
//! A parsed YAML/JSON document is a [`ConfigTree`]: an ordered mapping,
//! a sequence, or a scalar leaf. Mapping keys are always strings and keep
//! their document order.

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// One node of a configuration document
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigTree {
    Mapping(Mapping),
    Sequence(Vec<ConfigTree>),
    Scalar(Scalar),
}

/// Leaf value
///
/// Numbers compare by value, so `1`, `1.0` and an unsigned `1` are equal.
#[derive(Debug, Clone)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    /// Integers above `i64::MAX`
    UInt(u64),
    Float(f64),
    String(String),
}

/// Ordered string-keyed mapping with unique keys
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    entries: Vec<(String, ConfigTree)>,
}

impl ConfigTree {
    /// An empty mapping, the stand-in for absent documents
    pub fn empty() -> Self {
        ConfigTree::Mapping(Mapping::new())
    }

    /// Shorthand for a string scalar
    pub fn string(value: impl Into<String>) -> Self {
        ConfigTree::Scalar(Scalar::String(value.into()))
    }

    pub fn null() -> Self {
        ConfigTree::Scalar(Scalar::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigTree::Scalar(Scalar::Null))
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ConfigTree::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ConfigTree]> {
        match self {
            ConfigTree::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigTree::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Map a null document onto an empty mapping; everything else is kept
    pub fn or_empty(self) -> Self {
        if self.is_null() {
            ConfigTree::empty()
        } else {
            self
        }
    }

    /// Look up a value by dot-separated key path
    pub fn get_path(&self, path: &str) -> Option<&ConfigTree> {
        let mut current = self;
        for part in path.split('.') {
            current = match current {
                ConfigTree::Mapping(map) => map.get(part)?,
                ConfigTree::Sequence(items) => items.get(part.parse::<usize>().ok()?)?,
                ConfigTree::Scalar(_) => return None,
            };
        }
        Some(current)
    }

    /// Visit every scalar leaf in document order
    pub fn for_each_scalar<F: FnMut(&Scalar)>(&self, f: &mut F) {
        match self {
            ConfigTree::Mapping(map) => {
                for (_, value) in map.iter() {
                    value.for_each_scalar(f);
                }
            }
            ConfigTree::Sequence(items) => {
                for item in items {
                    item.for_each_scalar(f);
                }
            }
            ConfigTree::Scalar(s) => f(s),
        }
    }

    /// Compact single-line JSON rendering
    pub fn to_compact_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("<unrenderable>"))
    }
}

impl Scalar {
    /// Text used for substring checks; only strings and numbers have one
    pub fn text(&self) -> Option<String> {
        match self {
            Scalar::String(s) => Some(s.clone()),
            Scalar::Integer(i) => Some(i.to_string()),
            Scalar::UInt(u) => Some(u.to_string()),
            Scalar::Float(f) => Some(format_float(*f)),
            Scalar::Null | Scalar::Bool(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::UInt(u) => write!(f, "{}", u),
            Scalar::Float(v) => f.write_str(&format_float(*v)),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::String(a), Scalar::String(b)) => a == b,
            (Scalar::Integer(a), Scalar::Integer(b)) => a == b,
            (Scalar::UInt(a), Scalar::UInt(b)) => a == b,
            (Scalar::Integer(i), Scalar::UInt(u)) | (Scalar::UInt(u), Scalar::Integer(i)) => {
                u64::try_from(*i).is_ok_and(|i| i == *u)
            }
            (Scalar::Float(f), Scalar::Integer(i)) | (Scalar::Integer(i), Scalar::Float(f)) => {
                *f == *i as f64
            }
            (Scalar::Float(f), Scalar::UInt(u)) | (Scalar::UInt(u), Scalar::Float(f)) => {
                *f == *u as f64
            }
            (Scalar::Float(a), Scalar::Float(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&serde_json::Number> for Scalar {
    fn from(n: &serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Scalar::Integer(i)
        } else if let Some(u) = n.as_u64() {
            Scalar::UInt(u)
        } else {
            Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}

fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigTree> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigTree> {
        match self.position(key) {
            Some(i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    /// Insert or overwrite. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: ConfigTree) -> Option<ConfigTree> {
        let key = key.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove a key, preserving the order of the remaining entries
    pub fn remove(&mut self, key: &str) -> Option<ConfigTree> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    pub fn retain<F: FnMut(&str, &ConfigTree) -> bool>(&mut self, mut keep: F) {
        self.entries.retain(|(k, v)| keep(k, v));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigTree)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut ConfigTree)> {
        self.entries.iter_mut().map(|(k, v)| (&*k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.iter().map(|(k, _)| k)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

/// Mappings compare by content, not by key order
impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|o| o == value))
    }
}

impl FromIterator<(String, ConfigTree)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (String, ConfigTree)>>(iter: I) -> Self {
        let mut map = Mapping::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl IntoIterator for Mapping {
    type Item = (String, ConfigTree);
    type IntoIter = std::vec::IntoIter<(String, ConfigTree)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for ConfigTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigTree::Mapping(map) => map.serialize(serializer),
            ConfigTree::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigTree::Scalar(s) => s.serialize(serializer),
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Integer(i) => serializer.serialize_i64(*i),
            Scalar::UInt(u) => serializer.serialize_u64(*u),
            Scalar::Float(f) => serializer.serialize_f64(*f),
            Scalar::String(s) => serializer.serialize_str(s),
        }
    }
}

impl From<Value> for ConfigTree {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ConfigTree::Scalar(Scalar::Null),
            Value::Bool(b) => ConfigTree::Scalar(Scalar::Bool(b)),
            Value::Number(n) => ConfigTree::Scalar(Scalar::from(&n)),
            Value::String(s) => ConfigTree::Scalar(Scalar::String(s)),
            Value::Array(items) => {
                ConfigTree::Sequence(items.into_iter().map(ConfigTree::from).collect())
            }
            Value::Object(map) => ConfigTree::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, ConfigTree::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&ConfigTree> for Value {
    fn from(tree: &ConfigTree) -> Self {
        match tree {
            ConfigTree::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
            ConfigTree::Sequence(items) => Value::Array(items.iter().map(Value::from).collect()),
            ConfigTree::Scalar(Scalar::Null) => Value::Null,
            ConfigTree::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            ConfigTree::Scalar(Scalar::Integer(i)) => Value::from(*i),
            ConfigTree::Scalar(Scalar::UInt(u)) => Value::from(*u),
            ConfigTree::Scalar(Scalar::Float(f)) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ConfigTree::Scalar(Scalar::String(s)) => Value::String(s.clone()),
        }
    }
}
