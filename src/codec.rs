//! Document codec
//!
//! Reads YAML or JSON documents into [`ConfigTree`]s and writes them back.
//! Files ending in `.json` use JSON; everything else is treated as YAML.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_yaml::Value as YamlValue;
use thiserror::Error;
use tracing::debug;
use ymerge_engine::{ConfigTree, Mapping, Scalar};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("YAML syntax error in {}: {message}", .path.display())]
    Syntax { path: PathBuf, message: String },

    #[error("cannot serialize document for {}: {message}", .path.display())]
    Serialize { path: PathBuf, message: String },
}

impl CodecError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, CodecError::Io { source, .. } if source.kind() == io::ErrorKind::PermissionDenied)
    }
}

/// Document encoding, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// Load a document. Empty and null documents load as an empty mapping.
pub fn load_tree(path: &Path) -> Result<ConfigTree, CodecError> {
    let contents = fs::read_to_string(path).map_err(|source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tree = parse_tree(&contents, DocumentFormat::for_path(path)).map_err(|message| {
        CodecError::Syntax {
            path: path.to_path_buf(),
            message,
        }
    })?;
    debug!(path = %path.display(), "loaded document");
    Ok(tree)
}

/// Parse document text in the given format
pub fn parse_tree(contents: &str, format: DocumentFormat) -> Result<ConfigTree, String> {
    if contents.trim().is_empty() {
        return Ok(ConfigTree::empty());
    }
    let tree = match format {
        DocumentFormat::Json => serde_json::from_str::<serde_json::Value>(contents)
            .map(ConfigTree::from)
            .map_err(|e| e.to_string())?,
        DocumentFormat::Yaml => serde_yaml::from_str::<YamlValue>(contents)
            .map(yaml_to_tree)
            .map_err(|e| e.to_string())?,
    };
    Ok(tree.or_empty())
}

/// Render a tree in the given format
pub fn render_tree(tree: &ConfigTree, format: DocumentFormat) -> Result<String, String> {
    match format {
        DocumentFormat::Json => serde_json::to_string_pretty(tree)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| e.to_string()),
        DocumentFormat::Yaml => serde_yaml::to_string(tree).map_err(|e| e.to_string()),
    }
}

/// Write a tree, keeping mapping key order
pub fn save_tree(tree: &ConfigTree, path: &Path) -> Result<(), CodecError> {
    let rendered = render_tree(tree, DocumentFormat::for_path(path)).map_err(|message| {
        CodecError::Serialize {
            path: path.to_path_buf(),
            message,
        }
    })?;
    fs::write(path, rendered).map_err(|source| CodecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "wrote document");
    Ok(())
}

fn yaml_to_tree(value: YamlValue) -> ConfigTree {
    match value {
        YamlValue::Null => ConfigTree::null(),
        YamlValue::Bool(b) => ConfigTree::Scalar(Scalar::Bool(b)),
        YamlValue::Number(n) => ConfigTree::Scalar(if let Some(i) = n.as_i64() {
            Scalar::Integer(i)
        } else if let Some(u) = n.as_u64() {
            Scalar::UInt(u)
        } else {
            Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
        }),
        YamlValue::String(s) => ConfigTree::string(s),
        YamlValue::Sequence(items) => {
            ConfigTree::Sequence(items.into_iter().map(yaml_to_tree).collect())
        }
        YamlValue::Mapping(map) => ConfigTree::Mapping(
            map.into_iter()
                .map(|(k, v)| (key_to_string(k), yaml_to_tree(v)))
                .collect::<Mapping>(),
        ),
        YamlValue::Tagged(tagged) => yaml_to_tree(tagged.value),
    }
}

fn key_to_string(key: YamlValue) -> String {
    match key {
        YamlValue::String(s) => s,
        YamlValue::Null => "null".to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Tagged(tagged) => key_to_string(tagged.value),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn yaml(text: &str) -> ConfigTree {
        parse_tree(text, DocumentFormat::Yaml).unwrap()
    }

    #[test]
    fn test_format_for_path() {
        assert_eq!(DocumentFormat::for_path(Path::new("a.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::for_path(Path::new("a.JSON")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::for_path(Path::new("a.yml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::for_path(Path::new("values")), DocumentFormat::Yaml);
    }

    #[test]
    fn test_empty_documents_are_empty_mappings() {
        assert_eq!(yaml(""), ConfigTree::empty());
        assert_eq!(yaml("   \n"), ConfigTree::empty());
        assert_eq!(yaml("~"), ConfigTree::empty());
        assert_eq!(yaml("null"), ConfigTree::empty());
    }

    #[test]
    fn test_yaml_scalars() {
        let tree = yaml("a: 1\nb: 2.5\nc: true\nd: ~\ne: \"25.1.100\"\nf: text\n");
        assert_eq!(
            tree,
            ConfigTree::from(json!({"a": 1, "b": 2.5, "c": true, "d": null, "e": "25.1.100", "f": "text"}))
        );
    }

    #[test]
    fn test_yaml_keeps_key_order() {
        let tree = yaml("zeta: 1\nalpha: 2\nmid: 3\n");
        let keys: Vec<_> = tree.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_non_string_keys_stringified() {
        let tree = yaml("1: one\ntrue: yes\n");
        let map = tree.as_mapping().unwrap();
        assert_eq!(map.get("1"), Some(&ConfigTree::string("one")));
        assert!(map.contains_key("true"));
    }

    #[test]
    fn test_tags_dropped() {
        let tree = yaml("secret: !vault abc\n");
        assert_eq!(tree, ConfigTree::from(json!({"secret": "abc"})));
    }

    #[test]
    fn test_syntax_error() {
        assert!(parse_tree("a: [1, 2\n", DocumentFormat::Yaml).is_err());
        assert!(parse_tree("{\"a\": ", DocumentFormat::Json).is_err());
    }

    #[test]
    fn test_load_reports_syntax_error_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yml");
        fs::write(&path, "items: [1, 2\nother: x\n").unwrap();

        let err = load_tree(&path).unwrap_err();
        assert!(matches!(err, CodecError::Syntax { .. }));
        assert!(err.to_string().contains("bad.yml"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_tree(Path::new("/nonexistent/doc.yml")).unwrap_err();
        assert!(matches!(err, CodecError::Io { .. }));
    }

    #[test]
    fn test_save_and_reload_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yml");
        let tree = ConfigTree::from(json!({
            "service": {"name": "web", "ports": [80, 443]},
            "replicas": 2,
            "tag": "25.1.100"
        }));

        save_tree(&tree, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.find("service").unwrap() < text.find("replicas").unwrap());
        assert_eq!(load_tree(&path).unwrap(), tree);
    }

    #[test]
    fn test_integers_beyond_i64_round_trip() {
        let tree = yaml("big: 18446744073709551615\nsmall: -3\n");
        assert_eq!(
            tree.get_path("big"),
            Some(&ConfigTree::Scalar(Scalar::UInt(u64::MAX)))
        );

        let rendered = render_tree(&tree, DocumentFormat::Yaml).unwrap();
        assert_eq!(rendered, "big: 18446744073709551615\nsmall: -3\n");

        let json = render_tree(&tree, DocumentFormat::Json).unwrap();
        assert!(json.contains("\"big\": 18446744073709551615"));
    }

    #[test]
    fn test_save_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let tree = ConfigTree::from(json!({"b": 1, "a": [true, null]}));

        save_tree(&tree, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("}\n"));
        assert_eq!(load_tree(&path).unwrap(), tree);
    }
}
