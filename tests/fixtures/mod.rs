//! Test fixtures for pipeline and property tests
//!
//! - `values/file_v1.yml`: source document (newer template)
//! - `values/file_v2.yml`: target document (deployed values with pinned versions)

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tempfile::TempDir;
use ymerge::engine::ConfigTree;
use ymerge::settings::{EffectiveSettings, Settings};

/// Directory holding the values fixtures
pub fn values_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/values")
}

pub fn source_fixture() -> PathBuf {
    values_dir().join("file_v1.yml")
}

pub fn target_fixture() -> PathBuf {
    values_dir().join("file_v2.yml")
}

/// Shorthand for building a tree from JSON
pub fn tree(value: Value) -> ConfigTree {
    ConfigTree::from(value)
}

/// A scratch directory with input documents and a settings file
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    /// Workspace seeded with the values fixtures
    pub fn with_fixtures() -> Self {
        let ws = Self::empty();
        fs::copy(source_fixture(), ws.path("file_v1.yml")).unwrap();
        fs::copy(target_fixture(), ws.path("file_v2.yml")).unwrap();
        ws
    }

    /// Workspace with the given source and target document text
    pub fn with_documents(source: &str, target: &str) -> Self {
        let ws = Self::empty();
        fs::write(ws.path("file_v1.yml"), source).unwrap();
        fs::write(ws.path("file_v2.yml"), target).unwrap();
        ws
    }

    fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn output_path(&self) -> PathBuf {
        self.path("out/file_v2_final.yml")
    }

    pub fn report_path(&self) -> PathBuf {
        self.path("reports/diff.txt")
    }

    /// Resolve settings for this workspace, layering `overrides` on top
    pub fn settings(&self, overrides: Value) -> Settings {
        let settings_file = self.path("config.json");
        let paths = json!({
            "input_output": {
                "file_v1_path": self.path("file_v1.yml"),
                "file_v2_path": self.path("file_v2.yml"),
                "output_final_path": self.output_path(),
                "diff_report_path": self.report_path(),
            }
        });
        fs::write(&settings_file, serde_json::to_string_pretty(&paths).unwrap()).unwrap();

        EffectiveSettings::build(Some(&settings_file), Some(overrides))
            .unwrap()
            .settings
    }

    pub fn read_output(&self) -> String {
        fs::read_to_string(self.output_path()).unwrap()
    }

    pub fn read_report(&self) -> String {
        fs::read_to_string(self.report_path()).unwrap()
    }
}
