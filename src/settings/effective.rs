//! Effective settings with provenance
//!
//! Built-in defaults, the settings file and CLI overrides are merged in that
//! order, validated, and resolved into a typed [`Settings`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use ymerge_engine::{DeletionStrategy, ListStrategy, MergeContext, StrategyError};
use ymerge_report::{ReportFormat, ReportOptions};

use super::defaults::{BuiltinDefaults, DEFAULT_SETTINGS_FILE};
use super::merge::merge_layers;

/// Schema version of the serialized effective settings
pub const SCHEMA_VERSION: u32 = 1;

/// Origin of a settings layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SettingsOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing settings layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingsSource {
    pub origin: SettingsOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 of the raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralSettings {
    pub list_merge_strategy: ListStrategy,
    pub handle_deletions: DeletionStrategy,
    pub skip_fields: Vec<String>,
    pub identifier_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputOutput {
    /// Source document, merged into the target
    pub file_v1_path: PathBuf,

    /// Target document, the base of the merge
    pub file_v2_path: PathBuf,

    pub output_final_path: PathBuf,
    pub diff_report_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffReportSettings {
    pub show_unchanged_keys: bool,
    pub diff_format: ReportFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    pub kubectl: bool,
    pub helm: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_path: Option<PathBuf>,
}

/// Resolved, validated settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub general_settings: GeneralSettings,
    pub input_output: InputOutput,
    pub diff_report_settings: DiffReportSettings,

    #[serde(default)]
    pub validation: ValidationSettings,
}

impl Settings {
    /// Engine context for these settings
    pub fn merge_context(&self) -> MergeContext {
        let general = &self.general_settings;
        MergeContext::new()
            .with_list_strategy(general.list_merge_strategy)
            .with_deletion_strategy(general.handle_deletions)
            .with_skipped_fields(general.skip_fields.iter().cloned())
            .with_identifier_keys(general.identifier_keys.iter().cloned())
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions::new(
            self.diff_report_settings.diff_format,
            self.diff_report_settings.show_unchanged_keys,
        )
    }

    /// Check inputs exist and output directories are usable, creating
    /// missing output directories.
    pub fn validate_file_paths(&self) -> Result<(), SettingsError> {
        let io = &self.input_output;
        for input in [&io.file_v1_path, &io.file_v2_path] {
            if !input.exists() {
                return Err(SettingsError::MissingInput(input.clone()));
            }
            if !input.is_file() {
                return Err(SettingsError::NotAFile(input.clone()));
            }
        }

        for output in [&io.output_final_path, &io.diff_report_path] {
            ensure_writable_parent(output)?;
        }
        Ok(())
    }
}

fn ensure_writable_parent(file: &Path) -> Result<(), SettingsError> {
    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    if !dir.exists() {
        debug!(dir = %dir.display(), "creating output directory");
        fs::create_dir_all(dir).map_err(|source| SettingsError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    // mode bits say nothing about the current user; try a real write
    tempfile::Builder::new()
        .prefix(".ymerge-write-check-")
        .tempfile_in(dir)
        .map(drop)
        .map_err(|source| {
            debug!(dir = %dir.display(), error = %source, "output directory rejected write");
            SettingsError::NotWritable(dir.to_path_buf())
        })
}

/// Effective settings with full provenance
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveSettings {
    pub schema_version: u32,

    /// When these settings were computed
    pub created_at: DateTime<Utc>,

    /// The merged settings object
    pub config: Value,

    /// Contributing sources in precedence order
    pub sources: Vec<SettingsSource>,

    #[serde(skip)]
    pub settings: Settings,
}

impl EffectiveSettings {
    /// Build effective settings from layers.
    ///
    /// With no explicit path the default settings file is used when present.
    pub fn build(
        settings_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, SettingsError> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        layers.push(BuiltinDefaults::default().to_value());
        sources.push(SettingsSource {
            origin: SettingsOrigin::Builtin,
            path: None,
            digest: None,
        });

        let file = match settings_path {
            Some(path) if !path.exists() => {
                return Err(SettingsError::NotFound(path.to_path_buf()));
            }
            Some(path) => Some(path),
            None => {
                let default = Path::new(DEFAULT_SETTINGS_FILE);
                if default.exists() {
                    Some(default)
                } else {
                    debug!("no {} found, using built-in defaults", DEFAULT_SETTINGS_FILE);
                    None
                }
            }
        };

        if let Some(path) = file {
            let (value, digest) = Self::load_settings_file(path)?;
            debug!(path = %path.display(), %digest, "loaded settings file");
            layers.push(value);
            sources.push(SettingsSource {
                origin: SettingsOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides.filter(|v| !v.is_null()) {
            layers.push(cli);
            sources.push(SettingsSource {
                origin: SettingsOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        Self::validate_choices(&merged)?;

        let settings: Settings = serde_json::from_value(merged.clone())
            .map_err(|e| SettingsError::Invalid(e.to_string()))?;

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            created_at: Utc::now(),
            config: merged,
            sources,
            settings,
        })
    }

    /// Read a settings file, returning its value and digest
    fn load_settings_file(path: &Path) -> Result<(Value, String), SettingsError> {
        let bytes = fs::read(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            message: format!("invalid UTF-8: {}", e),
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let value = if is_toml {
            let table: toml::Value = toml::from_str(&contents).map_err(|e| SettingsError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            Self::toml_to_json(table)
        } else {
            serde_json::from_str(&contents).map_err(|e| SettingsError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        if !value.is_object() {
            return Err(SettingsError::Parse {
                path: path.to_path_buf(),
                message: "top level must be an object".to_string(),
            });
        }

        Ok((value, digest))
    }

    fn toml_to_json(toml: toml::Value) -> Value {
        match toml {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::from(i),
            toml::Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(items) => {
                Value::Array(items.into_iter().map(Self::toml_to_json).collect())
            }
            toml::Value::Table(table) => Value::Object(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::toml_to_json(v)))
                    .collect(),
            ),
        }
    }

    /// Reject unknown enumerated values with the list of valid options
    fn validate_choices(config: &Value) -> Result<(), SettingsError> {
        let choices: [(&str, &str, &'static str, &'static [&'static str]); 3] = [
            ("general_settings", "list_merge_strategy", "list_merge_strategy", ListStrategy::VALID),
            ("general_settings", "handle_deletions", "handle_deletions", DeletionStrategy::VALID),
            ("diff_report_settings", "diff_format", "diff_format", ReportFormat::VALID),
        ];

        for (section, key, setting, valid) in choices {
            let Some(value) = config.get(section).and_then(|s| s.get(key)) else {
                return Err(SettingsError::MissingKey(format!("{}.{}", section, key)));
            };
            let accepted = value.as_str().is_some_and(|s| valid.contains(&s));
            if !accepted {
                let shown = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
                return Err(StrategyError::new(setting, &shown, valid).into());
            }
        }
        Ok(())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a merged value by dot-separated path
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.config;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid settings file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error(transparent)]
    Choice(#[from] StrategyError),

    #[error("missing required setting: {0}")]
    MissingKey(String),

    #[error("invalid settings: {0}")]
    Invalid(String),

    #[error("input file does not exist: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("cannot create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("directory is not writable: {}", .0.display())]
    NotWritable(PathBuf),
}

impl SettingsError {
    /// Whether this error concerns files rather than setting values
    pub fn is_file_error(&self) -> bool {
        matches!(
            self,
            SettingsError::NotFound(_)
                | SettingsError::Io { .. }
                | SettingsError::MissingInput(_)
                | SettingsError::NotAFile(_)
                | SettingsError::CreateDir { .. }
                | SettingsError::NotWritable(_)
        )
    }

    /// Whether the underlying cause was a denied permission
    pub fn is_permission_denied(&self) -> bool {
        match self {
            SettingsError::Io { source, .. } | SettingsError::CreateDir { source, .. } => {
                source.kind() == io::ErrorKind::PermissionDenied
            }
            _ => false,
        }
    }
}
