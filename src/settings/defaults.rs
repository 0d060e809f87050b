//! Built-in defaults (layer 1)

use serde_json::{json, Value};
use ymerge_engine::{DeletionStrategy, ListStrategy, DEFAULT_IDENTIFIER_KEYS};
use ymerge_report::ReportFormat;

/// Fields whose values are pinned to the target by default
pub const DEFAULT_SKIP_FIELDS: &[&str] = &["tag", "envNFVersion"];

/// Settings file read when none is given explicitly
pub const DEFAULT_SETTINGS_FILE: &str = "config.json";

/// Built-in default settings values
#[derive(Debug, Clone)]
pub struct BuiltinDefaults {
    pub list_merge_strategy: ListStrategy,
    pub handle_deletions: DeletionStrategy,
    pub skip_fields: Vec<String>,
    pub identifier_keys: Vec<String>,

    /// Source document
    pub file_v1_path: String,

    /// Target document
    pub file_v2_path: String,

    pub output_final_path: String,
    pub diff_report_path: String,
    pub show_unchanged_keys: bool,
    pub diff_format: ReportFormat,
    pub validate_kubectl: bool,
    pub validate_helm: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            list_merge_strategy: ListStrategy::default(),
            handle_deletions: DeletionStrategy::default(),
            skip_fields: DEFAULT_SKIP_FIELDS.iter().map(|s| s.to_string()).collect(),
            identifier_keys: DEFAULT_IDENTIFIER_KEYS.iter().map(|s| s.to_string()).collect(),
            file_v1_path: "file_v1.yml".to_string(),
            file_v2_path: "file_v2.yml".to_string(),
            output_final_path: "file_v2_final.yml".to_string(),
            diff_report_path: "diff.txt".to_string(),
            show_unchanged_keys: false,
            diff_format: ReportFormat::default(),
            validate_kubectl: false,
            validate_helm: false,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to a JSON value for layering
    pub fn to_value(&self) -> Value {
        json!({
            "general_settings": {
                "list_merge_strategy": self.list_merge_strategy.as_str(),
                "handle_deletions": self.handle_deletions.as_str(),
                "skip_fields": self.skip_fields,
                "identifier_keys": self.identifier_keys,
            },
            "input_output": {
                "file_v1_path": self.file_v1_path,
                "file_v2_path": self.file_v2_path,
                "output_final_path": self.output_final_path,
                "diff_report_path": self.diff_report_path,
            },
            "diff_report_settings": {
                "show_unchanged_keys": self.show_unchanged_keys,
                "diff_format": self.diff_format.as_str(),
            },
            "validation": {
                "kubectl": self.validate_kubectl,
                "helm": self.validate_helm,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let value = BuiltinDefaults::default().to_value();

        assert_eq!(value["general_settings"]["list_merge_strategy"], "replace");
        assert_eq!(value["general_settings"]["handle_deletions"], "ignore");
        assert_eq!(value["general_settings"]["skip_fields"], json!(["tag", "envNFVersion"]));
        assert_eq!(value["input_output"]["file_v1_path"], "file_v1.yml");
        assert_eq!(value["input_output"]["output_final_path"], "file_v2_final.yml");
        assert_eq!(value["diff_report_settings"]["diff_format"], "text");
        assert_eq!(value["validation"]["kubectl"], false);
        assert!(value["validation"].get("chart_path").is_none());
    }

    #[test]
    fn test_identifier_keys_in_priority_order() {
        let value = BuiltinDefaults::default().to_value();
        assert_eq!(
            value["general_settings"]["identifier_keys"],
            json!(["id", "name", "key", "uuid", "identifier"])
        );
    }
}
