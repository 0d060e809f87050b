//! Structured difference report

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ymerge_engine::{ChangeKind, ChangeLog, ChangeRecord};

use crate::error::{ReportError, ReportResult};
use crate::text;

/// Format version written into report metadata
pub const REPORT_FORMAT_VERSION: &str = "1.0";

/// Output shape of a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable sections
    #[default]
    Text,
    /// Machine-readable, untruncated
    Json,
}

impl ReportFormat {
    pub const VALID: &'static [&'static str] = &["text", "json"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub format: ReportFormat,
    pub show_unchanged: bool,
}

impl ReportOptions {
    pub fn new(format: ReportFormat, show_unchanged: bool) -> Self {
        Self {
            format,
            show_unchanged,
        }
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub generated_on: DateTime<Utc>,
    pub format_version: String,
    pub show_unchanged: bool,
}

/// Record counts per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    #[serde(rename = "Added")]
    pub added: usize,

    #[serde(rename = "Modified")]
    pub modified: usize,

    #[serde(rename = "Removed")]
    pub removed: usize,

    /// Present only when unchanged records were requested
    #[serde(rename = "Unchanged", skip_serializing_if = "Option::is_none")]
    pub unchanged: Option<usize>,
}

impl ChangeSummary {
    /// Count kinds over already-filtered records
    pub fn from_records<'a, I>(records: I, show_unchanged: bool) -> Self
    where
        I: IntoIterator<Item = &'a ChangeRecord>,
    {
        let mut summary = ChangeSummary {
            unchanged: show_unchanged.then_some(0),
            ..Default::default()
        };
        for record in records {
            match record.kind {
                ChangeKind::Added => summary.added += 1,
                ChangeKind::Modified => summary.modified += 1,
                ChangeKind::Removed => summary.removed += 1,
                ChangeKind::Unchanged => {
                    if let Some(n) = summary.unchanged.as_mut() {
                        *n += 1;
                    }
                }
            }
        }
        summary
    }

    pub fn count(&self, kind: ChangeKind) -> usize {
        match kind {
            ChangeKind::Added => self.added,
            ChangeKind::Modified => self.modified,
            ChangeKind::Removed => self.removed,
            ChangeKind::Unchanged => self.unchanged.unwrap_or(0),
        }
    }

    pub fn total(&self) -> usize {
        self.added + self.modified + self.removed + self.unchanged.unwrap_or(0)
    }
}

/// A rendered view of one change log
#[derive(Debug, Clone, Serialize)]
pub struct DiffReport<'a> {
    pub metadata: ReportMetadata,
    pub summary: ChangeSummary,
    pub changes: Vec<&'a ChangeRecord>,
}

impl<'a> DiffReport<'a> {
    /// Build a report stamped with the current time
    pub fn build(log: &'a ChangeLog, show_unchanged: bool) -> Self {
        Self::build_at(log, show_unchanged, Utc::now())
    }

    /// Build a report with an explicit timestamp
    pub fn build_at(log: &'a ChangeLog, show_unchanged: bool, generated_on: DateTime<Utc>) -> Self {
        let changes: Vec<&ChangeRecord> = log
            .iter()
            .filter(|r| show_unchanged || r.kind != ChangeKind::Unchanged)
            .collect();
        let summary = ChangeSummary::from_records(changes.iter().copied(), show_unchanged);

        Self {
            metadata: ReportMetadata {
                generated_on,
                format_version: REPORT_FORMAT_VERSION.to_string(),
                show_unchanged,
            },
            summary,
            changes,
        }
    }

    /// Records of one kind, in log order
    pub fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &'a ChangeRecord> + '_ {
        self.changes.iter().copied().filter(move |r| r.kind == kind)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_text(&self) -> String {
        text::render_text(self)
    }

    pub fn render(&self, format: ReportFormat) -> ReportResult<String> {
        match format {
            ReportFormat::Text => Ok(self.to_text()),
            ReportFormat::Json => Ok(self.to_json()?),
        }
    }
}

/// Render `log` according to `options`
pub fn render(log: &ChangeLog, options: &ReportOptions) -> ReportResult<String> {
    DiffReport::build(log, options.show_unchanged).render(options.format)
}

/// Render `log` and write it to `path`
pub fn write_report(log: &ChangeLog, options: &ReportOptions, path: &Path) -> ReportResult<()> {
    let rendered = render(log, options)?;
    fs::write(path, rendered).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Counts for `log` after the unchanged filter
pub fn summarize(log: &ChangeLog, show_unchanged: bool) -> ChangeSummary {
    ChangeSummary::from_records(
        log.iter()
            .filter(|r| show_unchanged || r.kind != ChangeKind::Unchanged),
        show_unchanged,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{json, Value};
    use ymerge_engine::{ChangePath, ConfigTree};

    fn sample_log() -> ChangeLog {
        let mut log = ChangeLog::new();
        log.added(ChangePath::root().key("new"), ConfigTree::from(json!({"a": 1})));
        log.modified(
            ChangePath::root().key("svc").key("port"),
            ConfigTree::from(json!(80)),
            ConfigTree::from(json!(8080)),
        );
        log.unchanged(ChangePath::root().key("name"), ConfigTree::string("web"));
        log.removed(ChangePath::root().key("legacy"), ConfigTree::from(json!(true)));
        log
    }

    #[test]
    fn test_unchanged_filtered_by_default() {
        let log = sample_log();
        let report = DiffReport::build(&log, false);

        assert_eq!(report.changes.len(), 3);
        assert_eq!(report.summary.unchanged, None);
        assert_eq!(report.summary.total(), 3);
    }

    #[test]
    fn test_unchanged_included_on_request() {
        let log = sample_log();
        let report = DiffReport::build(&log, true);

        assert_eq!(report.changes.len(), 4);
        assert_eq!(report.summary.unchanged, Some(1));
    }

    #[test]
    fn test_json_shape() {
        let log = sample_log();
        let when = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let json: Value = serde_json::from_str(
            &DiffReport::build_at(&log, false, when).to_json().unwrap(),
        )
        .unwrap();

        assert_eq!(json["metadata"]["format_version"], "1.0");
        assert_eq!(json["metadata"]["show_unchanged"], false);
        assert!(json["metadata"]["generated_on"]
            .as_str()
            .unwrap()
            .starts_with("2026-01-02T03:04:05"));
        assert_eq!(json["summary"], json!({"Added": 1, "Modified": 1, "Removed": 1}));
        assert_eq!(json["changes"][0]["type"], "Added");
        assert_eq!(json["changes"][0]["new_value"], json!({"a": 1}));
        assert_eq!(json["changes"][1]["path"], "svc.port");
        assert_eq!(json["changes"][2]["old_value"], true);
        assert!(json["changes"][2]["new_value"].is_null());
    }

    #[test]
    fn test_json_values_not_truncated() {
        let long = "x".repeat(500);
        let mut log = ChangeLog::new();
        log.added(ChangePath::root().key("blob"), ConfigTree::string(long.clone()));

        let rendered = render(&log, &ReportOptions::new(ReportFormat::Json, false)).unwrap();
        let json: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(json["changes"][0]["new_value"], Value::String(long));
    }

    #[test]
    fn test_render_does_not_consume_log() {
        let log = sample_log();
        let before = log.clone();
        let _ = render(&log, &ReportOptions::new(ReportFormat::Text, true)).unwrap();
        let _ = render(&log, &ReportOptions::new(ReportFormat::Json, false)).unwrap();
        assert_eq!(log, before);
    }

    #[test]
    fn test_summarize_matches_report() {
        let log = sample_log();
        assert_eq!(summarize(&log, false), DiffReport::build(&log, false).summary);
        assert_eq!(summarize(&log, true).count(ChangeKind::Unchanged), 1);
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        let err = "xml".parse::<ReportFormat>().unwrap_err();
        assert!(err.to_string().contains("text, json"));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diff.json");
        write_report(&sample_log(), &ReportOptions::new(ReportFormat::Json, true), &path).unwrap();

        let json: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["changes"].as_array().unwrap().len(), 4);
    }
}
