//! End-to-end pipeline tests over real files

mod fixtures;

use fixtures::Workspace;
use serde_json::{json, Value};
use ymerge::engine::ChangeKind;
use ymerge::exit::ExitCode;
use ymerge::pipeline::{self, summary_line};
use ymerge::validate::Check;
use ymerge::{load_tree, PipelineError};

#[test]
fn test_fixture_merge_with_defaults() {
    let ws = Workspace::with_fixtures();
    let settings = ws.settings(json!({}));

    let outcome = pipeline::run(&settings).unwrap();
    let merged: Value = (&outcome.merged).into();

    // pinned versions stay
    assert_eq!(merged["image"]["tag"], "25.1.100");
    assert_eq!(merged["global"]["envNFVersion"], "25.1.100");
    assert_eq!(merged["chart"]["appVersion"], "25.1.100");

    // everything else follows the source
    assert_eq!(merged["image"]["pullPolicy"], "Always");
    assert_eq!(merged["service"]["port"], 8080);
    assert_eq!(merged["resources"]["limits"]["cpu"], "500m");
    assert_eq!(
        merged["env"],
        json!([{"name": "LOG_LEVEL", "value": "debug"}, {"name": "NEW_FLAG", "value": "on"}])
    );

    // ignore keeps target-only keys
    assert_eq!(merged["legacy"]["enabled"], true);

    assert_eq!(
        summary_line(&outcome.summary),
        "Changes summary: Added: 1, Modified: 3, Removed: 0"
    );
    assert_eq!(outcome.changes.count(ChangeKind::Unchanged), 3);
    assert_eq!(outcome.checks, vec![Check::WellFormed]);
}

#[test]
fn test_guarded_keys_produce_no_records() {
    let ws = Workspace::with_fixtures();
    let outcome = pipeline::run(&ws.settings(json!({}))).unwrap();

    assert!(outcome.changes.find("image.tag").is_none());
    assert!(outcome.changes.find("global.envNFVersion").is_none());
    assert!(outcome.changes.find("chart").is_none());
    assert!(outcome.changes.find("chart.appVersion").is_none());
}

#[test]
fn test_output_written_in_target_key_order() {
    let ws = Workspace::with_fixtures();
    pipeline::run(&ws.settings(json!({}))).unwrap();

    let output = ws.read_output();
    let order: Vec<usize> = ["global:", "image:", "chart:", "service:", "env:", "legacy:", "resources:"]
        .iter()
        .map(|key| output.find(key).unwrap())
        .collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]), "unexpected order:\n{}", output);

    let reloaded = load_tree(&ws.output_path()).unwrap();
    assert_eq!(reloaded.get_path("service.port"), Some(&fixtures::tree(json!(8080))));
}

#[test]
fn test_remove_deletions() {
    let ws = Workspace::with_fixtures();
    let settings = ws.settings(json!({"general_settings": {"handle_deletions": "remove"}}));

    let outcome = pipeline::run(&settings).unwrap();
    let merged: Value = (&outcome.merged).into();

    assert!(merged.get("legacy").is_none());
    assert_eq!(merged["image"]["tag"], "25.1.100");
    assert_eq!(merged["chart"]["appVersion"], "25.1.100");
    assert_eq!(outcome.summary.removed, 1);

    let removed = outcome.changes.find("legacy").unwrap();
    assert_eq!(removed.kind, ChangeKind::Removed);
}

#[test]
fn test_intelligent_list_strategy() {
    let ws = Workspace::with_fixtures();
    let settings = ws.settings(json!({"general_settings": {"list_merge_strategy": "intelligent"}}));

    let outcome = pipeline::run(&settings).unwrap();
    let merged: Value = (&outcome.merged).into();

    assert_eq!(
        merged["env"],
        json!([
            {"name": "LOG_LEVEL", "value": "debug"},
            {"name": "FEATURE_X", "value": "off"},
            {"name": "NEW_FLAG", "value": "on"}
        ])
    );
}

#[test]
fn test_append_list_strategy() {
    let ws = Workspace::with_fixtures();
    let settings = ws.settings(json!({"general_settings": {"list_merge_strategy": "append"}}));

    let outcome = pipeline::run(&settings).unwrap();
    let env = outcome.merged.get_path("env").unwrap().as_sequence().unwrap();
    assert_eq!(env.len(), 4);
}

#[test]
fn test_text_report_written() {
    let ws = Workspace::with_fixtures();
    pipeline::run(&ws.settings(json!({}))).unwrap();

    let report = ws.read_report();
    assert!(report.starts_with("YAML Merge Difference Report\n"));
    assert!(report.contains("Added: 1\nModified: 3\n"));
    assert!(report.contains("Path: resources\n"));
    assert!(report.contains("Path: service.port\nOld Value: 80\nNew Value: 8080\n"));
    assert!(!report.contains("Unchanged"));
}

#[test]
fn test_json_report_with_unchanged() {
    let ws = Workspace::with_fixtures();
    let settings = ws.settings(json!({
        "diff_report_settings": {"diff_format": "json", "show_unchanged_keys": true}
    }));

    let outcome = pipeline::run(&settings).unwrap();
    let report: Value = serde_json::from_str(&ws.read_report()).unwrap();

    assert_eq!(report["metadata"]["show_unchanged"], true);
    assert_eq!(
        report["summary"],
        json!({"Added": 1, "Modified": 3, "Removed": 0, "Unchanged": 3})
    );
    assert_eq!(report["changes"].as_array().unwrap().len(), 7);
    assert_eq!(outcome.summary.unchanged, Some(3));
}

#[test]
fn test_empty_source_document() {
    let ws = Workspace::with_documents("", "a: 1\nb: [1, 2]\n");
    let outcome = pipeline::run(&ws.settings(json!({}))).unwrap();

    assert!(outcome.changes.is_empty());
    assert_eq!(outcome.merged, fixtures::tree(json!({"a": 1, "b": [1, 2]})));
    assert!(ws.read_report().ends_with("No changes detected.\n"));
}

#[test]
fn test_empty_target_document() {
    let ws = Workspace::with_documents("a: 1\nb:\n  c: x\n", "");
    let outcome = pipeline::run(&ws.settings(json!({}))).unwrap();

    assert_eq!(outcome.summary.added, 2);
    assert_eq!(outcome.merged, fixtures::tree(json!({"a": 1, "b": {"c": "x"}})));
}

#[test]
fn test_syntax_error_exit_code() {
    let ws = Workspace::with_documents("a: [1, 2\n", "a: 1\n");
    let err = pipeline::run(&ws.settings(json!({}))).unwrap_err();

    assert!(matches!(err, PipelineError::Codec(_)));
    assert_eq!(err.exit_code(), ExitCode::Syntax);
    assert!(!ws.output_path().exists());
}

#[test]
fn test_missing_input_exit_code() {
    let ws = Workspace::with_documents("a: 1\n", "a: 1\n");
    std::fs::remove_file(ws.path("file_v2.yml")).unwrap();

    let err = pipeline::run(&ws.settings(json!({}))).unwrap_err();
    assert_eq!(err.exit_code(), ExitCode::File);
    assert!(err.to_string().contains("file_v2.yml"));
}

#[cfg(unix)]
#[test]
fn test_failed_kubectl_validation_exit_code() {
    use ymerge::validate::Validator;

    let ws = Workspace::with_fixtures();
    let settings = ws.settings(json!({"validation": {"kubectl": true}}));

    let err = pipeline::run_with(&settings, &Validator::with_programs("false", "false")).unwrap_err();
    assert_eq!(err.exit_code(), ExitCode::Validation);

    // output and report are written before validation runs
    assert!(ws.output_path().exists());
    assert!(ws.report_path().exists());
}
