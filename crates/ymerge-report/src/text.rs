//! Human-readable report rendering

use ymerge_engine::{ChangeKind, ChangeRecord, ConfigTree, Scalar};

use crate::report::DiffReport;

/// Longest string scalar shown in full, in characters
pub const SCALAR_LIMIT: usize = 100;

/// Longest collection rendering shown in full, in characters
pub const COLLECTION_LIMIT: usize = 200;

const TITLE: &str = "YAML Merge Difference Report";
const ELLIPSIS: &str = "...";

/// Render a value for the text report, truncating long strings and
/// collections.
pub fn format_value(value: Option<&ConfigTree>) -> String {
    match value {
        None | Some(ConfigTree::Scalar(Scalar::Null)) => "null".to_string(),
        Some(ConfigTree::Scalar(Scalar::String(s))) => {
            format!("\"{}\"", truncate(s, SCALAR_LIMIT))
        }
        Some(ConfigTree::Scalar(other)) => other.to_string(),
        Some(collection) => truncate(&collection.to_compact_string(), COLLECTION_LIMIT),
    }
}

/// Cut `text` to `limit - 3` characters plus an ellipsis when it exceeds `limit`.
fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let keep = limit - ELLIPSIS.len();
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Underline width under a section heading
fn underline_width(kind: ChangeKind) -> usize {
    match kind {
        ChangeKind::Unchanged => 16,
        _ => kind.as_str().len() + 6,
    }
}

pub(crate) fn render_text(report: &DiffReport<'_>) -> String {
    let mut out = String::new();

    out.push_str(&format!("{TITLE}\n"));
    out.push_str(&format!("{}\n", "=".repeat(50)));
    out.push_str(&format!(
        "Generated on: {}\n\n",
        report.metadata.generated_on.format("%Y-%m-%d %H:%M:%S")
    ));

    if report.changes.is_empty() {
        out.push_str("No changes detected.\n");
        return out;
    }

    out.push_str("Summary:\n");
    out.push_str(&format!("{}\n", "-".repeat(20)));
    for kind in ChangeKind::ALL {
        let count = report.summary.count(kind);
        if count > 0 {
            out.push_str(&format!("{kind}: {count}\n"));
        }
    }
    out.push('\n');

    for kind in ChangeKind::ALL {
        let mut records = report.of_kind(kind).peekable();
        if records.peek().is_none() {
            continue;
        }

        out.push_str(&format!("{kind} Keys:\n"));
        out.push_str(&format!("{}\n", "-".repeat(underline_width(kind))));
        for record in records {
            write_record(&mut out, record);
        }
        if kind != ChangeKind::Unchanged {
            out.push('\n');
        }
    }

    out
}

fn write_record(out: &mut String, record: &ChangeRecord) {
    out.push_str(&format!("Path: {}\n", record.path));
    match record.kind {
        ChangeKind::Added => {
            out.push_str(&format!("New Value: {}\n", format_value(record.new_value.as_ref())));
        }
        ChangeKind::Modified => {
            out.push_str(&format!("Old Value: {}\n", format_value(record.old_value.as_ref())));
            out.push_str(&format!("New Value: {}\n", format_value(record.new_value.as_ref())));
        }
        ChangeKind::Removed => {
            out.push_str(&format!(
                "Removed Value: {}\n",
                format_value(record.old_value.as_ref())
            ));
        }
        ChangeKind::Unchanged => {
            out.push_str(&format!("Value: {}\n", format_value(record.old_value.as_ref())));
        }
    }
    out.push('\n');
}
