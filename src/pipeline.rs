//! Merge pipeline
//!
//! Orchestrates one run:
//! 1. Validate file paths
//! 2. Load source (v1) and target (v2) documents
//! 3. Merge source into target
//! 4. Write the merged document
//! 5. Write the difference report
//! 6. Validate the written output

use std::io;

use thiserror::Error;
use tracing::{debug, info};
use ymerge_engine::{merge, ChangeLog, ConfigTree};
use ymerge_report::{summarize, write_report, ChangeSummary, ReportError};

use crate::codec::{self, CodecError};
use crate::exit::ExitCode;
use crate::settings::{Settings, SettingsError};
use crate::validate::{Check, ValidationError, Validator};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl PipelineError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            PipelineError::Settings(e) if e.is_permission_denied() => ExitCode::Permission,
            PipelineError::Settings(e) if e.is_file_error() => ExitCode::File,
            PipelineError::Settings(_) => ExitCode::Configuration,
            PipelineError::Codec(CodecError::Syntax { .. }) => ExitCode::Syntax,
            PipelineError::Codec(e) if e.is_permission_denied() => ExitCode::Permission,
            PipelineError::Codec(CodecError::Io { .. }) => ExitCode::File,
            PipelineError::Codec(CodecError::Serialize { .. }) => ExitCode::General,
            PipelineError::Report(ReportError::Io { source, .. })
                if source.kind() == io::ErrorKind::PermissionDenied =>
            {
                ExitCode::Permission
            }
            PipelineError::Report(ReportError::Io { .. }) => ExitCode::File,
            PipelineError::Report(ReportError::UnknownFormat(_)) => ExitCode::Configuration,
            PipelineError::Report(ReportError::Serialization(_)) => ExitCode::General,
            PipelineError::Validation(_) => ExitCode::Validation,
        }
    }

    /// Message category shown ahead of the error text
    pub fn category(&self) -> &'static str {
        self.exit_code().description()
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Everything a successful run produced
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub merged: ConfigTree,
    pub changes: ChangeLog,

    /// Counts after the unchanged filter of the report settings
    pub summary: ChangeSummary,

    pub checks: Vec<Check>,
}

/// Run the pipeline with the default external validators
pub fn run(settings: &Settings) -> PipelineResult<PipelineOutcome> {
    run_with(settings, &Validator::new())
}

/// Run the pipeline with the given validator
pub fn run_with(settings: &Settings, validator: &Validator) -> PipelineResult<PipelineOutcome> {
    let io = &settings.input_output;

    info!("validating file paths");
    settings.validate_file_paths()?;

    info!(
        source = %io.file_v1_path.display(),
        target = %io.file_v2_path.display(),
        "loading documents"
    );
    let source = codec::load_tree(&io.file_v1_path)?;
    let target = codec::load_tree(&io.file_v2_path)?;

    let context = settings.merge_context();
    info!(
        list_strategy = %context.list_strategy,
        deletions = %context.deletion_strategy,
        "merging"
    );
    let outcome = merge(&source, &target, &context);
    debug!(
        records = outcome.changes.len(),
        baseline_versions = outcome.baseline.len(),
        "merge finished"
    );

    info!(path = %io.output_final_path.display(), "writing merged document");
    codec::save_tree(&outcome.merged, &io.output_final_path)?;

    let options = settings.report_options();
    info!(
        path = %io.diff_report_path.display(),
        format = %options.format,
        "writing difference report"
    );
    write_report(&outcome.changes, &options, &io.diff_report_path)?;

    info!("validating output");
    let checks = validator.run(&settings.validation, &io.output_final_path)?;

    let summary = summarize(&outcome.changes, options.show_unchanged);
    Ok(PipelineOutcome {
        merged: outcome.merged,
        changes: outcome.changes,
        summary,
        checks,
    })
}

/// One-line summary printed after a successful run
pub fn summary_line(summary: &ChangeSummary) -> String {
    format!(
        "Changes summary: Added: {}, Modified: {}, Removed: {}",
        summary.added, summary.modified, summary.removed
    )
}

/// Line printed to stderr when a run fails
pub fn error_line(err: &PipelineError) -> String {
    format!("Error: {}", err)
}
