//! Report errors

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid diff_format: {0}. Valid options: text, json")]
    UnknownFormat(String),
}

pub type ReportResult<T> = Result<T, ReportError>;
