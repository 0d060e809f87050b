//! Difference reports for merge change logs.
//!
//! A [`DiffReport`] is a read-only view over a [`ymerge_engine::ChangeLog`],
//! rendered either as sectioned text with truncated values or as JSON that
//! carries every value in full.

mod error;
mod report;
mod text;

pub use error::{ReportError, ReportResult};
pub use report::{
    render, summarize, write_report, ChangeSummary, DiffReport, ReportFormat, ReportMetadata,
    ReportOptions, REPORT_FORMAT_VERSION,
};
pub use text::{format_value, COLLECTION_LIMIT, SCALAR_LIMIT};
