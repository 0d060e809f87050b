//! ymerge - YAML/JSON configuration merging
//!
//! Merges a source document (v1) into a target document (v2), keeping the
//! target's version pins, and reports every structural change. The merge
//! engine and report renderer live in their own crates and are re-exported
//! here; this crate adds layered settings, the document codec, post-merge
//! validation and the pipeline that ties them together.

pub mod build_info;
pub mod codec;
pub mod exit;
pub mod pipeline;
pub mod settings;
pub mod validate;

pub use ymerge_engine as engine;
pub use ymerge_report as report;

pub use codec::{load_tree, save_tree, CodecError};
pub use exit::ExitCode;
pub use pipeline::{run, PipelineError, PipelineOutcome, PipelineResult};
pub use settings::{EffectiveSettings, Settings, SettingsError};
pub use validate::{ValidationError, Validator};
