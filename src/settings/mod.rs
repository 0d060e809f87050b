//! Layered settings
//!
//! Three layers, later wins:
//! 1. Built-in defaults
//! 2. Settings file (`config.json` unless given; `.toml` files parsed as TOML)
//! 3. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::{BuiltinDefaults, DEFAULT_SETTINGS_FILE, DEFAULT_SKIP_FIELDS};
pub use effective::{
    DiffReportSettings, EffectiveSettings, GeneralSettings, InputOutput, Settings, SettingsError,
    SettingsOrigin, SettingsSource, ValidationSettings, SCHEMA_VERSION,
};
pub use merge::{deep_merge, merge_layers, set_path};
