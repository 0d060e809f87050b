//! Stable process exit codes

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ExitCode {
    /// Merge, report and validation all succeeded
    Success = 0,
    /// Unclassified failure
    General = 1,
    /// Invalid or malformed settings
    Configuration = 2,
    /// Missing input, unreadable or unwritable file
    File = 3,
    /// Input document failed to parse
    Syntax = 4,
    /// Post-merge validation failed
    Validation = 5,
    /// Permission denied
    Permission = 6,
}

impl ExitCode {
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(ExitCode::Success),
            1 => Some(ExitCode::General),
            2 => Some(ExitCode::Configuration),
            3 => Some(ExitCode::File),
            4 => Some(ExitCode::Syntax),
            5 => Some(ExitCode::Validation),
            6 => Some(ExitCode::Permission),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }

    pub fn description(&self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::General => "Unexpected error",
            ExitCode::Configuration => "Configuration error",
            ExitCode::File => "File error",
            ExitCode::Syntax => "Document syntax error",
            ExitCode::Validation => "Validation error",
            ExitCode::Permission => "Permission error",
        }
    }
}
