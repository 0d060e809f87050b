//! Version and build information

use std::env::consts::{ARCH, OS};

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
pub const LICENSE: &str = env!("CARGO_PKG_LICENSE");
pub const REPOSITORY: &str = env!("CARGO_PKG_REPOSITORY");

/// `<name> <version>`
pub fn short_version() -> String {
    format!("{} {}", NAME, VERSION)
}

/// Multi-line build report printed by `--verbose-version`
pub fn verbose_version() -> String {
    let rows = [
        ("Version", VERSION),
        ("Description", DESCRIPTION),
        ("License", LICENSE),
        ("Repository", REPOSITORY),
        ("Target OS", OS),
        ("Target arch", ARCH),
    ];

    let mut out = format!("{}\n{}\n", short_version(), "=".repeat(40));
    for (label, value) in rows {
        out.push_str(&format!("{:<12} {}\n", format!("{}:", label), value));
    }
    out
}
