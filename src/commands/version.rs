//! Command: print version information.
use std::io::Write as _;

use anyhow::Result;

/// The acorn version string.
#[must_use]
pub fn version() -> &'static str {
    option_env!("ACORN_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Target triple the binary was built for, when the build script recorded it.
#[must_use]
pub fn target() -> Option<&'static str> {
    option_env!("ACORN_TARGET")
}

/// Render the line printed by `acorn version`.
#[must_use]
pub fn describe() -> String {
    target().map_or_else(
        || format!("acorn {}", version()),
        |target| format!("acorn {} ({target})", version()),
    )
}

/// Print the acorn version to stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn run() -> Result<()> {
    writeln!(std::io::stdout().lock(), "{}", describe())?;
    Ok(())
}
