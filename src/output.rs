//! Text, JSON and YAML emission of command results.
use std::io::Write;

use anyhow::{Context as _, Result};
use clap::ValueEnum;
use serde::Serialize;

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
}

impl OutputFormat {
    /// Whether results are serialized instead of printed as text.
    #[must_use]
    pub const fn is_structured(self) -> bool {
        !matches!(self, Self::Text)
    }
}

/// Serialize `value` for a structured format; `None` for text.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
///
/// # Examples
///
/// ```
/// use acorn_cli::output::{OutputFormat, serialize};
///
/// let out = serialize(OutputFormat::Json, &["core", "git"]).unwrap();
/// assert_eq!(out.as_deref(), Some("[\n  \"core\",\n  \"git\"\n]\n"));
/// assert!(serialize(OutputFormat::Text, &["core"]).unwrap().is_none());
/// ```
pub fn serialize<T: Serialize + ?Sized>(format: OutputFormat, value: &T) -> Result<Option<String>> {
    Ok(match format {
        OutputFormat::Text => None,
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(value).context("serialize JSON output")?;
            out.push('\n');
            Some(out)
        }
        OutputFormat::Yaml => {
            Some(serde_yaml::to_string(value).context("serialize YAML output")?)
        }
    })
}

/// Writes command results in the selected format.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    format: OutputFormat,
}

impl Output {
    /// Create a writer for `format`.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Selected format.
    #[must_use]
    pub const fn format(self) -> OutputFormat {
        self.format
    }

    /// Emit `value` serialized, or call `text` to print it for humans.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing to stdout fails.
    pub fn emit<T, F>(self, value: &T, text: F) -> Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
    {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        match serialize(self.format, value)? {
            Some(serialized) => out.write_all(serialized.as_bytes()),
            None => text(&mut out),
        }
        .context("write to stdout")
    }

    /// Emit `value` only when a structured format is selected.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing to stdout fails.
    pub fn emit_structured<T: Serialize + ?Sized>(self, value: &T) -> Result<()> {
        self.emit(value, |_| Ok(()))
    }
}
