//! List command implementation.
use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::components::{ConfigFormat, Registry};
use crate::config::scaffold::Scaffold;
use crate::logging::Logger;
use crate::output::Output;

/// One row of `acorn list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentRow {
    /// Component name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// First scaffold group listing the component, if any.
    pub group: Option<String>,
    /// Whether a shell script is generated.
    pub shell: bool,
    /// Structured config format, if any.
    pub config: Option<ConfigFormat>,
    /// Number of declared sync pairs.
    pub sync_files: usize,
}

/// Rows for every registered component, in name order.
#[must_use]
pub fn rows(registry: &Registry, scaffold: &Scaffold) -> Vec<ComponentRow> {
    registry
        .descriptors()
        .map(|d| ComponentRow {
            name: d.name().to_string(),
            description: d.description().to_string(),
            group: scaffold.component_group(d.name()).map(String::from),
            shell: d.has_shell(),
            config: d.config().map(|c| c.format),
            sync_files: d.sync_files().len(),
        })
        .collect()
}

fn write_table(out: &mut dyn Write, rows: &[ComponentRow]) -> std::io::Result<()> {
    let name_width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0).max(4);
    let group_width = rows
        .iter()
        .map(|r| r.group.as_deref().map_or(1, str::len))
        .max()
        .unwrap_or(0)
        .max(5);

    writeln!(
        out,
        "{:<name_width$}  {:<group_width$}  {:<5}  {:<6}  {:<4}  DESCRIPTION",
        "NAME", "GROUP", "SHELL", "CONFIG", "SYNC"
    )?;
    for row in rows {
        let config = row.config.map_or("-", ConfigFormat::extension);
        writeln!(
            out,
            "{:<name_width$}  {:<group_width$}  {:<5}  {:<6}  {:<4}  {}",
            row.name,
            row.group.as_deref().unwrap_or("-"),
            if row.shell { "yes" } else { "no" },
            config,
            row.sync_files,
            row.description
        )?;
    }
    Ok(())
}

/// Run the list command.
///
/// # Errors
///
/// Returns an error if setup fails or stdout cannot be written.
pub fn run(global: &GlobalOpts, registry: &Registry, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, registry, log)?;
    let rows = rows(registry, &setup.scaffold);
    Output::new(global.output).emit(&rows, |out| write_table(out, &rows))
}
