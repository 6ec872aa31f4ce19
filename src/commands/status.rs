//! Status command implementation.
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::components::Registry;
use crate::config::Shell;
use crate::config::scaffold::ScaffoldSource;
use crate::logging::Logger;
use crate::output::Output;
use crate::resources::rc_block::{BlockState, RcFile};

/// Snapshot of the shell integration on this machine.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Detected or configured shell.
    pub shell: Shell,
    /// Rc file the block lives in.
    pub rc_file: PathBuf,
    /// State of the sourcing block.
    pub injection: BlockState,
    /// Where artifacts are generated.
    pub generated_dir: PathBuf,
    /// Whether the generated directory exists.
    pub generated_dir_exists: bool,
    /// Where artifacts are published.
    pub link_dir: PathBuf,
    /// Active scaffold.
    pub scaffold: ScaffoldSource,
    /// Components the entrypoint sources, in order.
    pub shell_order: Vec<String>,
    /// File names currently in the generated directory, sorted.
    pub generated_files: Vec<String>,
}

/// Gather the status for `setup`.  Read-only.
///
/// # Errors
///
/// Returns an error if the rc file or the generated directory exists but
/// cannot be read.
pub fn collect(setup: &CommandSetup, registry: &Registry) -> Result<StatusReport> {
    let settings = &setup.settings;
    let rc = RcFile::new(settings.rc_file.clone(), &settings.published_entrypoint());
    let generated_dir_exists = settings.generated_dir.is_dir();

    let mut generated_files = Vec::new();
    if generated_dir_exists {
        let entries = std::fs::read_dir(&settings.generated_dir).with_context(|| {
            format!("read generated dir: {}", settings.generated_dir.display())
        })?;
        for entry in entries {
            let entry = entry.context("read generated dir entry")?;
            generated_files.push(entry.file_name().to_string_lossy().into_owned());
        }
        generated_files.sort();
    }

    Ok(StatusReport {
        shell: settings.shell,
        rc_file: settings.rc_file.clone(),
        injection: rc.state()?,
        generated_dir: settings.generated_dir.clone(),
        generated_dir_exists,
        link_dir: settings.link_dir.clone(),
        scaffold: setup.source.clone(),
        shell_order: setup
            .resolution
            .shell_order
            .iter()
            .filter(|name| registry.get(name).is_some())
            .cloned()
            .collect(),
        generated_files,
    })
}

fn injection_label(state: BlockState) -> &'static str {
    match state {
        BlockState::NotPresent => "not injected",
        BlockState::PresentCorrect => "injected",
        BlockState::PresentStale => "injected (stale, run `acorn inject`)",
    }
}

fn write_text(out: &mut dyn Write, report: &StatusReport) -> std::io::Result<()> {
    writeln!(out, "Shell:         {}", report.shell)?;
    writeln!(out, "RC file:       {}", report.rc_file.display())?;
    writeln!(out, "Integration:   {}", injection_label(report.injection))?;
    let exists = if report.generated_dir_exists {
        ""
    } else {
        " (missing)"
    };
    writeln!(
        out,
        "Generated dir: {}{exists}",
        report.generated_dir.display()
    )?;
    writeln!(out, "Link dir:      {}", report.link_dir.display())?;
    writeln!(out, "Scaffold:      {}", report.scaffold)?;
    writeln!(out, "Shell order:   {}", report.shell_order.join(", "))?;
    if !report.generated_files.is_empty() {
        writeln!(out)?;
        writeln!(out, "Generated files:")?;
        for file in &report.generated_files {
            writeln!(out, "  {file}")?;
        }
    }
    Ok(())
}

/// Run the status command.
///
/// # Errors
///
/// Returns an error if setup fails or the status cannot be read or written.
pub fn run(global: &GlobalOpts, registry: &Registry, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, registry, log)?;
    let report = collect(&setup, registry)?;
    Output::new(global.output).emit(&report, |out| write_text(out, &report))
}
