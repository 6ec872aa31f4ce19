//! Top-level subcommand orchestration.
pub mod completion;
pub mod component;
pub mod generate;
pub mod install;
pub mod list;
pub mod rc;
pub mod scaffold;
pub mod status;
pub mod sync;
pub mod uninstall;
pub mod version;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::components::Registry;
use crate::config::Settings;
use crate::config::scaffold::{self as scaffold_file, Scaffold, ScaffoldSource};
use crate::logging::{Log, Logger};
use crate::output::Output;
use crate::resolver::{self, Resolution};
use crate::tasks::{self, Context, RunReport, Task};

/// Shared state produced by the common command setup sequence.
///
/// Resolves settings, locates the scaffold and computes the shell order so
/// that each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    pub settings: Settings,
    pub scaffold: Scaffold,
    pub source: ScaffoldSource,
    pub resolution: Resolution,
}

impl CommandSetup {
    /// Resolve settings, then discover and resolve the scaffold.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOME` is unset, the settings file is invalid, or
    /// the scaffold cannot be read or parsed.
    pub fn init(global: &GlobalOpts, registry: &Registry, log: &Logger) -> Result<Self> {
        let settings = Settings::from_env(&global.overrides())?;
        log.debug(&format!("settings: {}", settings.config_file.display()));
        log.debug(&format!("generated dir: {}", settings.generated_dir.display()));
        log.debug(&format!("rc file: {}", settings.rc_file.display()));

        let (scaffold, source) = discover_scaffold(global, Some(&settings))?;
        log.debug(&format!("scaffold: {source}"));

        let resolution = resolver::resolve(&scaffold, registry);
        log.debug(&format!(
            "shell order: {} component(s), {} unmapped",
            resolution.shell_order.len(),
            resolution.unmapped.len()
        ));

        Ok(Self {
            settings,
            scaffold,
            source,
            resolution,
        })
    }

    /// Build a task context over this setup.
    #[must_use]
    pub fn context(&self, registry: &Arc<Registry>, log: &Arc<Logger>, dry_run: bool) -> Context {
        Context::new(
            Arc::new(self.settings.clone()),
            Arc::clone(registry),
            Arc::new(self.resolution.clone()),
            Arc::clone(log) as Arc<dyn Log>,
            dry_run,
        )
    }
}

/// Locate the scaffold for `global`.
///
/// Upward search starts at the dotfiles root when settings are available and
/// at the working directory otherwise.
///
/// # Errors
///
/// Returns an error if the chosen scaffold file cannot be read or parsed.
pub fn discover_scaffold(
    global: &GlobalOpts,
    settings: Option<&Settings>,
) -> Result<(Scaffold, ScaffoldSource)> {
    let start = match settings {
        Some(settings) => settings.root.clone(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    let acorn_dir = settings.and_then(|s| s.acorn_dir.as_deref());
    Ok(scaffold_file::discover(
        global.scaffold.as_deref(),
        acorn_dir,
        &start,
    )?)
}

/// Execute every task in order, print the summary, emit the collected
/// reports, and bail if any task failed.
///
/// Structured output is written before the failure check so a failed run
/// still reports every entry.
///
/// # Errors
///
/// Returns an error if one or more tasks recorded a failure or the report
/// cannot be written.
pub fn run_tasks_to_completion<'a>(
    task_list: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
    output: Output,
) -> Result<RunReport> {
    for task in task_list {
        tasks::execute(task, ctx);
    }

    log.print_summary();

    let mut report = ctx.report();
    report.tasks = log.task_entries();
    output
        .emit_structured(&report)
        .context("write run report")?;

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} task(s) failed");
    }
    Ok(report)
}

/// Run a fixed task list for a command.
///
/// # Errors
///
/// Returns an error if setup fails or any task fails.
pub fn run_tasks(
    global: &GlobalOpts,
    registry: &Arc<Registry>,
    log: &Arc<Logger>,
    task_list: &[Box<dyn Task>],
) -> Result<RunReport> {
    let setup = CommandSetup::init(global, registry, log)?;
    let ctx = setup.context(registry, log, global.dry_run);
    run_tasks_to_completion(
        task_list.iter().map(Box::as_ref),
        &ctx,
        log,
        Output::new(global.output),
    )
}
