//! Install command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::components::Registry;
use crate::logging::Logger;
use crate::tasks;

/// Run the install command: generate everything, publish it and inject the
/// sourcing block.
///
/// # Errors
///
/// Returns an error if setup fails or any task fails.
pub fn run(global: &GlobalOpts, registry: &Arc<Registry>, log: &Arc<Logger>) -> Result<()> {
    let report = super::run_tasks(global, registry, log, &tasks::install_tasks())?;
    if !global.dry_run
        && let Some(rc) = report.rc
        && rc.action.is_change()
    {
        log.info(&format!(
            "restart your shell or run: source {}",
            rc.rc_file.display()
        ));
    }
    Ok(())
}
