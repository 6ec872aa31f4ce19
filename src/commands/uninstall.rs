//! Uninstall command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{GlobalOpts, UninstallOpts};
use crate::components::Registry;
use crate::logging::Logger;
use crate::tasks;

/// Run the uninstall command.
///
/// # Errors
///
/// Returns an error if setup fails or any task fails.
pub fn run(
    global: &GlobalOpts,
    opts: UninstallOpts,
    registry: &Arc<Registry>,
    log: &Arc<Logger>,
) -> Result<()> {
    super::run_tasks(
        global,
        registry,
        log,
        &tasks::uninstall_tasks(opts.unpublish),
    )?;
    log.info("generated files were left in place");
    Ok(())
}
