//! Sync command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{GlobalOpts, SyncOpts};
use crate::components::Registry;
use crate::logging::Logger;
use crate::tasks::Task;
use crate::tasks::sync::SyncConfigFiles;

/// Run the sync command.
///
/// # Errors
///
/// Returns an error if setup fails, any entry fails to sync, or (with
/// `--check`) any entry has drifted.
pub fn run(
    global: &GlobalOpts,
    opts: &SyncOpts,
    registry: &Arc<Registry>,
    log: &Arc<Logger>,
) -> Result<()> {
    let task = if opts.check {
        SyncConfigFiles::check()
    } else {
        SyncConfigFiles::repair()
    };
    let task_list: [Box<dyn Task>; 1] = [Box::new(task)];
    super::run_tasks(global, registry, log, &task_list)?;
    Ok(())
}
