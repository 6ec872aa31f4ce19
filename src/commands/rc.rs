//! Inject and eject command implementations.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::components::Registry;
use crate::logging::Logger;
use crate::tasks::Task;
use crate::tasks::rc::{EjectRcBlock, InjectRcBlock};

/// Run the inject command.
///
/// # Errors
///
/// Returns an error if setup fails or the rc file cannot be updated.
pub fn inject(global: &GlobalOpts, registry: &Arc<Registry>, log: &Arc<Logger>) -> Result<()> {
    let task_list: [Box<dyn Task>; 1] = [Box::new(InjectRcBlock)];
    super::run_tasks(global, registry, log, &task_list)?;
    Ok(())
}

/// Run the eject command.
///
/// # Errors
///
/// Returns an error if setup fails or the rc file cannot be updated.
pub fn eject(global: &GlobalOpts, registry: &Arc<Registry>, log: &Arc<Logger>) -> Result<()> {
    let task_list: [Box<dyn Task>; 1] = [Box::new(EjectRcBlock)];
    super::run_tasks(global, registry, log, &task_list)?;
    Ok(())
}
