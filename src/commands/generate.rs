//! Generate command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{GenerateOpts, GlobalOpts};
use crate::components::Registry;
use crate::logging::Logger;
use crate::tasks::Task;
use crate::tasks::generate::GenerateArtifacts;
use crate::tasks::publish::PublishArtifacts;

/// Run the generate command.
///
/// Without component names every artifact and the entrypoint are rendered;
/// with names only those components are.  Whatever was generated is then
/// published.
///
/// # Errors
///
/// Returns an error if a named component is unknown, setup fails, or any
/// artifact fails to generate or publish.
pub fn run(
    global: &GlobalOpts,
    opts: &GenerateOpts,
    registry: &Arc<Registry>,
    log: &Arc<Logger>,
) -> Result<()> {
    // Unknown names abort before any task runs or anything is written.
    for name in &opts.components {
        registry.require(name)?;
    }
    let task_list: [Box<dyn Task>; 2] = [
        Box::new(GenerateArtifacts::only(opts.components.clone())),
        Box::new(PublishArtifacts),
    ];
    super::run_tasks(global, registry, log, &task_list)?;
    Ok(())
}
