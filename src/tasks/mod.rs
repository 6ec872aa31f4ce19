//! Named tasks that orchestrate resource changes for one command.
mod context;
pub mod generate;
mod processing;
pub mod publish;
pub mod rc;
pub mod sync;

pub use context::{Context, EnvLookup, RcReport, RunReport};
pub use processing::{TaskResult, TaskStats, remove_resources};

use anyhow::Result;

use crate::logging::TaskStatus;

/// A named, executable task.
pub trait Task: Send + Sync + 'static {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task applies to the current invocation.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task cannot complete, including when a
    /// fail-soft batch finished with one or more failed entries.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// Tasks run by `install`: generate everything, publish it, wire the rc file.
#[must_use]
pub fn install_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(generate::GenerateArtifacts::all()),
        Box::new(publish::PublishArtifacts),
        Box::new(rc::InjectRcBlock),
    ]
}

/// Tasks run by `uninstall`: eject the rc block, and remove the published
/// links only when `unpublish` is set.  Generated files are left in place.
#[must_use]
pub fn uninstall_tasks(unpublish: bool) -> Vec<Box<dyn Task>> {
    let mut list: Vec<Box<dyn Task>> = vec![Box::new(rc::EjectRcBlock)];
    if unpublish {
        list.push(Box::new(publish::UnpublishArtifacts));
    }
    list
}

/// Execute a task, recording the result in the logger.
pub fn execute(task: &dyn Task, ctx: &Context) {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return;
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}
