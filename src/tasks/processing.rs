use anyhow::Result;

use super::context::Context;
use crate::resources::{Resource, ResourceChange, ResourceState};

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use acorn_cli::tasks::TaskResult;
///
/// let skipped = TaskResult::Skipped("nothing declared".into());
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// ```
#[derive(Debug, Clone)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task was skipped.
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
}

/// Counters for batch tasks that process many items.
///
/// # Examples
///
/// ```
/// use acorn_cli::tasks::TaskStats;
///
/// let stats = TaskStats { changed: 3, already_ok: 10, skipped: 0 };
/// assert_eq!(stats.summary(false), "3 changed, 10 already ok");
/// assert_eq!(stats.summary(true), "3 would change, 10 already ok");
///
/// let stats = TaskStats { changed: 1, already_ok: 2, skipped: 3 };
/// assert_eq!(stats.summary(false), "1 changed, 2 already ok, 3 skipped");
/// ```
#[derive(Debug, Default)]
pub struct TaskStats {
    /// Number of items changed or applied.
    pub changed: u32,
    /// Number of items already in the correct state.
    pub already_ok: u32,
    /// Number of items skipped or left alone.
    pub skipped: u32,
}

impl TaskStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 10 already ok, 1 skipped").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        if self.skipped > 0 {
            format!(
                "{} {verb}, {} already ok, {} skipped",
                self.changed, self.already_ok, self.skipped
            )
        } else {
            format!("{} {verb}, {} already ok", self.changed, self.already_ok)
        }
    }

    /// Log the summary and return the appropriate `TaskResult`.
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        ctx.log.info(&self.summary(ctx.dry_run));
        if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        }
    }
}

impl std::ops::AddAssign for TaskStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
    }
}

/// Remove resources that are ours.
///
/// Only resources in [`ResourceState::Correct`] are removed.  Anything else
/// is either already gone or not ours, and is left alone.
///
/// # Errors
///
/// Returns an error if a resource fails to check its current state or fails
/// during removal.
pub fn remove_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    verb: &str,
) -> Result<TaskStats> {
    let mut stats = TaskStats::new();
    for resource in resources {
        let desc = resource.description();
        match resource.current_state()? {
            ResourceState::Correct if ctx.dry_run => {
                ctx.log.dry_run(&format!("would {verb}: {desc}"));
                stats.changed += 1;
            }
            ResourceState::Correct => match resource.remove()? {
                ResourceChange::Applied => {
                    ctx.log.debug(&format!("{verb}: {desc}"));
                    stats.changed += 1;
                }
                ResourceChange::AlreadyCorrect => stats.already_ok += 1,
                ResourceChange::Skipped { reason } => {
                    ctx.log.debug(&format!("left {desc}: {reason}"));
                    stats.skipped += 1;
                }
            },
            ResourceState::Missing => stats.already_ok += 1,
            ResourceState::Conflict { reason } | ResourceState::Incorrect { current: reason } => {
                ctx.log.debug(&format!("not ours, leaving {desc}: {reason}"));
                stats.skipped += 1;
            }
        }
    }
    Ok(stats)
}
