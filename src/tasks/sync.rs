use anyhow::{Result, bail};

use super::{Context, Task, TaskResult, TaskStats};
use crate::error::EngineError;
use crate::resources::sync_link::SyncStatus;
use crate::sync::{SyncPair, declared_pairs, status, sync};

fn pairs(ctx: &Context) -> Vec<SyncPair> {
    let env = |key: &str| (ctx.env)(key);
    declared_pairs(&ctx.registry, &ctx.settings.root, &ctx.settings.home, &env)
}

/// Mirror declared component config files into their canonical locations.
///
/// With `check` set the task only reports drift and fails when any pair is
/// out of sync.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncConfigFiles {
    check: bool,
}

impl SyncConfigFiles {
    /// Repair drift.
    #[must_use]
    pub const fn repair() -> Self {
        Self { check: false }
    }

    /// Report drift without touching anything.
    #[must_use]
    pub const fn check() -> Self {
        Self { check: true }
    }

    fn run_check(ctx: &Context, pairs: &[SyncPair]) -> Result<TaskResult> {
        let entries = status(pairs);
        let mut drifted = 0usize;
        for entry in &entries {
            if entry.status == SyncStatus::Synced {
                ctx.log
                    .debug(&format!("ok: {} (synced)", entry.target.display()));
            } else {
                ctx.log
                    .warn(&format!("{}: {}", entry.target.display(), entry.status));
                drifted += 1;
            }
        }
        let total = entries.len();
        ctx.record(|r| r.sync_status = Some(entries));

        if drifted > 0 {
            bail!("{drifted} of {total} sync entries drifted");
        }
        ctx.log.info(&format!("{total} synced"));
        Ok(TaskResult::Ok)
    }
}

impl Task for SyncConfigFiles {
    fn name(&self) -> &str {
        if self.check {
            "Check config files"
        } else {
            "Sync config files"
        }
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.registry
            .descriptors()
            .any(|d| !d.sync_files().is_empty())
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let pairs = pairs(ctx);
        if self.check {
            return Self::run_check(ctx, &pairs);
        }

        let report = sync(&pairs, ctx.dry_run);
        let mut stats = TaskStats::new();
        for outcome in &report.entries {
            let target = outcome.target.display();
            if !outcome.action.is_change() {
                ctx.log.debug(&format!("ok: {target} (synced)"));
                stats.already_ok += 1;
            } else if ctx.dry_run {
                ctx.log.dry_run(&format!("{}: {target}", outcome.action));
                stats.changed += 1;
            } else {
                ctx.log.debug(&format!("{}: {target}", outcome.action));
                stats.changed += 1;
            }
        }
        for failure in &report.errors {
            ctx.log.error(&format!(
                "{} ({}): {}",
                failure.target.display(),
                failure.component,
                failure.message
            ));
        }

        let failed = report.errors.len();
        let total = report.entries.len() + failed;
        ctx.record(|r| r.sync = Some(report));

        if failed > 0 {
            ctx.log.info(&stats.summary(ctx.dry_run));
            return Err(EngineError::PartialFailure {
                operation: "sync".to_string(),
                failed,
                total,
            }
            .into());
        }
        Ok(stats.finish(ctx))
    }
}
