use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats, remove_resources};
use crate::error::EngineError;
use crate::generate::Generator;
use crate::resources::publish::{PublishLink, PublishOutcome, publish};

/// Symlink every artifact generated earlier in the run into the link directory.
#[derive(Debug)]
pub struct PublishArtifacts;

impl Task for PublishArtifacts {
    fn name(&self) -> &str {
        "Publish artifacts"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.report().generate.is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let artifacts = ctx
            .report()
            .generate
            .map(|report| report.artifacts)
            .unwrap_or_default();
        if artifacts.is_empty() {
            return Ok(TaskResult::Skipped("nothing generated".to_string()));
        }

        let report = publish(&artifacts, ctx.dry_run);
        let mut stats = TaskStats::new();
        for entry in &report.entries {
            let link = entry.link.display();
            match &entry.outcome {
                PublishOutcome::Linked => {
                    ctx.log.debug(&format!("linked {link}"));
                    stats.changed += 1;
                }
                PublishOutcome::WouldLink => {
                    ctx.log.dry_run(&format!(
                        "would link {link} -> {}",
                        entry.generated.display()
                    ));
                    stats.changed += 1;
                }
                PublishOutcome::AlreadyLinked => {
                    ctx.log.debug(&format!("ok: {link} (already linked)"));
                    stats.already_ok += 1;
                }
                PublishOutcome::Conflict { reason } => {
                    ctx.log
                        .error(&format!("{link} is occupied by a {reason}, left untouched"));
                }
                PublishOutcome::Error { message } => {
                    ctx.log.error(&format!("{link}: {message}"));
                }
            }
        }

        let failed = report.failures();
        let total = report.entries.len();
        ctx.record(|r| r.publish = Some(report));

        if failed > 0 {
            ctx.log.info(&stats.summary(ctx.dry_run));
            return Err(EngineError::PartialFailure {
                operation: "publish".to_string(),
                failed,
                total,
            }
            .into());
        }
        Ok(stats.finish(ctx))
    }
}

/// Remove published symlinks that still point at their generated artifact.
///
/// Anything else at a link path is not ours and stays.
#[derive(Debug)]
pub struct UnpublishArtifacts;

impl Task for UnpublishArtifacts {
    fn name(&self) -> &str {
        "Unpublish artifacts"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.settings.link_dir.is_dir()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        // A preview run computes every artifact path without writing.
        let planned = Generator::new(&ctx.registry, &ctx.settings, &ctx.resolution.shell_order)
            .dry_run(true)
            .generate_all()?;
        let links = planned.artifacts.iter().map(PublishLink::for_artifact);
        let stats = remove_resources(ctx, links, "unlink")?;
        Ok(stats.finish(ctx))
    }
}
