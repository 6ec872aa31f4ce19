use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats};
use crate::error::EngineError;
use crate::generate::{ArtifactStatus, Generator};

/// Render component scripts, config files and the entrypoint.
#[derive(Debug, Clone, Default)]
pub struct GenerateArtifacts {
    components: Vec<String>,
}

impl GenerateArtifacts {
    /// Generate every registered component plus the entrypoint.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Generate only the named components.  An empty list means all.
    #[must_use]
    pub const fn only(components: Vec<String>) -> Self {
        Self { components }
    }
}

impl Task for GenerateArtifacts {
    fn name(&self) -> &str {
        "Generate artifacts"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.registry.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let generator = Generator::new(&ctx.registry, &ctx.settings, &ctx.resolution.shell_order)
            .dry_run(ctx.dry_run);
        let report = if self.components.is_empty() {
            generator.generate_all()?
        } else {
            generator.generate_components(&self.components)?
        };

        for name in &report.skipped {
            ctx.log
                .warn(&format!("shell order lists unregistered component '{name}', skipped"));
        }
        for artifact in &report.artifacts {
            let path = artifact.generated_path.display();
            match artifact.status {
                ArtifactStatus::Planned => ctx.log.dry_run(&format!("would write {path}")),
                ArtifactStatus::Written => ctx.log.debug(&format!("wrote {path}")),
                ArtifactStatus::Unchanged => ctx.log.debug(&format!("ok: {path} (unchanged)")),
            }
        }
        for error in &report.errors {
            let at = error
                .path
                .as_ref()
                .map_or_else(String::new, |p| format!(" ({})", p.display()));
            ctx.log
                .error(&format!("{}{at}: {}", error.component, error.message));
        }

        let changed = report.count(ArtifactStatus::Written) + report.count(ArtifactStatus::Planned);
        let stats = TaskStats {
            changed: u32::try_from(changed).unwrap_or(u32::MAX),
            already_ok: u32::try_from(report.count(ArtifactStatus::Unchanged)).unwrap_or(u32::MAX),
            skipped: u32::try_from(report.skipped.len()).unwrap_or(u32::MAX),
        };
        let failed = report.errors.len();
        let total = report.artifacts.len() + failed;
        ctx.record(|r| r.generate = Some(report));

        if failed > 0 {
            ctx.log.info(&stats.summary(ctx.dry_run));
            return Err(EngineError::PartialFailure {
                operation: "generate".to_string(),
                failed,
                total,
            }
            .into());
        }
        Ok(stats.finish(ctx))
    }
}
