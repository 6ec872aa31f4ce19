use anyhow::Result;

use super::{Context, RcReport, Task, TaskResult};
use crate::resources::publish::PublishLink;
use crate::resources::rc_block::{RcAction, RcFile};
use crate::resources::{Resource, ResourceState};

fn rc_file(ctx: &Context) -> RcFile {
    RcFile::new(
        ctx.settings.rc_file.clone(),
        &ctx.settings.published_entrypoint(),
    )
}

fn log_action(ctx: &Context, action: RcAction, rc: &RcFile) -> TaskResult {
    let path = rc.path.display();
    if ctx.dry_run && action.is_change() {
        ctx.log.dry_run(&format!("{action}: {path}"));
    } else {
        ctx.log.info(&format!("{action}: {path}"));
    }
    ctx.record(|r| {
        r.rc = Some(RcReport {
            rc_file: rc.path.clone(),
            action,
        });
    });
    if ctx.dry_run {
        TaskResult::DryRun
    } else {
        TaskResult::Ok
    }
}

/// Add (or refresh) the sourcing block in the shell rc file.
///
/// Refuses while the published entrypoint path holds anything other than
/// acorn's own link, since every new shell would source it.
#[derive(Debug)]
pub struct InjectRcBlock;

impl Task for InjectRcBlock {
    fn name(&self) -> &str {
        "Inject rc block"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let published = ctx.settings.published_entrypoint();
        let entrypoint = PublishLink::new(ctx.settings.entrypoint(), published.clone());
        if let ResourceState::Conflict { reason } = entrypoint.current_state()? {
            anyhow::bail!(
                "{} is occupied by a {reason}, not injecting",
                published.display()
            );
        }

        let rc = rc_file(ctx);
        let action = rc.inject(ctx.dry_run)?;
        Ok(log_action(ctx, action, &rc))
    }
}

/// Remove the sourcing block from the shell rc file.
#[derive(Debug)]
pub struct EjectRcBlock;

impl Task for EjectRcBlock {
    fn name(&self) -> &str {
        "Eject rc block"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.settings.rc_file.exists()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let rc = rc_file(ctx);
        let action = rc.eject(ctx.dry_run)?;
        Ok(log_action(ctx, action, &rc))
    }
}
