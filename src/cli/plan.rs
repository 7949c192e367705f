//! `mountctl plan`: decide what apply would do.

use crate::Context;
use anyhow::Result;
use vault_mount_controller::controller::reconciler::{plan_update, UpdatePlan};
use vault_mount_controller::mount::{Drift, MountSpec, MountState, ReconciliationResult};

/// Action apply takes for one declared mount
#[derive(Debug)]
pub enum PlannedAction {
    /// Nothing tracked yet
    Create,
    /// Tracked mount was removed outside of mountctl
    Recreate,
    NoChange,
    Update {
        plan: UpdatePlan,
        drifts: Vec<Drift>,
    },
    /// Engine type changed; only delete+create can apply it
    Replace(Drift),
}

impl PlannedAction {
    pub fn describe(&self) -> String {
        match self {
            PlannedAction::Create => "create: mount does not exist yet".to_string(),
            PlannedAction::Recreate => {
                "create: tracked mount was deleted outside of mountctl".to_string()
            }
            PlannedAction::NoChange => "no changes: mount matches its declaration".to_string(),
            PlannedAction::Update { plan, drifts } => {
                let mut lines = vec!["update in place:".to_string()];
                lines.extend(drifts.iter().map(|d| format!("  ~ {d}")));
                if let Some((from, to)) = &plan.remount {
                    lines.push(format!("  ~ path: remount {from} -> {to} (data is kept)"));
                }
                lines.join("\n")
            }
            PlannedAction::Replace(drift) => {
                format!("replace: {drift} (destroys all data in the mount)")
            }
        }
    }
}

/// Refresh the tracked mount and decide the action for `spec`
///
/// Returns the refreshed state alongside the action when the mount exists.
pub async fn decide(
    ctx: &Context,
    spec: &MountSpec,
) -> Result<(PlannedAction, Option<MountState>)> {
    let Some(tracked) = ctx.state.load()? else {
        return Ok((PlannedAction::Create, None));
    };

    let outcome = ctx
        .retry
        .run("read", || ctx.reconciler.read(&tracked.id, spec))
        .await?;

    let Some(current) = outcome.state else {
        return Ok((PlannedAction::Recreate, None));
    };

    let plan = plan_update(&current, spec);
    let action = if let Some(drift) = plan.replacement.clone() {
        PlannedAction::Replace(drift)
    } else if plan.is_noop() {
        PlannedAction::NoChange
    } else {
        let drifts = match outcome.result {
            ReconciliationResult::Drifted(drifts) => drifts,
            _ => Vec::new(),
        };
        PlannedAction::Update { plan, drifts }
    };
    Ok((action, Some(current)))
}

pub async fn plan_command(ctx: &Context, spec: &MountSpec) -> Result<()> {
    let (action, _) = decide(ctx, spec).await?;
    println!("{}: {}", spec.path, action.describe());
    Ok(())
}
