//! `mountctl apply`: converge the tracked mount to its declaration.

use crate::plan::{decide, PlannedAction};
use crate::Context;
use anyhow::{Context as _, Result};
use tracing::{info, warn};
use vault_mount_controller::controller::reconciler::MountError;
use vault_mount_controller::mount::{MountSpec, MountState};

pub async fn apply_command(ctx: &Context, spec: &MountSpec, allow_replace: bool) -> Result<()> {
    let (action, current) = decide(ctx, spec).await?;
    info!("{}: {}", spec.path, action.describe());

    let state = match (action, current) {
        (PlannedAction::Create, _) => create(ctx, spec).await?,
        (PlannedAction::Recreate, _) => {
            warn!("Tracked mount is gone from Vault, dropping stale record");
            ctx.state.remove()?;
            create(ctx, spec).await?
        }
        (PlannedAction::NoChange, Some(current)) => current,
        (PlannedAction::Update { .. }, Some(current)) => {
            // Record the refresh first; a failed remount leaves it indeterminate
            ctx.state.save(&current)?;
            ctx.retry
                .run("update", || ctx.reconciler.update(&current, spec))
                .await
                .map_err(|e| track_unconfirmed(ctx, spec, e))?
        }
        (PlannedAction::Replace(drift), Some(current)) => {
            if !allow_replace {
                return Err(MountError::ReplacementRequired {
                    path: current.path.clone(),
                    field: drift.field,
                    from: drift.observed,
                    to: drift.declared,
                })
                .context("re-run with --allow-replace to destroy and recreate the mount");
            }
            warn!("Replacing mount {}: {}", current.path, drift);
            ctx.retry
                .run("delete", || ctx.reconciler.delete(&current.id))
                .await?;
            ctx.state.remove()?;
            create(ctx, spec).await?
        }
        (action, None) => {
            return Err(anyhow::anyhow!(
                "no observed state for planned action: {}",
                action.describe()
            ));
        }
    };

    ctx.state.save(&state)?;
    println!("{}: applied ({})", state.path, state.id);
    for (key, value) in state.to_attributes() {
        println!("  {key} = {value}");
    }
    Ok(())
}

async fn create(ctx: &Context, spec: &MountSpec) -> Result<MountState> {
    let state = ctx
        .retry
        .run("create", || ctx.reconciler.create(spec))
        .await
        .map_err(|e| track_unconfirmed(ctx, spec, e))?;
    // Track the mount right away so a failing later step cannot orphan it
    ctx.state.save(&state)?;
    Ok(state)
}

/// Turn a reconciler failure into the CLI error
///
/// A change that went through without being read back is still tracked, under
/// its declared path, so the next run refreshes it instead of creating it again.
fn track_unconfirmed(ctx: &Context, spec: &MountSpec, err: MountError) -> anyhow::Error {
    if !err.requires_refresh() {
        return err.into();
    }
    if matches!(err, MountError::Unconfirmed { .. }) {
        warn!("Tracking {} provisionally until it can be read back", spec.path);
        if let Err(save_err) = ctx.state.save(&MountState::provisional(spec)) {
            return save_err.context(err.to_string());
        }
    }
    anyhow::Error::new(err)
        .context("run `mountctl status` to refresh the tracked mount before retrying")
}
