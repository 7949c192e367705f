//! `mountctl status`: read the tracked mount and report drift.

use crate::Context;
use anyhow::Result;
use vault_mount_controller::mount::{MountSpec, ReconciliationResult};

pub async fn status_command(ctx: &Context, spec: &MountSpec) -> Result<()> {
    let Some(tracked) = ctx.state.load()? else {
        println!("{}: not tracked (no state in {})", spec.path, ctx.state.path().display());
        return Ok(());
    };

    let outcome = ctx
        .retry
        .run("read", || ctx.reconciler.read(&tracked.id, spec))
        .await?;

    match (&outcome.result, outcome.state) {
        (ReconciliationResult::Missing, _) | (_, None) => {
            println!("{}: missing (deleted outside of mountctl)", tracked.id);
        }
        (result, Some(state)) => {
            ctx.state.save(&state)?;
            match result {
                ReconciliationResult::Drifted(drifts) => {
                    println!("{}: drifted", state.id);
                    for drift in drifts {
                        println!("  ~ {drift}");
                    }
                }
                _ => println!("{}: in sync", state.id),
            }
        }
    }
    Ok(())
}
