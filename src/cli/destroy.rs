//! `mountctl destroy`: unmount the tracked mount and forget it.

use crate::Context;
use anyhow::Result;

pub async fn destroy_command(ctx: &Context) -> Result<()> {
    let Some(tracked) = ctx.state.load()? else {
        println!("nothing to destroy: no state in {}", ctx.state.path().display());
        return Ok(());
    };

    ctx.retry
        .run("delete", || ctx.reconciler.delete(&tracked.id))
        .await?;

    let still_mounted = ctx
        .retry
        .run("verify delete", || ctx.reconciler.exists(&tracked.id))
        .await?;
    if still_mounted {
        return Err(anyhow::anyhow!(
            "mount {} still exists after delete",
            tracked.id
        ));
    }

    ctx.state.remove()?;
    println!("{}: destroyed", tracked.id);
    Ok(())
}
