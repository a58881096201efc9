//! Purge command handler.

use anyhow::{Result, bail};

use hoard_core::{ByteStorePort, ManifestStorePort};

use crate::CliContext;

pub async fn execute(ctx: &CliContext, yes: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to delete offline downloads without --yes");
    }

    ctx.bytes.remove_all().await?;
    ctx.manifests.clear().await?;

    tracing::info!(data_root = %ctx.config.data_root.display(), "Purged offline downloads");
    println!("Removed all offline downloads");
    Ok(())
}
