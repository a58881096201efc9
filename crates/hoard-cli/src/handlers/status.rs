//! Status command handler.

use anyhow::{Context, Result};

use hoard_core::ManifestStorePort;

use crate::CliContext;
use crate::presentation::StatusReport;

pub async fn execute(ctx: &CliContext, json: bool) -> Result<()> {
    let manifest = ctx
        .manifests
        .load()
        .await
        .with_context(|| format!("Failed to read {}", ctx.manifests.path().display()))?
        .unwrap_or_default();

    let report = StatusReport::from_manifest(
        &manifest,
        ctx.config.settings.effective_max_storage_bytes(),
    );
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}
