//! Paths command handler.

use anyhow::Result;

use crate::CliContext;
use crate::presentation::format_bytes;

/// Print resolved locations in `key = value` format.
pub fn execute(ctx: &CliContext) -> Result<()> {
    println!("data_root = {}", ctx.config.data_root.display());
    println!("manifest = {}", ctx.manifests.path().display());
    println!("audio_dir = {}", ctx.bytes.root().display());
    println!(
        "storage_budget = {}",
        format_bytes(ctx.config.settings.effective_max_storage_bytes())
    );
    Ok(())
}
