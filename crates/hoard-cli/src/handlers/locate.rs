//! Locate command handler.

use anyhow::Result;

use hoard_core::LocalPlaybackIndexPort;

use crate::CliContext;

/// Print the local file for `track`. Returns `false` when it is not available.
pub async fn execute(ctx: &CliContext, track: &str) -> Result<bool> {
    match ctx.index.file_path(track).await {
        Some(path) => {
            println!("{}", path.display());
            Ok(true)
        }
        None => {
            eprintln!("Track {track} is not available offline");
            Ok(false)
        }
    }
}
