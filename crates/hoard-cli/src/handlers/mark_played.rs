//! Mark-played command handler.

use anyhow::Result;
use chrono::Utc;

use hoard_core::LocalPlaybackIndexPort;

use crate::CliContext;

/// Stamp a play time on `track`. Returns `false` when the track is unknown.
pub async fn execute(ctx: &CliContext, track: &str) -> Result<bool> {
    let recorded = ctx.index.mark_played(track, Utc::now()).await?;
    if recorded {
        println!("Recorded play of {track}");
    } else {
        eprintln!("Track {track} is not in the offline manifest");
    }
    Ok(recorded)
}
