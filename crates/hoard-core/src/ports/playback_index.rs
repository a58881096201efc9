//! Local playback index port, consumed by the playback engine.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::StoreError;

#[async_trait]
pub trait LocalPlaybackIndexPort: Send + Sync {
    /// Local file for a track, only when it is completed and present on disk.
    async fn file_path(&self, track_key: &str) -> Option<PathBuf>;

    /// Record a play. Returns `false` when the track is not in the manifest.
    async fn mark_played(&self, track_key: &str, at: DateTime<Utc>) -> Result<bool, StoreError>;
}
