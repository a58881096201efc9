//! Local playback index.
//!
//! Read side: resolve a completed track to its stored file. Write side:
//! stamp a play time, which the eviction ranking uses.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::ports::{ByteStorePort, LocalPlaybackIndexPort, ManifestStorePort, StoreError};

const LEGACY_AUDIO_SUFFIX: &str = ".audio";

/// Playback index over the manifest and byte stores.
///
/// Each call reloads the manifest from the store, so it sees whatever the
/// coordinator last persisted.
///
/// [`LocalPlaybackIndexPort::mark_played`] saves straight to the store. A
/// coordinator running in the same data root keeps its own copy and will
/// overwrite the timestamp on its next save; route plays through the
/// coordinator instead while one is running.
pub struct LocalPlaybackIndex {
    manifest_store: Arc<dyn ManifestStorePort>,
    byte_store: Arc<dyn ByteStorePort>,
    lock: Mutex<()>,
}

impl LocalPlaybackIndex {
    pub fn new(manifest_store: Arc<dyn ManifestStorePort>, byte_store: Arc<dyn ByteStorePort>) -> Self {
        Self {
            manifest_store,
            byte_store,
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl LocalPlaybackIndexPort for LocalPlaybackIndex {
    async fn file_path(&self, track_key: &str) -> Option<PathBuf> {
        let _guard = self.lock.lock().await;

        let manifest = match self.manifest_store.load().await {
            Ok(manifest) => manifest?,
            Err(e) => {
                tracing::debug!(target: "hoard.store", track = %track_key, error = %e, "Manifest unreadable for lookup");
                return None;
            }
        };
        let record = manifest.tracks.get(track_key)?;
        if !record.is_completed() {
            return None;
        }
        let relative_path = record.relative_file_path()?;
        if relative_path.to_lowercase().ends_with(LEGACY_AUDIO_SUFFIX) {
            return None;
        }

        // The file may have been removed behind the manifest's back.
        if !self.byte_store.exists(relative_path).await {
            return None;
        }
        Some(self.byte_store.absolute_path(relative_path))
    }

    async fn mark_played(&self, track_key: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;

        let Some(mut manifest) = self.manifest_store.load().await? else {
            return Ok(false);
        };
        let Some(record) = manifest.tracks.get_mut(track_key) else {
            return Ok(false);
        };
        record.last_played_at = Some(at);
        self.manifest_store.save(&manifest).await?;

        tracing::debug!(target: "hoard.store", track = %track_key, "Recorded play");
        Ok(true)
    }
}
