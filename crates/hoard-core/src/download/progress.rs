//! Live progress DTOs.
//!
//! Progress exists only in memory; the manifest stores terminal results.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::manifest::{AlbumRecord, Manifest, TrackState};

/// Progress of one queued or downloading track, with display metadata
/// resolved from the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackProgress {
    pub track_key: String,
    pub track_title: Option<String>,
    pub album_identity: Option<String>,
    pub album_title: Option<String>,
    pub artist_name: Option<String>,
    pub artwork_path: Option<String>,
    pub bytes_received: u64,
    pub expected_bytes: Option<u64>,
    pub bytes_per_second: Option<f64>,
    pub estimated_remaining_seconds: Option<f64>,
}

impl TrackProgress {
    /// Zero-byte progress for a track, filling display fields from the
    /// manifest when the caller does not know them.
    pub fn resolve(
        manifest: &Manifest,
        track_key: &str,
        track_title: Option<&str>,
        album_identity: Option<&str>,
    ) -> Self {
        let album: Option<&AlbumRecord> = album_identity
            .and_then(|identity| manifest.albums.get(identity))
            .or_else(|| manifest.album_for_track(track_key));
        let record = manifest.tracks.get(track_key);

        Self {
            track_key: track_key.to_string(),
            track_title: track_title
                .map(str::to_string)
                .or_else(|| record.and_then(|r| r.title.clone())),
            album_identity: album_identity
                .map(str::to_string)
                .or_else(|| album.map(|a| a.album_identity.clone())),
            album_title: album.map(|a| a.display_title.clone()),
            artist_name: record
                .and_then(|r| r.artist_name.clone())
                .or_else(|| album.and_then(|a| a.artist_name.clone())),
            artwork_path: album.and_then(|a| a.artwork_path.clone()),
            bytes_received: 0,
            expected_bytes: None,
            bytes_per_second: None,
            estimated_remaining_seconds: None,
        }
    }

    /// Fraction of the expected bytes received, when the size is known.
    pub fn fraction(&self) -> Option<f64> {
        let expected = self.expected_bytes.filter(|e| *e > 0)?;
        #[allow(clippy::cast_precision_loss)]
        let fraction = self.bytes_received as f64 / expected as f64;
        Some(fraction.clamp(0.0, 1.0))
    }
}

/// Pending and in-progress tracks, each sorted by track key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub pending: Vec<TrackProgress>,
    pub in_progress: Vec<TrackProgress>,
}

impl QueueSnapshot {
    pub fn pending_track_keys(&self) -> Vec<&str> {
        self.pending.iter().map(|p| p.track_key.as_str()).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn in_progress_count(&self) -> usize {
        self.in_progress.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.in_progress.is_empty()
    }
}

/// Download progress of one album.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDownloadProgress {
    pub album_identity: String,
    pub total_track_count: usize,
    pub completed_track_count: usize,
    pub pending_track_count: usize,
    pub in_progress_track_count: usize,
    /// Sum of byte fractions of in-progress tracks with a known size.
    pub partial_in_progress_track_units: f64,
}

impl AlbumDownloadProgress {
    /// Compute progress for an album from the manifest and the live queue.
    ///
    /// Returns `None` for unknown albums and albums without tracks.
    pub fn compute(manifest: &Manifest, queue: &QueueSnapshot, album_identity: &str) -> Option<Self> {
        let album = manifest.albums.get(album_identity)?;
        if album.track_keys.is_empty() {
            return None;
        }
        let members: HashSet<&str> = album.track_keys.iter().map(String::as_str).collect();

        let completed_track_count = album
            .track_keys
            .iter()
            .filter(|key| {
                manifest
                    .tracks
                    .get(key.as_str())
                    .is_some_and(|t| t.state() == TrackState::Completed)
            })
            .count();

        let pending_track_count = queue
            .pending
            .iter()
            .filter(|p| members.contains(p.track_key.as_str()))
            .count();

        let active: Vec<&TrackProgress> = queue
            .in_progress
            .iter()
            .filter(|p| match &p.album_identity {
                Some(identity) => identity == album_identity,
                None => members.contains(p.track_key.as_str()),
            })
            .collect();

        Some(Self {
            album_identity: album_identity.to_string(),
            total_track_count: album.track_keys.len(),
            completed_track_count,
            pending_track_count,
            in_progress_track_count: active.len(),
            partial_in_progress_track_units: active.iter().filter_map(|p| p.fraction()).sum(),
        })
    }

    pub const fn has_active_work(&self) -> bool {
        self.pending_track_count > 0 || self.in_progress_track_count > 0
    }

    pub const fn is_complete(&self) -> bool {
        self.total_track_count > 0
            && self.completed_track_count >= self.total_track_count
            && !self.has_active_work()
    }

    /// Completed tracks plus partial in-progress units over the track count,
    /// clamped to `0.0..=1.0`.
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction_complete(&self) -> f64 {
        if self.total_track_count == 0 {
            return 0.0;
        }
        let units = self.completed_track_count as f64 + self.partial_in_progress_track_units;
        (units / self.total_track_count as f64).clamp(0.0, 1.0)
    }
}
