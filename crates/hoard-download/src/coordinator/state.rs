//! In-memory coordinator state.
//!
//! Everything here is mutated only while the coordinator's state mutex is
//! held. Methods are synchronous; I/O stays in the coordinator.

use std::collections::{BTreeMap, HashMap, HashSet};

use hoard_core::{Manifest, QueueSnapshot, RemovedAlbum, TrackProgress};

use crate::progress::ProgressSample;
use crate::queue::{PendingQueue, PendingTrackRequest};

#[derive(Debug, Default)]
pub struct CoordinatorState {
    pub manifest: Manifest,
    pub queue: PendingQueue,
    /// Live progress of the downloading track, keyed by track key.
    pub in_progress: BTreeMap<String, TrackProgress>,
    pub samples: HashMap<String, ProgressSample>,
    pub canceled: HashSet<String>,
    /// The runner is between popping a track and finishing it.
    pub processing: bool,
}

impl CoordinatorState {
    pub fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            ..Self::default()
        }
    }

    /// Queue a track unless it is already completed, pending or downloading.
    ///
    /// Failed tracks are queued again. A downloading track that was canceled
    /// or removed is revived instead, so its result is kept when it returns.
    /// Returns `true` if the track was queued.
    pub fn enqueue_if_needed(&mut self, request: PendingTrackRequest) -> bool {
        let key = request.track_key.as_str();
        if self.in_progress.contains_key(key) {
            self.revive_in_flight(&request);
            return false;
        }

        let completed = self
            .manifest
            .tracks
            .get(key)
            .is_some_and(hoard_core::TrackRecord::is_completed);
        if completed || self.queue.contains(key) {
            return false;
        }

        self.manifest.put_track(request.pending_record());
        self.queue.push(request)
    }

    fn revive_in_flight(&mut self, request: &PendingTrackRequest) {
        let key = request.track_key.as_str();
        let was_canceled = self.canceled.remove(key);
        if was_canceled || !self.manifest.tracks.contains_key(key) {
            let mut record = request.pending_record();
            record.mark_in_progress();
            self.manifest.put_track(record);
        }
    }

    /// Drop every in-memory trace of a track that left the manifest.
    ///
    /// A track that is downloading right now is marked canceled instead, so
    /// its result is discarded when the download returns.
    pub fn forget_track(&mut self, track_key: &str) {
        self.queue.remove(track_key);
        if self.in_progress.contains_key(track_key) {
            self.canceled.insert(track_key.to_string());
        }
    }

    /// Apply [`Self::forget_track`] to every track of removed albums and
    /// collect the files to delete.
    pub fn absorb_removed(&mut self, removed: &[RemovedAlbum]) -> Vec<String> {
        let mut file_paths = Vec::new();
        for album in removed {
            for track_key in &album.track_keys {
                self.forget_track(track_key);
            }
            file_paths.extend(album.file_paths.iter().cloned());
        }
        file_paths
    }

    /// Pending and in-progress tracks, each sorted by track key.
    pub fn snapshot(&self) -> QueueSnapshot {
        let mut pending: Vec<TrackProgress> = self
            .queue
            .iter()
            .map(|request| {
                TrackProgress::resolve(
                    &self.manifest,
                    &request.track_key,
                    request.title.as_deref(),
                    request.album_identity.as_deref(),
                )
            })
            .collect();
        pending.sort_by(|lhs, rhs| lhs.track_key.cmp(&rhs.track_key));

        QueueSnapshot {
            pending,
            in_progress: self.in_progress.values().cloned().collect(),
        }
    }

    /// Nothing can make progress right now.
    pub fn is_idle(&self, gate_open: bool) -> bool {
        !self.processing && (self.queue.is_empty() || !gate_open)
    }

    /// Back to an empty manifest with no queued or live work.
    pub fn reset(&mut self) {
        self.manifest = Manifest::new();
        self.queue.clear();
        self.in_progress.clear();
        self.samples.clear();
        self.canceled.clear();
    }
}
