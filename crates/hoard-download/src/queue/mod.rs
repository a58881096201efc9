//! Pending download queue.
//!
//! A pure state machine over the FIFO of tracks waiting to be downloaded.
//! No I/O, no locking; the coordinator owns it behind its state mutex.

mod types;

use std::collections::VecDeque;

pub use types::PendingTrackRequest;

/// FIFO of pending track downloads, unique by track key.
#[derive(Debug, Default)]
pub struct PendingQueue {
    pending: VecDeque<PendingTrackRequest>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Check if a track is currently queued.
    pub fn contains(&self, track_key: &str) -> bool {
        self.pending.iter().any(|item| item.track_key == track_key)
    }

    /// Append a request. Returns `false` if the track is already queued.
    pub fn push(&mut self, request: PendingTrackRequest) -> bool {
        if self.contains(&request.track_key) {
            return false;
        }
        self.pending.push_back(request);
        true
    }

    /// Pop the next item from the front of the queue.
    pub fn pop_front(&mut self) -> Option<PendingTrackRequest> {
        self.pending.pop_front()
    }

    /// Remove a queued track, returning its request.
    pub fn remove(&mut self, track_key: &str) -> Option<PendingTrackRequest> {
        let index = self
            .pending
            .iter()
            .position(|item| item.track_key == track_key)?;
        self.pending.remove(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingTrackRequest> {
        self.pending.iter()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
