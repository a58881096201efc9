//! Change notifications emitted by the download coordinator.
//!
//! # Wire Format
//!
//! Events are serialized with a `type` tag:
//!
//! ```json
//! { "type": "track_progress", "trackKey": "123", "bytesReceived": 4096, "expectedBytes": 8192 }
//! ```

use serde::{Deserialize, Serialize};

/// Offline download events.
///
/// `DownloadsChanged` fires after every manifest mutation and every progress
/// update; the other variants add detail for observers that want it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OfflineEvent {
    /// Downloads state changed; re-render.
    DownloadsChanged {
        /// Monotonic change counter.
        revision: u64,
    },

    /// A track left the pending queue and started downloading.
    TrackStarted {
        #[serde(rename = "trackKey")]
        track_key: String,
    },

    /// Bytes received for the downloading track.
    TrackProgress {
        #[serde(rename = "trackKey")]
        track_key: String,
        #[serde(rename = "bytesReceived")]
        bytes_received: u64,
        #[serde(rename = "expectedBytes")]
        expected_bytes: Option<u64>,
    },

    /// A track is stored locally.
    TrackCompleted {
        #[serde(rename = "trackKey")]
        track_key: String,
        bytes: u64,
    },

    /// A track ended in the failed state.
    TrackFailed {
        #[serde(rename = "trackKey")]
        track_key: String,
        /// Message suitable for showing to the user.
        error: String,
    },

    /// A completed track was evicted to stay within the storage budget.
    TrackEvicted {
        #[serde(rename = "trackKey")]
        track_key: String,
    },

    /// All offline content was removed.
    Purged,
}

impl OfflineEvent {
    /// The track this event concerns, if any.
    pub fn track_key(&self) -> Option<&str> {
        match self {
            Self::TrackStarted { track_key }
            | Self::TrackProgress { track_key, .. }
            | Self::TrackCompleted { track_key, .. }
            | Self::TrackFailed { track_key, .. }
            | Self::TrackEvicted { track_key } => Some(track_key),
            Self::DownloadsChanged { .. } | Self::Purged => None,
        }
    }
}
