//! Offline download error types.
//!
//! These errors are serializable and carry no foreign error types. Port
//! errors are captured as their display strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::{SourceError, StoreError};

/// Error type for offline download operations.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum OfflineError {
    /// Usage stays over budget after evicting every evictable track.
    #[error("Storage budget exceeded: {used_bytes} bytes used of {budget_bytes}, nothing left to evict")]
    InsufficientStorageNonEvictable {
        /// Bytes still used after eviction.
        used_bytes: u64,
        /// Configured budget.
        budget_bytes: u64,
    },

    /// The catalog returned no downloadable part for a track.
    #[error("Track {track_key} has no downloadable part")]
    MissingTrackPartKey { track_key: String },

    /// The downloaded payload failed verification.
    #[error("Incomplete download for {track_key}: expected {expected_bytes:?} bytes, got {actual_bytes}")]
    IncompleteDownload {
        track_key: String,
        expected_bytes: Option<u64>,
        actual_bytes: u64,
    },

    /// The track was cancelled while it was downloading.
    #[error("Download of {track_key} was cancelled")]
    Cancelled { track_key: String },

    /// Track source (catalog or downloader) failure.
    #[error("Source error: {message}")]
    Source { message: String },

    /// Byte store or manifest store failure.
    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl OfflineError {
    #[must_use]
    pub const fn insufficient_storage(used_bytes: u64, budget_bytes: u64) -> Self {
        Self::InsufficientStorageNonEvictable {
            used_bytes,
            budget_bytes,
        }
    }

    pub fn missing_part_key(track_key: impl Into<String>) -> Self {
        Self::MissingTrackPartKey {
            track_key: track_key.into(),
        }
    }

    pub fn incomplete(
        track_key: impl Into<String>,
        expected_bytes: Option<u64>,
        actual_bytes: u64,
    ) -> Self {
        Self::IncompleteDownload {
            track_key: track_key.into(),
            expected_bytes,
            actual_bytes,
        }
    }

    pub fn cancelled(track_key: impl Into<String>) -> Self {
        Self::Cancelled {
            track_key: track_key.into(),
        }
    }

    pub fn source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Convert to a user-friendly message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InsufficientStorageNonEvictable { budget_bytes, .. } => format!(
                "Not enough offline storage. Remove a downloaded album or raise the {budget_bytes} byte limit."
            ),
            Self::MissingTrackPartKey { .. } => {
                "This track is not available for download.".to_string()
            }
            Self::IncompleteDownload { .. } => {
                "The download was incomplete. Try downloading it again.".to_string()
            }
            Self::Cancelled { .. } => "Download was cancelled.".to_string(),
            Self::Source { message } => format!("Could not reach the library: {message}"),
            Self::Storage { message } => format!("Offline storage failed: {message}"),
        }
    }
}

impl From<SourceError> for OfflineError {
    fn from(err: SourceError) -> Self {
        Self::source(err.to_string())
    }
}

impl From<StoreError> for OfflineError {
    fn from(err: StoreError) -> Self {
        Self::storage(err.to_string())
    }
}

/// Convenience result type for offline operations.
pub type OfflineResult<T> = Result<T, OfflineError>;
