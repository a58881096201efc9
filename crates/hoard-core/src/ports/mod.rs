//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the download subsystem expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No HTTP client or filesystem types in any signature
//! - Byte and manifest stores address content by relative path only
//! - Progress crosses task boundaries over a channel, never a shared closure

pub mod byte_store;
pub mod clock;
pub mod event_emitter;
pub mod manifest_store;
pub mod network;
pub mod playback_index;
pub mod track_source;

use std::path::Path;

use thiserror::Error;

pub use byte_store::ByteStorePort;
pub use clock::{Clock, SystemClock};
pub use event_emitter::{NoopOfflineEmitter, OfflineEventEmitterPort};
pub use manifest_store::ManifestStorePort;
pub use network::{ManualNetworkMonitor, NetworkMonitorPort};
pub use playback_index::LocalPlaybackIndexPort;
pub use track_source::{
    DownloadedPayload, ProgressReporter, ProgressUpdate, TrackDownloaderPort, TrackFetcherPort,
};

/// Errors raised by the byte store and the manifest store.
///
/// I/O errors are captured as strings so the type stays `Clone`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A filesystem operation failed.
    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },

    /// The manifest could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn io(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Capture a `std::io::Error` for the given path.
    pub fn from_io(path: &Path, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Errors raised by the track source (catalog listing and byte download).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// No server address is configured.
    #[error("No server URL configured")]
    MissingServerUrl,

    /// No access token is available.
    #[error("No access token available")]
    MissingAuthToken,

    /// The server answered with a non-success status.
    #[error("Unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    /// Connection, timeout, or body read failure.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl SourceError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}
