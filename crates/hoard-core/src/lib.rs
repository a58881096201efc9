//! Core domain types and port definitions for hoard.
//!
//! `hoard-core` holds everything the offline download subsystem agrees on
//! without touching the network or the filesystem directly:
//!
//! - `manifest` - the persisted download manifest and its ownership rules
//! - `download` - queue/progress DTOs, download sources, and errors
//! - `catalog` - the slice of catalog metadata the downloader consumes
//! - `events` - change notifications emitted to observers
//! - `ports` - trait abstractions for stores, sources, and the network gate
//! - `services` - port-only services (local playback index, legacy cleanup)
//! - `settings` / `paths` - configuration and on-disk locations

pub mod catalog;
pub mod download;
pub mod events;
pub mod manifest;
pub mod paths;
pub mod ports;
pub mod services;
pub mod settings;

#[cfg(test)]
mod test_env;

// Re-export commonly used types for convenience
pub use catalog::{CatalogTrack, album_identity};
pub use download::{
    AlbumDownloadProgress, AlbumDownloadRequest, AlbumFailure, CollectionAlbumGroup,
    DownloadSource, DownloadedAlbumSummary, DownloadedCollectionSummary,
    ManageDownloadsSnapshot, OfflineError, OfflineResult, QueueSnapshot, ReconcileOutcome,
    StreamCachedTrackSummary, TrackProgress,
};
pub use events::OfflineEvent;
pub use manifest::{
    AlbumRecord, CURRENT_SCHEMA_VERSION, CollectionRecord, Manifest, RemovedAlbum, TrackRecord,
    TrackState,
};
pub use paths::{
    PathError, audio_dir, data_root, manifest_path, normalized_file_extension,
    track_relative_path,
};
pub use ports::{
    ByteStorePort, Clock, DownloadedPayload, LocalPlaybackIndexPort, ManifestStorePort,
    ManualNetworkMonitor, NetworkMonitorPort, NoopOfflineEmitter, OfflineEventEmitterPort,
    ProgressReporter, ProgressUpdate, SourceError, StoreError, SystemClock, TrackDownloaderPort,
    TrackFetcherPort,
};
pub use services::{LocalPlaybackIndex, discard_legacy_audio};
pub use settings::{
    DEFAULT_MAX_STORAGE_BYTES, DEFAULT_OPPORTUNISTIC_LIMIT, OfflineSettings, SettingsError,
    validate_settings,
};
