//! Download domain types and errors.
//!
//! Pure data types for the offline download subsystem. No I/O, networking,
//! or runtime dependencies allowed.
//!
//! # Structure
//!
//! - `source` - Why a track or album is being downloaded (`DownloadSource`)
//! - `errors` - Error types for download operations
//! - `progress` - Live progress DTOs (`TrackProgress`, `QueueSnapshot`, `AlbumDownloadProgress`)
//! - `summary` - Requests and the manage-downloads view

pub mod errors;
pub mod progress;
pub mod source;
pub mod summary;

pub use errors::{OfflineError, OfflineResult};
pub use progress::{AlbumDownloadProgress, QueueSnapshot, TrackProgress};
pub use source::DownloadSource;
pub use summary::{
    AlbumDownloadRequest, AlbumFailure, CollectionAlbumGroup, DownloadedAlbumSummary,
    DownloadedCollectionSummary, ManageDownloadsSnapshot, ReconcileOutcome,
    StreamCachedTrackSummary,
};
