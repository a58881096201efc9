//! Offline download coordinator for hoard.
//!
//! This crate owns the download queue and the manifest at runtime:
//!
//! - `coordinator` - the single-writer coordinator, its runner and worker
//! - `queue` - the pending FIFO state machine
//! - `progress` - throughput and ETA estimation
//!
//! Adapters (filesystem stores, HTTP downloader) live in their own crates
//! and are injected through the ports defined in `hoard-core`.

// Re-export core types for convenience
pub use hoard_core::download::{
    AlbumDownloadProgress, AlbumDownloadRequest, AlbumFailure, CollectionAlbumGroup,
    DownloadSource, ManageDownloadsSnapshot, OfflineError, OfflineResult, QueueSnapshot,
    ReconcileOutcome, TrackProgress,
};
pub use hoard_core::events::OfflineEvent;

// Internal modules (pub(crate) to keep implementation private)
pub(crate) mod progress;
pub(crate) mod queue;

mod coordinator;

pub use coordinator::{
    CoordinatorConfig, CoordinatorDeps, OfflineCoordinator, QuotaReport, StoredTrack, TrackJob,
    WorkerDeps, build_coordinator, enforce_budget, run_track_job, verify_payload,
};
pub use progress::{ProgressSample, estimated_remaining_seconds, throughput};
pub use queue::{PendingQueue, PendingTrackRequest};
