//! Track download pipeline.
//!
//! The worker operates on a value-type job and cloned Arc dependencies, with
//! no access to coordinator state. It reports progress through the
//! `ProgressReporter` only and never emits events.

use std::sync::Arc;

use hoard_core::{
    ByteStorePort, DownloadedPayload, OfflineError, OfflineResult, ProgressReporter,
    TrackDownloaderPort,
};

/// Dependencies for the track worker.
#[derive(Clone)]
pub struct WorkerDeps {
    pub downloader: Arc<dyn TrackDownloaderPort>,
    pub byte_store: Arc<dyn ByteStorePort>,
}

/// A track download to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackJob {
    pub track_key: String,
    pub part_key: String,
}

/// A verified payload written to the byte store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTrack {
    pub relative_path: String,
    pub expected_bytes: Option<u64>,
    pub actual_bytes: u64,
}

/// Run one track download: fetch, verify, derive the path, write.
///
/// A failed write removes whatever was left at the destination.
pub async fn run_track_job(
    job: &TrackJob,
    deps: &WorkerDeps,
    progress: &ProgressReporter,
) -> OfflineResult<StoredTrack> {
    let payload = deps
        .downloader
        .download(&job.track_key, &job.part_key, progress)
        .await?;
    verify_payload(&job.track_key, &payload)?;

    let relative_path = deps.byte_store.relative_path_for(
        &job.track_key,
        &job.part_key,
        payload.suggested_extension.as_deref(),
    );

    if let Err(e) = deps.byte_store.write(&payload.data, &relative_path).await {
        if let Err(cleanup) = deps.byte_store.remove(&relative_path).await {
            tracing::warn!(
                target: "hoard.download",
                track = %job.track_key,
                error = %cleanup,
                "Failed to remove partial file"
            );
        }
        return Err(e.into());
    }

    Ok(StoredTrack {
        relative_path,
        expected_bytes: payload.expected_bytes,
        actual_bytes: payload.actual_bytes(),
    })
}

/// Reject empty payloads and payloads whose size disagrees with the
/// reported content length.
pub fn verify_payload(track_key: &str, payload: &DownloadedPayload) -> OfflineResult<()> {
    let actual = payload.actual_bytes();
    let size_mismatch = payload
        .expected_bytes
        .is_some_and(|expected| expected > 0 && expected != actual);

    if actual == 0 || size_mismatch {
        return Err(OfflineError::incomplete(
            track_key,
            payload.expected_bytes,
            actual,
        ));
    }
    Ok(())
}
