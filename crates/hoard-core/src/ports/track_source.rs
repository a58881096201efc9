//! Track source ports: catalog listing and byte download.
//!
//! The downloader reports progress through a [`ProgressReporter`], a thin
//! wrapper over a `tokio::sync::watch` sender. The coordinator owns the
//! receiving end and applies updates under its own lock, so the downloader
//! never touches coordinator state.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::watch;

use super::SourceError;
use crate::catalog::CatalogTrack;

/// A single progress report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub bytes_received: u64,
    pub expected_bytes: Option<u64>,
    /// Increases with every report, starting at 1.
    pub seq: u64,
}

/// Write half of a progress channel handed to the downloader.
#[derive(Debug)]
pub struct ProgressReporter {
    tx: watch::Sender<ProgressUpdate>,
    seq: AtomicU64,
}

impl ProgressReporter {
    /// Create a reporter and the receiver that observes it.
    pub fn channel() -> (Self, watch::Receiver<ProgressUpdate>) {
        let (tx, rx) = watch::channel(ProgressUpdate::default());
        (
            Self {
                tx,
                seq: AtomicU64::new(0),
            },
            rx,
        )
    }

    /// Report bytes received so far.
    pub fn report(&self, bytes_received: u64, expected_bytes: Option<u64>) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        // No receiver means nobody is watching; the download still proceeds.
        let _ = self.tx.send(ProgressUpdate {
            bytes_received,
            expected_bytes,
            seq,
        });
    }

    /// A reporter nobody listens to.
    pub fn detached() -> Self {
        Self::channel().0
    }
}

/// Bytes returned by a successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedPayload {
    pub data: Vec<u8>,
    /// Size announced by the server, if any.
    pub expected_bytes: Option<u64>,
    /// Extension derived from the response, without a leading dot.
    pub suggested_extension: Option<String>,
}

impl DownloadedPayload {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            expected_bytes: None,
            suggested_extension: None,
        }
    }

    #[must_use]
    pub const fn with_expected_bytes(mut self, expected_bytes: u64) -> Self {
        self.expected_bytes = Some(expected_bytes);
        self
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.suggested_extension = Some(extension.into());
        self
    }

    /// Number of bytes actually received.
    pub fn actual_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Resolves the tracks of one or more catalog albums.
#[async_trait]
pub trait TrackFetcherPort: Send + Sync {
    /// Fetch the merged track list for the given catalog albums.
    ///
    /// Implementations de-duplicate by rating key and return album order
    /// (see [`CatalogTrack::merge_sorted`]).
    async fn fetch_tracks(&self, album_rating_keys: &[String])
    -> Result<Vec<CatalogTrack>, SourceError>;
}

/// Downloads the bytes of one track.
///
/// Timeouts and retries are the implementation's concern; the coordinator
/// treats any error as a terminal failure for that track.
#[async_trait]
pub trait TrackDownloaderPort: Send + Sync {
    async fn download(
        &self,
        track_key: &str,
        part_key: &str,
        progress: &ProgressReporter,
    ) -> Result<DownloadedPayload, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_sequences_updates() {
        let (reporter, rx) = ProgressReporter::channel();
        reporter.report(10, Some(100));
        reporter.report(20, Some(100));

        let latest = *rx.borrow();
        assert_eq!(latest.bytes_received, 20);
        assert_eq!(latest.expected_bytes, Some(100));
        assert_eq!(latest.seq, 2);
    }

    #[test]
    fn test_detached_reporter_does_not_panic() {
        let reporter = ProgressReporter::detached();
        reporter.report(1, None);
    }

    #[test]
    fn test_payload_actual_bytes() {
        let payload = DownloadedPayload::new(vec![0; 900]).with_expected_bytes(1000);
        assert_eq!(payload.actual_bytes(), 900);
        assert_eq!(payload.expected_bytes, Some(1000));
    }
}
