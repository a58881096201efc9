//! Shared fixtures for coordinator integration tests.
//!
//! Real filesystem stores in a temp directory, a scripted downloader, and a
//! map-backed fetcher.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Semaphore;

use hoard_core::{
    CatalogTrack, Clock, DownloadedPayload, ManualNetworkMonitor, OfflineEvent,
    OfflineEventEmitterPort, ProgressReporter, QueueSnapshot, SourceError, SystemClock,
    TrackDownloaderPort, TrackFetcherPort,
};
use hoard_download::{CoordinatorConfig, CoordinatorDeps, OfflineCoordinator, build_coordinator};
use hoard_store::{FsByteStore, JsonManifestStore};

pub const WAIT: Duration = Duration::from_secs(5);

/// Fetcher backed by a map from catalog album key to its tracks.
#[derive(Default)]
pub struct MapFetcher {
    albums: Mutex<HashMap<String, Vec<CatalogTrack>>>,
}

impl MapFetcher {
    pub fn with_album(self, album_key: &str, tracks: Vec<CatalogTrack>) -> Self {
        self.albums
            .lock()
            .unwrap()
            .insert(album_key.to_string(), tracks);
        self
    }
}

#[async_trait]
impl TrackFetcherPort for MapFetcher {
    async fn fetch_tracks(&self, album_rating_keys: &[String]) -> Result<Vec<CatalogTrack>, SourceError> {
        let albums = self.albums.lock().unwrap();
        let mut tracks = Vec::new();
        for key in album_rating_keys {
            let album = albums
                .get(key)
                .ok_or(SourceError::UnexpectedStatus(404))?;
            tracks.extend(album.iter().cloned());
        }
        Ok(tracks)
    }
}

/// Clock that only moves when told to.
pub struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// How the scripted downloader answers for one track.
#[derive(Clone)]
pub enum Script {
    /// Deliver `len` bytes, announcing `expected`.
    Bytes { len: usize, expected: Option<u64> },
    Fail(SourceError),
}

/// Downloader that answers from a script and records every call.
///
/// Tracks listed in `held` report half their bytes, then block until
/// [`ScriptedDownloader::release`]. With a clock attached, the clock steps
/// forward before every progress report.
pub struct ScriptedDownloader {
    scripts: Mutex<HashMap<String, Script>>,
    default_len: usize,
    calls: Mutex<Vec<String>>,
    held: Mutex<Vec<String>>,
    gate: Semaphore,
    started: tokio::sync::Notify,
    clock: Option<(Arc<SteppingClock>, chrono::Duration)>,
}

impl ScriptedDownloader {
    pub fn new(default_len: usize) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            default_len,
            calls: Mutex::new(Vec::new()),
            held: Mutex::new(Vec::new()),
            gate: Semaphore::new(0),
            started: tokio::sync::Notify::new(),
            clock: None,
        }
    }

    /// Step `clock` by `step` before each progress report.
    pub fn stepping(mut self, clock: Arc<SteppingClock>, step: chrono::Duration) -> Self {
        self.clock = Some((clock, step));
        self
    }

    fn report(&self, progress: &ProgressReporter, bytes: u64, expected: Option<u64>) {
        if let Some((clock, step)) = &self.clock {
            clock.advance(*step);
        }
        progress.report(bytes, expected);
    }

    pub fn script(self, track_key: &str, script: Script) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(track_key.to_string(), script);
        self
    }

    pub fn hold(self, track_key: &str) -> Self {
        self.held.lock().unwrap().push(track_key.to_string());
        self
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    /// Wait until a held download has started.
    pub async fn wait_started(&self) {
        tokio::time::timeout(WAIT, self.started.notified())
            .await
            .expect("held download never started");
    }

    fn is_held(&self, track_key: &str) -> bool {
        self.held.lock().unwrap().iter().any(|k| k == track_key)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, track_key: &str) -> usize {
        self.calls().iter().filter(|k| *k == track_key).count()
    }
}

#[async_trait]
impl TrackDownloaderPort for ScriptedDownloader {
    async fn download(
        &self,
        track_key: &str,
        _part_key: &str,
        progress: &ProgressReporter,
    ) -> Result<DownloadedPayload, SourceError> {
        self.calls.lock().unwrap().push(track_key.to_string());

        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(track_key)
            .cloned()
            .unwrap_or(Script::Bytes {
                len: self.default_len,
                expected: Some(self.default_len as u64),
            });

        match script {
            Script::Bytes { len, expected } => {
                self.report(progress, len as u64 / 2, expected);
                if self.is_held(track_key) {
                    self.started.notify_one();
                    self.gate.acquire().await.unwrap().forget();
                }
                self.report(progress, len as u64, expected);
                let mut payload = DownloadedPayload::new(vec![7; len]).with_extension("flac");
                if let Some(expected) = expected {
                    payload = payload.with_expected_bytes(expected);
                }
                Ok(payload)
            }
            Script::Fail(err) => {
                if self.is_held(track_key) {
                    self.started.notify_one();
                    self.gate.acquire().await.unwrap().forget();
                }
                Err(err)
            }
        }
    }
}

/// Emitter that keeps every event.
#[derive(Default)]
pub struct RecordingEmitter {
    events: Mutex<Vec<OfflineEvent>>,
}

impl RecordingEmitter {
    pub fn events(&self) -> Vec<OfflineEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl OfflineEventEmitterPort for RecordingEmitter {
    fn emit(&self, event: OfflineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn track(key: &str, album: &str, index: u32) -> CatalogTrack {
    CatalogTrack::new(key, format!("Track {key}"))
        .with_album(album)
        .with_position(1, index)
        .with_part_key(format!("/library/parts/{key}/file.flac"))
}

pub struct Harness {
    pub dir: tempfile::TempDir,
    pub coordinator: Arc<OfflineCoordinator>,
    pub downloader: Arc<ScriptedDownloader>,
    pub network: Arc<ManualNetworkMonitor>,
    pub events: Arc<RecordingEmitter>,
    pub manifests: Arc<JsonManifestStore>,
    pub bytes: Arc<FsByteStore>,
}

impl Harness {
    pub async fn wait_idle(&self) {
        tokio::time::timeout(WAIT, self.coordinator.wait_until_idle())
            .await
            .expect("coordinator did not go idle");
    }

    /// Poll the queue snapshot until `ready` holds.
    pub async fn wait_for_snapshot(&self, ready: impl Fn(&QueueSnapshot) -> bool) -> QueueSnapshot {
        tokio::time::timeout(WAIT, async {
            loop {
                let snapshot = self.coordinator.snapshot().await;
                if ready(&snapshot) {
                    return snapshot;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("snapshot never reached the expected state")
    }
}

pub struct HarnessBuilder {
    fetcher: Arc<dyn TrackFetcherPort>,
    downloader: ScriptedDownloader,
    max_storage_bytes: u64,
    unmetered: bool,
    dir: Option<tempfile::TempDir>,
    clock: Arc<dyn Clock>,
}

impl HarnessBuilder {
    pub fn new(fetcher: impl TrackFetcherPort + 'static) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            downloader: ScriptedDownloader::new(100),
            max_storage_bytes: u64::MAX,
            unmetered: true,
            dir: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn downloader(mut self, downloader: ScriptedDownloader) -> Self {
        self.downloader = downloader;
        self
    }

    pub fn budget(mut self, max_storage_bytes: u64) -> Self {
        self.max_storage_bytes = max_storage_bytes;
        self
    }

    pub fn metered(mut self) -> Self {
        self.unmetered = false;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Reuse a data directory from an earlier harness.
    pub fn in_dir(mut self, dir: tempfile::TempDir) -> Self {
        self.dir = Some(dir);
        self
    }

    pub async fn build(self) -> Harness {
        let dir = self.dir.unwrap_or_else(|| tempfile::tempdir().unwrap());
        let manifests = Arc::new(JsonManifestStore::in_data_root(dir.path()));
        let bytes = Arc::new(FsByteStore::in_data_root(dir.path()));
        let downloader = Arc::new(self.downloader);
        let network = Arc::new(ManualNetworkMonitor::new(self.unmetered));
        let events = Arc::new(RecordingEmitter::default());

        let coordinator = build_coordinator(CoordinatorDeps {
            fetcher: self.fetcher,
            downloader: downloader.clone(),
            byte_store: bytes.clone(),
            manifest_store: manifests.clone(),
            network: network.clone(),
            emitter: events.clone(),
            clock: self.clock,
            config: CoordinatorConfig {
                max_storage_bytes: self.max_storage_bytes,
                opportunistic_limit: 5,
            },
        })
        .await;

        Harness {
            dir,
            coordinator,
            downloader,
            network,
            events,
            manifests,
            bytes,
        }
    }
}
