//! Offline download coordinator.
//!
//! The coordinator is the only writer of the manifest, the pending queue and
//! the in-progress map. All three live in one [`CoordinatorState`] behind a
//! `tokio::sync::Mutex`, so public operations and the runner are linearized.
//!
//! # Architecture
//!
//! - **Coordinator**: admission, ownership edits, snapshots
//! - **Runner**: long-lived task that pops one track at a time (FIFO)
//! - **Worker**: downloads, verifies and writes one track; reports progress
//!   only through its `ProgressReporter`
//! - **Network watcher**: wakes the runner when the unmetered gate reopens
//!
//! # Concurrency Model
//!
//! - The state lock is never held across a catalog fetch or a byte download
//! - It is held across manifest persistence and file deletion
//! - Both background tasks hold a `Weak` handle and stop when the
//!   coordinator is dropped
//! - `Notify` for wake-on-work, a `watch` revision counter for observers

mod quota;
mod state;
mod worker;

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, Notify, watch};
use tokio_util::sync::CancellationToken;

use hoard_core::{
    AlbumDownloadProgress, AlbumDownloadRequest, AlbumFailure, ByteStorePort, CatalogTrack, Clock,
    CollectionAlbumGroup, CollectionRecord, DownloadSource, ManageDownloadsSnapshot, Manifest,
    ManifestStorePort, NetworkMonitorPort, OfflineError, OfflineEvent, OfflineEventEmitterPort,
    OfflineResult, OfflineSettings, ProgressReporter, ProgressUpdate, QueueSnapshot,
    ReconcileOutcome, RemovedAlbum, StoreError, TrackDownloaderPort, TrackFetcherPort,
    TrackRecord, discard_legacy_audio,
};

use crate::progress::{ProgressSample, estimated_remaining_seconds, throughput};
use crate::queue::PendingTrackRequest;

use state::CoordinatorState;

pub use quota::{QuotaReport, enforce_budget};
pub use worker::{StoredTrack, TrackJob, WorkerDeps, run_track_job, verify_payload};

/// Coordinator limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub max_storage_bytes: u64,
    pub opportunistic_limit: usize,
}

impl CoordinatorConfig {
    pub const fn from_settings(settings: &OfflineSettings) -> Self {
        Self {
            max_storage_bytes: settings.effective_max_storage_bytes(),
            opportunistic_limit: settings.effective_opportunistic_limit(),
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::from_settings(&OfflineSettings::with_defaults())
    }
}

/// Dependencies for building the coordinator.
pub struct CoordinatorDeps {
    pub fetcher: Arc<dyn TrackFetcherPort>,
    pub downloader: Arc<dyn TrackDownloaderPort>,
    pub byte_store: Arc<dyn ByteStorePort>,
    pub manifest_store: Arc<dyn ManifestStorePort>,
    pub network: Arc<dyn NetworkMonitorPort>,
    pub emitter: Arc<dyn OfflineEventEmitterPort>,
    pub clock: Arc<dyn Clock>,
    pub config: CoordinatorConfig,
}

/// Build a coordinator and start its runner and network watcher.
///
/// Legacy `.audio` content is discarded first. An unreadable or missing
/// manifest starts the coordinator empty.
pub async fn build_coordinator(deps: CoordinatorDeps) -> Arc<OfflineCoordinator> {
    match discard_legacy_audio(deps.manifest_store.as_ref(), deps.byte_store.as_ref()).await {
        Ok(true) => tracing::info!(target: "hoard.download", "Discarded legacy offline content"),
        Ok(false) => {}
        Err(e) => {
            tracing::warn!(target: "hoard.download", error = %e, "Legacy content check failed");
        }
    }

    let manifest = match deps.manifest_store.load().await {
        Ok(manifest) => manifest.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(target: "hoard.download", error = %e, "Starting with an empty manifest");
            Manifest::new()
        }
    };

    let coordinator = Arc::new(OfflineCoordinator::new(deps, manifest));
    coordinator.spawn_runner();
    coordinator.spawn_network_watcher();
    coordinator
}

/// Offline download coordinator.
pub struct OfflineCoordinator {
    state: Mutex<CoordinatorState>,
    worker: WorkerDeps,
    fetcher: Arc<dyn TrackFetcherPort>,
    manifest_store: Arc<dyn ManifestStorePort>,
    network: Arc<dyn NetworkMonitorPort>,
    emitter: Arc<dyn OfflineEventEmitterPort>,
    clock: Arc<dyn Clock>,
    config: CoordinatorConfig,
    queue_notify: Arc<Notify>,
    changes: watch::Sender<u64>,
    shutdown: CancellationToken,
}

impl OfflineCoordinator {
    fn new(deps: CoordinatorDeps, manifest: Manifest) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            state: Mutex::new(CoordinatorState::new(manifest)),
            worker: WorkerDeps {
                downloader: deps.downloader,
                byte_store: deps.byte_store,
            },
            fetcher: deps.fetcher,
            manifest_store: deps.manifest_store,
            network: deps.network,
            emitter: deps.emitter,
            clock: deps.clock,
            config: deps.config,
            queue_notify: Arc::new(Notify::new()),
            changes,
            shutdown: CancellationToken::new(),
        }
    }

    pub const fn config(&self) -> CoordinatorConfig {
        self.config
    }

    // =========================================================================
    // Admission
    // =========================================================================

    /// Queue every downloadable track of an album.
    ///
    /// Fails with `InsufficientStorageNonEvictable` before touching the
    /// album if the budget cannot be met. Tracks without a part key are
    /// recorded as failed; that is not an error for the caller.
    pub async fn enqueue_album_download(&self, request: AlbumDownloadRequest) -> OfflineResult<()> {
        {
            let mut state = self.state.lock().await;
            self.ensure_capacity(&mut state).await?;
        }

        let tracks = self
            .fetcher
            .fetch_tracks(&request.source_album_rating_keys)
            .await?;
        let tracks = CatalogTrack::merge_sorted(tracks);

        let mut state = self.state.lock().await;
        if !request.source.is_opportunistic() {
            state
                .manifest
                .upsert_album(&request, tracks.iter().map(|t| t.rating_key.as_str()));
        }

        let mut queued = 0usize;
        for track in &tracks {
            let pending = PendingTrackRequest::from_catalog(
                track,
                Some(&request.album_identity),
                request.artist_name.as_deref(),
                request.source.clone(),
            );
            match pending {
                Some(pending) => {
                    if state.enqueue_if_needed(pending) {
                        queued += 1;
                    }
                }
                None => self.reject_unplayable(&mut state, track, &request).await,
            }
        }
        let saved = self.persist(&state.manifest).await;
        drop(state);

        // Queued tracks run even if the save failed; the runner saves again.
        self.notify_changed();
        self.kick();
        saved?;

        tracing::info!(
            target: "hoard.download",
            album = %request.album_identity,
            source = %request.source,
            tracks = tracks.len(),
            queued,
            "Album queued for download"
        );
        Ok(())
    }

    /// Record a track without a part key as failed, unless it is already
    /// stored or queued.
    async fn reject_unplayable(
        &self,
        state: &mut CoordinatorState,
        track: &CatalogTrack,
        request: &AlbumDownloadRequest,
    ) {
        let key = track.rating_key.as_str();
        let handled = state.queue.contains(key)
            || state.in_progress.contains_key(key)
            || state.manifest.tracks.get(key).is_some_and(TrackRecord::is_completed);
        if handled {
            return;
        }

        let template = TrackRecord::pending(key, None)
            .with_display(
                Some(track.title.clone()),
                track.artist_name.clone().or_else(|| request.artist_name.clone()),
            )
            .opportunistic(request.source.is_opportunistic());
        self.record_failure(state, template, &OfflineError::missing_part_key(key))
            .await;
    }

    /// Cache the current and upcoming tracks while on an unmetered network.
    ///
    /// At most `limit + 1` tracks are considered; `None` uses the configured
    /// limit. Returns how many tracks were newly queued.
    pub async fn enqueue_opportunistic(
        &self,
        current: &CatalogTrack,
        upcoming: &[CatalogTrack],
        limit: Option<usize>,
    ) -> usize {
        if !self.network.is_unmetered() {
            tracing::debug!(target: "hoard.download", "Skipping look-ahead caching on a metered network");
            return 0;
        }
        let limit = limit.unwrap_or(self.config.opportunistic_limit);

        let mut state = self.state.lock().await;
        let mut queued = 0usize;
        for track in std::iter::once(current)
            .chain(upcoming)
            .take(limit.saturating_add(1))
        {
            let Some(request) = PendingTrackRequest::from_catalog(
                track,
                track.album_rating_key.as_deref(),
                None,
                DownloadSource::Opportunistic,
            ) else {
                continue;
            };
            if state.enqueue_if_needed(request) {
                queued += 1;
            }
        }
        if queued == 0 {
            return 0;
        }

        self.persist_logged(&state.manifest).await;
        drop(state);

        tracing::debug!(target: "hoard.download", queued, "Queued look-ahead tracks");
        self.notify_changed();
        self.kick();
        queued
    }

    // =========================================================================
    // Ownership / removal
    // =========================================================================

    /// Store a collection record without enqueueing anything.
    ///
    /// Identities are sorted and de-duplicated. Albums the previous record
    /// owned but this one does not lose the collection's ownership edge.
    pub async fn upsert_collection_record(
        &self,
        collection_key: &str,
        title: &str,
        album_identities: Vec<String>,
    ) -> OfflineResult<()> {
        let identities: BTreeSet<String> = album_identities.into_iter().collect();
        let record = CollectionRecord {
            collection_key: collection_key.to_string(),
            title: title.to_string(),
            album_identities: identities.into_iter().collect(),
            last_reconciled_at: Some(self.clock.now()),
        };

        let mut state = self.state.lock().await;
        let removed = state.manifest.replace_collection(record);
        self.discard_removed(&mut state, &removed).await;
        self.persist(&state.manifest).await?;
        drop(state);

        self.notify_changed();
        Ok(())
    }

    /// Make a collection's downloads match `groups`.
    ///
    /// Albums no longer listed lose this collection's edge (and are deleted
    /// if nothing else owns them), then every listed album is enqueued.
    /// Per-album failures are collected rather than aborting the rest.
    pub async fn reconcile_collection_download(
        &self,
        collection_key: &str,
        title: &str,
        groups: Vec<CollectionAlbumGroup>,
    ) -> OfflineResult<ReconcileOutcome> {
        let groups = CollectionAlbumGroup::dedupe(groups);
        let record = CollectionRecord {
            collection_key: collection_key.to_string(),
            title: title.to_string(),
            album_identities: groups.iter().map(|g| g.album_identity.clone()).collect(),
            last_reconciled_at: Some(self.clock.now()),
        };

        {
            let mut state = self.state.lock().await;
            let removed = state.manifest.replace_collection(record);
            self.discard_removed(&mut state, &removed).await;
            self.persist(&state.manifest).await?;
        }
        self.notify_changed();

        let mut outcome = ReconcileOutcome::default();
        for group in groups {
            let album_identity = group.album_identity.clone();
            match self
                .enqueue_album_download(group.into_request(collection_key))
                .await
            {
                Ok(()) => outcome.enqueued.push(album_identity),
                Err(error) => {
                    tracing::warn!(
                        target: "hoard.download",
                        collection = %collection_key,
                        album = %album_identity,
                        error = %error,
                        "Failed to enqueue collection album"
                    );
                    outcome.failures.push(AlbumFailure {
                        album_identity,
                        error,
                    });
                }
            }
        }

        tracing::info!(
            target: "hoard.download",
            collection = %collection_key,
            enqueued = outcome.enqueued.len(),
            failed = outcome.failures.len(),
            "Collection reconciled"
        );
        Ok(outcome)
    }

    /// Cancel a track.
    ///
    /// A pending track fails immediately. A downloading track fails when its
    /// download returns, whatever the result.
    pub async fn cancel_track_download(&self, track_key: &str) -> OfflineResult<()> {
        let mut state = self.state.lock().await;

        if let Some(request) = state.queue.remove(track_key) {
            state.samples.remove(track_key);
            self.record_failure(
                &mut state,
                request.pending_record(),
                &OfflineError::cancelled(track_key),
            )
            .await;
            self.persist(&state.manifest).await?;
            drop(state);
            self.notify_changed();
        } else if state.in_progress.contains_key(track_key) {
            state.canceled.insert(track_key.to_string());
            tracing::info!(target: "hoard.download", track = %track_key, "Cancellation requested");
        } else {
            tracing::debug!(target: "hoard.download", track = %track_key, "Nothing to cancel");
        }
        Ok(())
    }

    /// Drop the explicit request for an album, deleting it if no collection
    /// still owns it.
    pub async fn remove_album_download(&self, album_identity: &str) -> OfflineResult<()> {
        let mut state = self.state.lock().await;
        if !state.manifest.albums.contains_key(album_identity) {
            return Ok(());
        }

        let removed: Vec<RemovedAlbum> = state
            .manifest
            .clear_explicit(album_identity)
            .into_iter()
            .collect();
        self.discard_removed(&mut state, &removed).await;
        self.persist(&state.manifest).await?;
        drop(state);

        self.notify_changed();
        Ok(())
    }

    /// Delete a collection and cascade into the albums it owned.
    pub async fn remove_collection_download(&self, collection_key: &str) -> OfflineResult<()> {
        let mut state = self.state.lock().await;
        if !state.manifest.collections.contains_key(collection_key) {
            return Ok(());
        }

        let removed = state.manifest.remove_collection(collection_key);
        self.discard_removed(&mut state, &removed).await;
        self.persist(&state.manifest).await?;
        drop(state);

        tracing::info!(target: "hoard.download", collection = %collection_key, "Collection removed");
        self.notify_changed();
        Ok(())
    }

    /// Delete every stored file and forget all offline state.
    pub async fn purge_all(&self) -> OfflineResult<()> {
        let mut state = self.state.lock().await;
        self.worker.byte_store.remove_all().await?;
        state.reset();
        self.manifest_store.clear().await?;
        drop(state);

        tracing::info!(target: "hoard.download", "Purged all offline content");
        self.emitter.emit(OfflineEvent::Purged);
        self.notify_changed();
        Ok(())
    }

    /// React to the unmetered gate opening or closing.
    pub fn handle_network_change(&self, unmetered: bool) {
        tracing::debug!(target: "hoard.download", unmetered, "Network class changed");
        self.notify_changed();
        if unmetered {
            self.kick();
        }
    }

    /// Stamp a play time on a track through the coordinator's own manifest.
    ///
    /// While a coordinator runs, plays must go through here: its next save
    /// would otherwise overwrite a timestamp written straight to the store.
    /// Returns `false` for a track with no record.
    pub async fn mark_played(&self, track_key: &str, at: DateTime<Utc>) -> OfflineResult<bool> {
        let mut state = self.state.lock().await;
        let Some(record) = state.manifest.tracks.get_mut(track_key) else {
            return Ok(false);
        };
        record.last_played_at = Some(at);
        self.persist(&state.manifest).await?;
        drop(state);

        tracing::debug!(target: "hoard.download", track = %track_key, "Recorded play");
        Ok(true)
    }

    // =========================================================================
    // Read side
    // =========================================================================

    pub async fn snapshot(&self) -> QueueSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn album_download_progress(&self, album_identity: &str) -> Option<AlbumDownloadProgress> {
        let state = self.state.lock().await;
        AlbumDownloadProgress::compute(&state.manifest, &state.snapshot(), album_identity)
    }

    pub async fn manage_downloads_snapshot(&self) -> ManageDownloadsSnapshot {
        let state = self.state.lock().await;
        ManageDownloadsSnapshot::from_manifest(&state.manifest, state.snapshot())
    }

    /// Sorted keys of every collection record.
    pub async fn downloaded_collection_keys(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state.manifest.collections.keys().cloned().collect()
    }

    pub async fn completed_file_count(&self) -> usize {
        self.state.lock().await.manifest.completed_file_count()
    }

    /// A copy of the in-memory manifest.
    pub async fn manifest(&self) -> Manifest {
        self.state.lock().await.manifest.clone()
    }

    /// Revision counter bumped with every `DownloadsChanged` event.
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Resolve once no queued work can make progress: the queue is empty or
    /// the gate is closed, and no track is mid-download.
    pub async fn wait_until_idle(&self) {
        let mut changes = self.changes.subscribe();
        loop {
            let idle = {
                let state = self.state.lock().await;
                state.is_idle(self.network.is_unmetered())
            };
            if idle || changes.changed().await.is_err() {
                return;
            }
        }
    }

    // =========================================================================
    // Runner
    // =========================================================================

    fn spawn_runner(self: &Arc<Self>) {
        let coordinator = Arc::downgrade(self);
        let queue_notify = Arc::clone(&self.queue_notify);
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            loop {
                let Some(this) = coordinator.upgrade() else {
                    break;
                };
                let processed = this.process_next().await;
                drop(this);
                if processed {
                    continue;
                }

                tokio::select! {
                    () = shutdown.cancelled() => break,
                    () = queue_notify.notified() => {}
                }
            }
            tracing::debug!(target: "hoard.download", "Download runner stopped");
        });
    }

    fn spawn_network_watcher(self: &Arc<Self>) {
        let coordinator = Arc::downgrade(self);
        let mut gate = self.network.subscribe();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    changed = gate.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let unmetered = *gate.borrow_and_update();
                        let Some(this) = coordinator.upgrade() else {
                            break;
                        };
                        this.handle_network_change(unmetered);
                    }
                }
            }
        });
    }

    /// Pop and process the next track. Returns `false` when there is nothing
    /// to do or the gate is closed.
    async fn process_next(&self) -> bool {
        let gate_open = self.network.is_unmetered();
        let mut state = self.state.lock().await;
        let next = if gate_open { state.queue.pop_front() } else { None };

        let Some(request) = next else {
            let was_processing = std::mem::replace(&mut state.processing, false);
            drop(state);
            if was_processing {
                self.notify_changed();
            }
            return false;
        };

        state.processing = true;
        let mut record = request.pending_record();
        record.mark_in_progress();
        state.manifest.put_track(record);
        let progress = hoard_core::TrackProgress::resolve(
            &state.manifest,
            &request.track_key,
            request.title.as_deref(),
            request.album_identity.as_deref(),
        );
        state.in_progress.insert(request.track_key.clone(), progress);
        state.samples.insert(
            request.track_key.clone(),
            ProgressSample::new(0, self.clock.now()),
        );
        self.persist_logged(&state.manifest).await;
        drop(state);

        tracing::debug!(target: "hoard.download", track = %request.track_key, "Track download started");
        self.emitter.emit(OfflineEvent::TrackStarted {
            track_key: request.track_key.clone(),
        });
        self.notify_changed();

        let result = self.download(&request).await;
        self.finish_track(&request, result).await;
        true
    }

    /// Run the worker, applying its progress reports as they arrive.
    async fn download(&self, request: &PendingTrackRequest) -> OfflineResult<StoredTrack> {
        let job = TrackJob {
            track_key: request.track_key.clone(),
            part_key: request.part_key.clone(),
        };
        let (reporter, mut updates) = ProgressReporter::channel();

        let result = {
            let download = run_track_job(&job, &self.worker, &reporter);
            tokio::pin!(download);
            loop {
                tokio::select! {
                    biased;
                    result = &mut download => break result,
                    Ok(()) = updates.changed() => {
                        let update = *updates.borrow_and_update();
                        self.apply_progress(&job.track_key, update).await;
                    }
                }
            }
        };

        if updates.has_changed().unwrap_or(false) {
            let update = *updates.borrow_and_update();
            self.apply_progress(&job.track_key, update).await;
        }
        result
    }

    async fn apply_progress(&self, track_key: &str, update: ProgressUpdate) {
        let now = self.clock.now();
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let Some(progress) = state.in_progress.get_mut(track_key) else {
            return;
        };
        let rate = state
            .samples
            .get(track_key)
            .and_then(|sample| throughput(sample, update.bytes_received, now));
        progress.bytes_received = update.bytes_received;
        progress.expected_bytes = update.expected_bytes;
        progress.bytes_per_second = rate;
        progress.estimated_remaining_seconds =
            estimated_remaining_seconds(update.bytes_received, update.expected_bytes, rate);
        state.samples.insert(
            track_key.to_string(),
            ProgressSample::new(update.bytes_received, now),
        );
        drop(guard);

        self.emitter.emit(OfflineEvent::TrackProgress {
            track_key: track_key.to_string(),
            bytes_received: update.bytes_received,
            expected_bytes: update.expected_bytes,
        });
        self.notify_changed();
    }

    /// Commit a finished download.
    ///
    /// Cancellation wins over success. A track whose record disappeared
    /// while it downloaded (album removed, purge) is discarded without
    /// recreating the record.
    async fn finish_track(&self, request: &PendingTrackRequest, result: OfflineResult<StoredTrack>) {
        let key = request.track_key.as_str();
        let mut state = self.state.lock().await;
        let canceled = state.canceled.remove(key);
        let tracked = state.manifest.tracks.contains_key(key);

        match result {
            Ok(stored) if canceled || !tracked => {
                self.remove_file(&stored.relative_path).await;
                if tracked {
                    self.record_failure(&mut state, request.pending_record(), &OfflineError::cancelled(key))
                        .await;
                } else {
                    tracing::debug!(target: "hoard.download", track = %key, "Discarded download of a removed track");
                }
            }
            Ok(stored) => self.complete_track(&mut state, request, stored).await,
            Err(error) => {
                if tracked {
                    self.record_failure(&mut state, request.pending_record(), &error)
                        .await;
                }
            }
        }

        state.in_progress.remove(key);
        state.samples.remove(key);
        self.persist_logged(&state.manifest).await;
        drop(state);
        self.notify_changed();
    }

    async fn complete_track(
        &self,
        state: &mut CoordinatorState,
        request: &PendingTrackRequest,
        stored: StoredTrack,
    ) {
        let key = request.track_key.as_str();
        if let Some(record) = state.manifest.tracks.get_mut(key) {
            record.mark_completed(
                stored.relative_path,
                stored.expected_bytes,
                stored.actual_bytes,
                self.clock.now(),
            );
        }
        tracing::info!(
            target: "hoard.download",
            track = %key,
            bytes = stored.actual_bytes,
            "Track downloaded"
        );
        self.emitter.emit(OfflineEvent::TrackCompleted {
            track_key: key.to_string(),
            bytes: stored.actual_bytes,
        });

        let report = enforce_budget(&mut state.manifest, self.config.max_storage_bytes);
        self.apply_eviction(state, &report).await;
        if let Err(error) = report.check() {
            if state.manifest.tracks.contains_key(key) {
                self.record_failure(state, request.pending_record(), &error)
                    .await;
            }
        }
    }

    // =========================================================================
    // Shared helpers (state lock held by the caller)
    // =========================================================================

    /// Re-sync from the manifest store, then enforce the budget.
    async fn ensure_capacity(&self, state: &mut CoordinatorState) -> OfflineResult<()> {
        match self.manifest_store.load().await {
            Ok(Some(manifest)) => state.manifest = manifest,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(target: "hoard.download", error = %e, "Could not re-read manifest");
            }
        }

        let report = enforce_budget(&mut state.manifest, self.config.max_storage_bytes);
        if !report.evicted.is_empty() {
            self.apply_eviction(state, &report).await;
            self.persist(&state.manifest).await?;
            self.notify_changed();
        }
        report.check()
    }

    async fn apply_eviction(&self, state: &mut CoordinatorState, report: &QuotaReport) {
        if report.evicted.is_empty() {
            return;
        }
        for track_key in &report.evicted {
            state.forget_track(track_key);
            self.emitter.emit(OfflineEvent::TrackEvicted {
                track_key: track_key.clone(),
            });
        }
        for path in &report.file_paths {
            self.remove_file(path).await;
        }
        tracing::info!(
            target: "hoard.download",
            evicted = report.evicted.len(),
            used_bytes = report.used_bytes,
            budget_bytes = report.budget_bytes,
            "Evicted tracks to fit the storage budget"
        );
    }

    async fn discard_removed(&self, state: &mut CoordinatorState, removed: &[RemovedAlbum]) {
        for album in removed {
            tracing::info!(
                target: "hoard.download",
                album = %album.album_identity,
                tracks = album.track_keys.len(),
                "Album removed"
            );
        }
        for path in state.absorb_removed(removed) {
            self.remove_file(&path).await;
        }
    }

    async fn record_failure(
        &self,
        state: &mut CoordinatorState,
        template: TrackRecord,
        error: &OfflineError,
    ) {
        let track_key = template.track_key.clone();
        if let Some(stale) = state.manifest.fail_track(template) {
            self.remove_file(&stale).await;
        }
        tracing::warn!(target: "hoard.download", track = %track_key, error = %error, "Track download failed");
        self.emitter.emit(OfflineEvent::TrackFailed {
            track_key,
            error: error.user_message(),
        });
    }

    async fn remove_file(&self, relative_path: &str) {
        if let Err(e) = self.worker.byte_store.remove(relative_path).await {
            tracing::warn!(target: "hoard.download", path = %relative_path, error = %e, "Failed to remove file");
        }
    }

    async fn persist(&self, manifest: &Manifest) -> Result<(), StoreError> {
        self.manifest_store.save(manifest).await
    }

    async fn persist_logged(&self, manifest: &Manifest) {
        if let Err(e) = self.persist(manifest).await {
            tracing::warn!(target: "hoard.download", error = %e, "Failed to persist manifest");
        }
    }

    fn notify_changed(&self) {
        let mut revision = 0;
        self.changes.send_modify(|current| {
            *current += 1;
            revision = *current;
        });
        self.emitter.emit(OfflineEvent::DownloadsChanged { revision });
    }

    fn kick(&self) {
        self.queue_notify.notify_one();
    }
}

impl Drop for OfflineCoordinator {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
