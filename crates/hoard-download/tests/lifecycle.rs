//! Network gate, ownership edits, purge and look-ahead caching.

mod common;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mockall::mock;

use hoard_core::{
    AlbumDownloadRequest, ByteStorePort, CatalogTrack, CollectionAlbumGroup, DownloadSource,
    ManifestStorePort, OfflineError, OfflineEvent, SourceError, TrackFetcherPort, TrackState,
};

use common::{HarnessBuilder, MapFetcher, ScriptedDownloader, WAIT, track};

mock! {
    pub Fetcher {}

    #[async_trait]
    impl TrackFetcherPort for Fetcher {
        async fn fetch_tracks(&self, album_rating_keys: &[String]) -> Result<Vec<CatalogTrack>, SourceError>;
    }
}

fn two_albums() -> MapFetcher {
    MapFetcher::default()
        .with_album("r1", vec![track("a1", "r1", 1), track("a2", "r1", 2)])
        .with_album("r2", vec![track("b1", "r2", 1)])
}

#[tokio::test]
async fn test_metered_network_holds_the_queue() {
    let h = HarnessBuilder::new(two_albums()).metered().build().await;

    h.coordinator
        .enqueue_album_download(AlbumDownloadRequest::new("a", "A", vec!["r1".into()]))
        .await
        .unwrap();
    h.wait_idle().await;
    assert!(h.downloader.calls().is_empty());
    assert_eq!(h.coordinator.snapshot().await.pending_count(), 2);

    h.network.set_unmetered(true);
    h.wait_idle().await;
    assert_eq!(h.downloader.calls(), ["a1", "a2"]);
    assert_eq!(h.coordinator.completed_file_count().await, 2);
}

#[tokio::test]
async fn test_gate_closing_mid_download_finishes_current_track() {
    let downloader = ScriptedDownloader::new(100).hold("a1");
    let h = HarnessBuilder::new(two_albums())
        .downloader(downloader)
        .build()
        .await;

    h.coordinator
        .enqueue_album_download(AlbumDownloadRequest::new("a", "A", vec!["r1".into()]))
        .await
        .unwrap();
    h.downloader.wait_started().await;

    h.network.set_unmetered(false);
    h.downloader.release();
    h.wait_idle().await;

    assert_eq!(h.downloader.calls(), ["a1"]);
    let manifest = h.coordinator.manifest().await;
    assert_eq!(manifest.tracks["a1"].state(), TrackState::Completed);
    assert_eq!(manifest.tracks["a2"].state(), TrackState::Pending);
    assert_eq!(h.coordinator.snapshot().await.pending_track_keys(), ["a2"]);

    h.network.set_unmetered(true);
    h.wait_idle().await;
    assert_eq!(h.downloader.calls(), ["a1", "a2"]);
    assert_eq!(h.coordinator.completed_file_count().await, 2);
}

#[tokio::test]
async fn test_opportunistic_respects_gate_and_limit() {
    let h = HarnessBuilder::new(MapFetcher::default())
        .metered()
        .build()
        .await;
    let upcoming: Vec<CatalogTrack> = (2..=6).map(|i| track(&format!("u{i}"), "x", i)).collect();

    let queued = h
        .coordinator
        .enqueue_opportunistic(&track("u1", "x", 1), &upcoming, Some(2))
        .await;
    assert_eq!(queued, 0);
    assert!(h.coordinator.manifest().await.tracks.is_empty());

    h.network.set_unmetered(true);
    let queued = h
        .coordinator
        .enqueue_opportunistic(&track("u1", "x", 1), &upcoming, Some(2))
        .await;
    assert_eq!(queued, 3);
    h.wait_idle().await;

    assert_eq!(h.downloader.calls(), ["u1", "u2", "u3"]);
    let manifest = h.coordinator.manifest().await;
    assert!(manifest.albums.is_empty());
    assert!(manifest.tracks.values().all(|t| t.is_opportunistic));

    let view = h.coordinator.manage_downloads_snapshot().await;
    assert!(view.downloaded_albums.is_empty());
    let cached: Vec<&str> = view
        .stream_cached_tracks
        .iter()
        .map(|t| t.track_key.as_str())
        .collect();
    assert_eq!(cached, ["u1", "u2", "u3"]);

    // Already cached tracks are skipped.
    let again = h
        .coordinator
        .enqueue_opportunistic(&track("u1", "x", 1), &upcoming, Some(2))
        .await;
    assert_eq!(again, 0);
}

#[tokio::test]
async fn test_album_owned_by_collection_survives_explicit_removal() {
    let h = HarnessBuilder::new(two_albums()).build().await;

    h.coordinator
        .enqueue_album_download(AlbumDownloadRequest::new("a", "A", vec!["r1".into()]))
        .await
        .unwrap();
    let outcome = h
        .coordinator
        .reconcile_collection_download(
            "mix",
            "Mix",
            vec![
                CollectionAlbumGroup::new("a", "A", vec!["r1".into()]),
                CollectionAlbumGroup::new("b", "B", vec!["r2".into()]),
            ],
        )
        .await
        .unwrap();
    assert_eq!(outcome.enqueued, ["a", "b"]);
    h.wait_idle().await;

    h.coordinator.remove_album_download("a").await.unwrap();
    let manifest = h.coordinator.manifest().await;
    let album = &manifest.albums["a"];
    assert!(!album.is_explicit);
    assert!(album.has_ownership());
    assert_eq!(manifest.tracks["a1"].state(), TrackState::Completed);

    h.coordinator.remove_collection_download("mix").await.unwrap();
    let manifest = h.coordinator.manifest().await;
    assert!(manifest.albums.is_empty());
    assert!(manifest.collections.is_empty());
    assert!(manifest.tracks.is_empty());
    assert!(h.coordinator.downloaded_collection_keys().await.is_empty());

    // Unknown identities are a no-op.
    h.coordinator.remove_album_download("missing").await.unwrap();
    h.coordinator.remove_collection_download("missing").await.unwrap();
}

#[tokio::test]
async fn test_explicit_album_survives_collection_removal() {
    let h = HarnessBuilder::new(two_albums()).build().await;
    h.coordinator
        .enqueue_album_download(
            AlbumDownloadRequest::new("b", "B", vec!["r2".into()])
                .with_source(DownloadSource::Collection("mix".into())),
        )
        .await
        .unwrap();
    h.coordinator
        .enqueue_album_download(AlbumDownloadRequest::new("b", "B", vec!["r2".into()]))
        .await
        .unwrap();
    h.coordinator
        .upsert_collection_record("mix", "Mix", vec!["b".into(), "b".into()])
        .await
        .unwrap();
    h.wait_idle().await;

    let manifest = h.coordinator.manifest().await;
    let collection = &manifest.collections["mix"];
    assert_eq!(collection.album_identities.len(), 1);
    assert!(collection.last_reconciled_at.is_some());

    h.coordinator.remove_collection_download("mix").await.unwrap();
    let manifest = h.coordinator.manifest().await;
    let album = &manifest.albums["b"];
    assert!(album.is_explicit);
    assert!(album.collection_keys.is_empty());
    assert_eq!(manifest.tracks["b1"].state(), TrackState::Completed);
}

#[tokio::test]
async fn test_reconcile_collects_per_album_failures() {
    let h = HarnessBuilder::new(two_albums()).build().await;

    let outcome = h
        .coordinator
        .reconcile_collection_download(
            "mix",
            "Mix",
            vec![
                CollectionAlbumGroup::new("b", "B", vec!["r2".into()]),
                CollectionAlbumGroup::new("gone", "Gone", vec!["r404".into()]),
            ],
        )
        .await
        .unwrap();
    h.wait_idle().await;

    assert_eq!(outcome.enqueued, ["b"]);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].album_identity, "gone");
    assert!(matches!(outcome.failures[0].error, OfflineError::Source { .. }));
    assert_eq!(
        h.coordinator.manifest().await.tracks["b1"].state(),
        TrackState::Completed
    );
    assert_eq!(h.coordinator.downloaded_collection_keys().await, ["mix"]);
}

#[tokio::test]
async fn test_fetch_failure_admits_nothing() {
    let mut fetcher = MockFetcher::new();
    fetcher
        .expect_fetch_tracks()
        .withf(|keys: &[String]| keys == ["r1".to_string(), "r1-dup".to_string()])
        .times(1)
        .returning(|_| Err(SourceError::Transport("connection reset".into())));
    let h = HarnessBuilder::new(fetcher).build().await;

    let err = h
        .coordinator
        .enqueue_album_download(AlbumDownloadRequest::new(
            "a",
            "A",
            vec!["r1".into(), "r1-dup".into()],
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, OfflineError::Source { .. }));
    let manifest = h.coordinator.manifest().await;
    assert!(manifest.albums.is_empty());
    assert!(manifest.tracks.is_empty());
}

#[tokio::test]
async fn test_merged_source_albums_are_deduplicated() {
    let mut fetcher = MockFetcher::new();
    fetcher.expect_fetch_tracks().times(1).returning(|_| {
        Ok(vec![
            track("t2", "r1", 2),
            track("t1", "r1", 1),
            track("t2", "r1-dup", 2),
        ])
    });
    let h = HarnessBuilder::new(fetcher).build().await;

    h.coordinator
        .enqueue_album_download(AlbumDownloadRequest::new(
            "a",
            "A",
            vec!["r1".into(), "r1-dup".into()],
        ))
        .await
        .unwrap();
    h.wait_idle().await;

    assert_eq!(h.downloader.calls(), ["t1", "t2"]);
    let manifest = h.coordinator.manifest().await;
    assert_eq!(manifest.albums["a"].track_keys.len(), 2);
    assert_eq!(manifest.albums["a"].source_album_rating_keys.len(), 2);
}

#[tokio::test]
async fn test_purge_removes_everything() {
    let h = HarnessBuilder::new(two_albums()).build().await;
    h.coordinator
        .enqueue_album_download(AlbumDownloadRequest::new("a", "A", vec!["r1".into()]))
        .await
        .unwrap();
    h.wait_idle().await;
    assert_eq!(h.coordinator.completed_file_count().await, 2);

    h.coordinator.purge_all().await.unwrap();

    let manifest = h.coordinator.manifest().await;
    assert!(manifest.tracks.is_empty());
    assert!(manifest.albums.is_empty());
    assert!(h.coordinator.snapshot().await.is_empty());
    assert_eq!(h.manifests.load().await.unwrap(), None);
    assert!(!h.bytes.root().exists());
    assert!(h.events.events().contains(&OfflineEvent::Purged));
}

#[tokio::test]
async fn test_change_notifications_bump_revision() {
    let h = HarnessBuilder::new(two_albums()).metered().build().await;
    let mut changes = h.coordinator.subscribe_changes();
    let before = *changes.borrow_and_update();

    h.coordinator
        .enqueue_album_download(AlbumDownloadRequest::new("b", "B", vec!["r2".into()]))
        .await
        .unwrap();
    tokio::time::timeout(WAIT, changes.changed())
        .await
        .unwrap()
        .unwrap();
    assert!(*changes.borrow() > before);

    let last_emitted = h.events.events().into_iter().rev().find_map(|e| match e {
        OfflineEvent::DownloadsChanged { revision } => Some(revision),
        _ => None,
    });
    assert_eq!(last_emitted, Some(*changes.borrow()));

    let rel = h
        .bytes
        .relative_path_for("b1", "/library/parts/b1/file.flac", Some("flac"));
    assert!(!h.bytes.exists(&rel).await);
}

#[tokio::test]
async fn test_play_recorded_mid_download_survives_later_saves() {
    let downloader = ScriptedDownloader::new(100).hold("b1");
    let h = HarnessBuilder::new(two_albums())
        .downloader(downloader)
        .build()
        .await;

    h.coordinator
        .enqueue_album_download(AlbumDownloadRequest::new("a", "A", vec!["r1".into()]))
        .await
        .unwrap();
    h.wait_idle().await;

    h.coordinator
        .enqueue_album_download(AlbumDownloadRequest::new("b", "B", vec!["r2".into()]))
        .await
        .unwrap();
    h.downloader.wait_started().await;

    let at = Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap();
    assert!(h.coordinator.mark_played("a1", at).await.unwrap());
    assert!(!h.coordinator.mark_played("missing", at).await.unwrap());

    h.downloader.release();
    h.wait_idle().await;

    let on_disk = h.manifests.load().await.unwrap().unwrap();
    assert_eq!(on_disk.tracks["a1"].last_played_at, Some(at));
    assert_eq!(on_disk.tracks["b1"].state(), TrackState::Completed);
}
