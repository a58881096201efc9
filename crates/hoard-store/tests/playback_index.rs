//! Local playback index over the real filesystem stores.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use hoard_core::{
    ByteStorePort, LocalPlaybackIndex, LocalPlaybackIndexPort, Manifest, ManifestStorePort,
    TrackRecord, discard_legacy_audio,
};
use hoard_store::{FsByteStore, JsonManifestStore};

struct Fixture {
    _dir: tempfile::TempDir,
    manifests: Arc<JsonManifestStore>,
    bytes: Arc<FsByteStore>,
    index: LocalPlaybackIndex,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let manifests = Arc::new(JsonManifestStore::in_data_root(dir.path()));
    let bytes = Arc::new(FsByteStore::in_data_root(dir.path()));
    let index = LocalPlaybackIndex::new(manifests.clone(), bytes.clone());
    Fixture {
        _dir: dir,
        manifests,
        bytes,
        index,
    }
}

async fn store_completed(fixture: &Fixture, key: &str, extension: &str) -> String {
    let part = format!("/library/parts/{key}/file.{extension}");
    let rel = fixture.bytes.relative_path_for(key, &part, None);
    fixture.bytes.write(b"audio-bytes", &rel).await.unwrap();

    let mut manifest = fixture.manifests.load().await.unwrap().unwrap_or_default();
    let mut record = TrackRecord::pending(key, Some(part));
    record.mark_completed(rel.clone(), Some(11), 11, Utc::now());
    manifest.put_track(record);
    fixture.manifests.save(&manifest).await.unwrap();
    rel
}

#[tokio::test]
async fn test_manifest_round_trips_through_disk() {
    let fixture = fixture();
    assert_eq!(fixture.manifests.load().await.unwrap(), None);

    let rel = store_completed(&fixture, "t1", "flac").await;
    let loaded = fixture.manifests.load().await.unwrap().unwrap();
    assert_eq!(loaded.tracks["t1"].relative_file_path(), Some(rel.as_str()));
    assert_eq!(loaded.total_bytes(), 11);

    fixture.manifests.clear().await.unwrap();
    fixture.manifests.clear().await.unwrap();
    assert_eq!(fixture.manifests.load().await.unwrap(), None);
}

#[tokio::test]
async fn test_file_path_tracks_external_deletion() {
    let fixture = fixture();
    let rel = store_completed(&fixture, "t1", "mp3").await;

    let path = fixture.index.file_path("t1").await.unwrap();
    assert_eq!(path, fixture.bytes.absolute_path(&rel));
    assert!(path.exists());

    std::fs::remove_file(&path).unwrap();
    assert_eq!(fixture.index.file_path("t1").await, None);
}

#[tokio::test]
async fn test_mark_played_is_persisted() {
    let fixture = fixture();
    store_completed(&fixture, "t1", "mp3").await;
    let at = Utc.with_ymd_and_hms(2025, 2, 14, 20, 0, 0).unwrap();

    assert!(fixture.index.mark_played("t1", at).await.unwrap());
    let manifest = fixture.manifests.load().await.unwrap().unwrap();
    assert_eq!(manifest.tracks["t1"].last_played_at, Some(at));
}

#[tokio::test]
async fn test_legacy_audio_content_is_discarded() {
    let fixture = fixture();
    fixture.bytes.write(b"old", "tracks/legacy.audio").await.unwrap();
    let mut manifest = Manifest::new();
    let mut record = TrackRecord::pending("old", None);
    record.mark_completed("tracks/legacy.audio", None, 3, Utc::now());
    manifest.put_track(record);
    fixture.manifests.save(&manifest).await.unwrap();

    let discarded = discard_legacy_audio(fixture.manifests.as_ref(), fixture.bytes.as_ref())
        .await
        .unwrap();
    assert!(discarded);
    assert_eq!(fixture.manifests.load().await.unwrap(), None);
    assert!(!fixture.bytes.root().exists());
}
