//! Download requests and the manage-downloads view.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::OfflineError;
use super::progress::QueueSnapshot;
use super::source::DownloadSource;
use crate::manifest::Manifest;

/// Request to download (or extend) one logical album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDownloadRequest {
    pub album_identity: String,
    pub display_title: String,
    pub artist_name: Option<String>,
    pub artwork_path: Option<String>,
    /// Catalog albums whose tracks are merged into this identity.
    pub source_album_rating_keys: Vec<String>,
    pub source: DownloadSource,
}

impl AlbumDownloadRequest {
    /// An explicit request for the given identity.
    pub fn new(
        album_identity: impl Into<String>,
        display_title: impl Into<String>,
        source_album_rating_keys: Vec<String>,
    ) -> Self {
        Self {
            album_identity: album_identity.into(),
            display_title: display_title.into(),
            artist_name: None,
            artwork_path: None,
            source_album_rating_keys,
            source: DownloadSource::ExplicitAlbum,
        }
    }

    #[must_use]
    pub fn with_artist(mut self, artist_name: impl Into<String>) -> Self {
        self.artist_name = Some(artist_name.into());
        self
    }

    #[must_use]
    pub fn with_artwork(mut self, artwork_path: impl Into<String>) -> Self {
        self.artwork_path = Some(artwork_path.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: DownloadSource) -> Self {
        self.source = source;
        self
    }
}

/// One album as supplied for collection reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionAlbumGroup {
    pub album_identity: String,
    pub display_title: String,
    pub artist_name: Option<String>,
    pub artwork_path: Option<String>,
    pub album_rating_keys: Vec<String>,
}

impl CollectionAlbumGroup {
    pub fn new(
        album_identity: impl Into<String>,
        display_title: impl Into<String>,
        album_rating_keys: Vec<String>,
    ) -> Self {
        Self {
            album_identity: album_identity.into(),
            display_title: display_title.into(),
            artist_name: None,
            artwork_path: None,
            album_rating_keys,
        }
    }

    #[must_use]
    pub fn with_artist(mut self, artist_name: impl Into<String>) -> Self {
        self.artist_name = Some(artist_name.into());
        self
    }

    #[must_use]
    pub fn with_artwork(mut self, artwork_path: impl Into<String>) -> Self {
        self.artwork_path = Some(artwork_path.into());
        self
    }

    /// Merge groups that share an identity.
    ///
    /// Rating keys are unioned and sorted, missing artist/artwork are filled
    /// from later duplicates, and the first title wins. The result is sorted
    /// by case-insensitive title.
    pub fn dedupe(groups: Vec<Self>) -> Vec<Self> {
        let mut by_identity: HashMap<String, (Self, BTreeSet<String>)> = HashMap::new();
        for group in groups {
            let keys: BTreeSet<String> = group.album_rating_keys.iter().cloned().collect();
            match by_identity.get_mut(&group.album_identity) {
                Some((existing, merged)) => {
                    merged.extend(keys);
                    if existing.artist_name.is_none() {
                        existing.artist_name = group.artist_name;
                    }
                    if existing.artwork_path.is_none() {
                        existing.artwork_path = group.artwork_path;
                    }
                }
                None => {
                    by_identity.insert(group.album_identity.clone(), (group, keys));
                }
            }
        }

        let mut unique: Vec<Self> = by_identity
            .into_values()
            .map(|(mut group, keys)| {
                group.album_rating_keys = keys.into_iter().collect();
                group
            })
            .collect();
        unique.sort_by(|lhs, rhs| {
            lhs.display_title
                .to_lowercase()
                .cmp(&rhs.display_title.to_lowercase())
                .then_with(|| lhs.album_identity.cmp(&rhs.album_identity))
        });
        unique
    }

    /// Turn the group into an album request owned by the collection.
    pub fn into_request(self, collection_key: &str) -> AlbumDownloadRequest {
        AlbumDownloadRequest {
            album_identity: self.album_identity,
            display_title: self.display_title,
            artist_name: self.artist_name,
            artwork_path: self.artwork_path,
            source_album_rating_keys: self.album_rating_keys,
            source: DownloadSource::Collection(collection_key.to_string()),
        }
    }
}

/// An album that could not be enqueued during a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumFailure {
    pub album_identity: String,
    pub error: OfflineError,
}

/// Result of reconciling a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    /// Album identities enqueued successfully.
    pub enqueued: Vec<String>,
    pub failures: Vec<AlbumFailure>,
}

impl ReconcileOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadedAlbumSummary {
    pub album_identity: String,
    pub display_title: String,
    pub artist_name: Option<String>,
    pub artwork_path: Option<String>,
    pub album_rating_keys: Vec<String>,
    pub completed_track_count: usize,
    pub total_track_count: usize,
    pub collection_membership_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadedCollectionSummary {
    pub collection_key: String,
    pub title: String,
    pub album_count: usize,
}

/// A completed opportunistic track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamCachedTrackSummary {
    pub track_key: String,
    pub album_identity: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Everything the manage-downloads screen shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManageDownloadsSnapshot {
    pub queue: QueueSnapshot,
    pub downloaded_albums: Vec<DownloadedAlbumSummary>,
    pub downloaded_collections: Vec<DownloadedCollectionSummary>,
    pub stream_cached_tracks: Vec<StreamCachedTrackSummary>,
}

impl ManageDownloadsSnapshot {
    /// Build the view from a manifest and the live queue.
    ///
    /// Only explicit albums with at least one completed track are listed.
    pub fn from_manifest(manifest: &Manifest, queue: QueueSnapshot) -> Self {
        let mut downloaded_albums: Vec<DownloadedAlbumSummary> = manifest
            .albums
            .values()
            .filter(|album| album.is_explicit)
            .filter_map(|album| {
                let completed_track_count = album
                    .track_keys
                    .iter()
                    .filter(|key| manifest.tracks.get(*key).is_some_and(|t| t.is_completed()))
                    .count();
                (completed_track_count > 0).then(|| DownloadedAlbumSummary {
                    album_identity: album.album_identity.clone(),
                    display_title: album.display_title.clone(),
                    artist_name: album.artist_name.clone(),
                    artwork_path: album.artwork_path.clone(),
                    album_rating_keys: album.source_album_rating_keys.iter().cloned().collect(),
                    completed_track_count,
                    total_track_count: album.track_keys.len(),
                    collection_membership_count: album.collection_keys.len(),
                })
            })
            .collect();
        downloaded_albums.sort_by_cached_key(|a| a.display_title.to_lowercase());

        let mut downloaded_collections: Vec<DownloadedCollectionSummary> = manifest
            .collections
            .values()
            .map(|collection| DownloadedCollectionSummary {
                collection_key: collection.collection_key.clone(),
                title: collection.title.clone(),
                album_count: collection.album_identities.len(),
            })
            .collect();
        downloaded_collections.sort_by_cached_key(|c| c.title.to_lowercase());

        // Track map iterates in key order already.
        let stream_cached_tracks = manifest
            .tracks
            .values()
            .filter(|t| t.is_completed() && t.is_opportunistic)
            .map(|t| StreamCachedTrackSummary {
                track_key: t.track_key.clone(),
                album_identity: manifest
                    .album_for_track(&t.track_key)
                    .map(|a| a.album_identity.clone()),
                completed_at: t.completed_at,
            })
            .collect();

        Self {
            queue,
            downloaded_albums,
            downloaded_collections,
            stream_cached_tracks,
        }
    }
}
