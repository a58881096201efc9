//! The persisted download manifest.
//!
//! The manifest is the single source of truth for what is stored locally.
//! Every method here is pure: operations that drop stored content return
//! the relative file paths that the caller must delete from the byte store.
//!
//! # Ownership
//!
//! An [`AlbumRecord`] exists only while it is explicitly requested or owned
//! by at least one collection. Every operation that can remove the last
//! owner deletes the album and its tracks in the same call.

mod records;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::download::{AlbumDownloadRequest, DownloadSource};

pub use records::{AlbumRecord, CollectionRecord, TrackRecord, TrackState};

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const LEGACY_AUDIO_SUFFIX: &str = ".audio";

/// The manifest document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub schema_version: u32,
    #[serde(default)]
    pub tracks: BTreeMap<String, TrackRecord>,
    #[serde(default)]
    pub albums: BTreeMap<String, AlbumRecord>,
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionRecord>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            tracks: BTreeMap::new(),
            albums: BTreeMap::new(),
            collections: BTreeMap::new(),
        }
    }
}

/// An album deleted because nothing owned it anymore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovedAlbum {
    pub album_identity: String,
    /// Track records deleted along with the album.
    pub track_keys: Vec<String>,
    /// Stored files the caller must delete.
    pub file_paths: Vec<String>,
}

/// Result of removing a single track from every structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackRemoval {
    pub file_path: Option<String>,
    /// Albums whose membership became empty and were deleted.
    pub removed_albums: Vec<String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the document was written with the current schema.
    pub const fn is_current_schema(&self) -> bool {
        self.schema_version == CURRENT_SCHEMA_VERSION
    }

    /// Bytes used by completed tracks.
    pub fn total_bytes(&self) -> u64 {
        self.tracks.values().map(TrackRecord::stored_bytes).sum()
    }

    /// Completed tracks that have a stored file.
    pub fn completed_file_count(&self) -> usize {
        self.tracks
            .values()
            .filter(|t| t.is_completed() && t.relative_file_path().is_some())
            .count()
    }

    /// Whether any record points at a file in the obsolete `.audio` format.
    pub fn contains_legacy_audio_files(&self) -> bool {
        self.tracks.values().any(|record| {
            record
                .relative_file_path()
                .is_some_and(|path| path.to_lowercase().ends_with(LEGACY_AUDIO_SUFFIX))
        })
    }

    /// Restore the state/file invariant on every record. Returns the number
    /// of records changed.
    pub fn repair_file_invariants(&mut self) -> usize {
        self.tracks
            .values_mut()
            .map(TrackRecord::repair)
            .filter(|changed| *changed)
            .count()
    }

    /// First album (in identity order) that lists the track.
    pub fn album_for_track(&self, track_key: &str) -> Option<&AlbumRecord> {
        self.albums
            .values()
            .find(|album| album.track_keys.contains(track_key))
    }

    /// A track is evictable unless an explicit album lists it.
    pub fn is_evictable(&self, track_key: &str) -> bool {
        !self
            .albums
            .values()
            .any(|album| album.is_explicit && album.track_keys.contains(track_key))
    }

    /// Completed, evictable tracks in eviction order.
    ///
    /// Never-played tracks come first, then played tracks oldest first. Ties
    /// between never-played tracks fall back to key order; the map iterates
    /// in key order and the sort is stable, so equal timestamps do too.
    pub fn eviction_candidates(&self) -> Vec<String> {
        let mut candidates: Vec<&TrackRecord> = self
            .tracks
            .values()
            .filter(|record| record.is_completed() && self.is_evictable(&record.track_key))
            .collect();

        candidates.sort_by(|lhs, rhs| match (lhs.last_played_at, rhs.last_played_at) {
            (Some(left), Some(right)) => left.cmp(&right),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => lhs.track_key.cmp(&rhs.track_key),
        });

        candidates
            .into_iter()
            .map(|record| record.track_key.clone())
            .collect()
    }

    /// Merge an album request and its resolved track keys into the album
    /// record. Track keys and source keys are only ever added; the explicit
    /// flag is sticky.
    pub fn upsert_album<'a>(
        &mut self,
        request: &AlbumDownloadRequest,
        track_keys: impl IntoIterator<Item = &'a str>,
    ) {
        let album = self
            .albums
            .entry(request.album_identity.clone())
            .or_insert_with(|| {
                AlbumRecord::new(request.album_identity.clone(), request.display_title.clone())
            });

        album.display_title.clone_from(&request.display_title);
        if request.artist_name.is_some() {
            album.artist_name.clone_from(&request.artist_name);
        }
        if request.artwork_path.is_some() {
            album.artwork_path.clone_from(&request.artwork_path);
        }
        album
            .source_album_rating_keys
            .extend(request.source_album_rating_keys.iter().cloned());
        for key in track_keys {
            if !album.track_keys.contains(key) {
                album.track_keys.insert(key.to_string());
            }
        }
        match &request.source {
            DownloadSource::ExplicitAlbum => album.is_explicit = true,
            DownloadSource::Collection(key) => {
                album.collection_keys.insert(key.clone());
            }
            DownloadSource::Opportunistic => {}
        }
    }

    /// Insert or replace a track record, keeping its play history.
    pub fn put_track(&mut self, mut record: TrackRecord) {
        if let Some(previous) = self.tracks.get(&record.track_key) {
            record.last_played_at = previous.last_played_at;
        }
        self.tracks.insert(record.track_key.clone(), record);
    }

    /// Record a track as failed.
    ///
    /// Display metadata already on the record wins over the template's. The
    /// returned path is the file the record held before failing.
    pub fn fail_track(&mut self, template: TrackRecord) -> Option<String> {
        let key = template.track_key.clone();
        let mut record = template;
        let mut stale_path = None;
        if let Some(mut previous) = self.tracks.remove(&key) {
            stale_path = previous.mark_failed();
            record.title = previous.title.or(record.title);
            record.artist_name = previous.artist_name.or(record.artist_name);
            record.last_played_at = previous.last_played_at;
        }
        if let Some(path) = record.mark_failed() {
            stale_path.get_or_insert(path);
        }
        self.tracks.insert(key, record);
        stale_path
    }

    /// Delete the album and its tracks if nothing owns it.
    ///
    /// Tracks that another album still lists are kept.
    pub fn remove_album_if_unowned(&mut self, album_identity: &str) -> Option<RemovedAlbum> {
        if self.albums.get(album_identity)?.has_ownership() {
            return None;
        }
        let album = self.albums.remove(album_identity)?;

        let mut removed = RemovedAlbum {
            album_identity: album.album_identity,
            ..RemovedAlbum::default()
        };
        for track_key in album.track_keys {
            let shared = self
                .albums
                .values()
                .any(|other| other.track_keys.contains(&track_key));
            if shared {
                continue;
            }
            if let Some(record) = self.tracks.remove(&track_key) {
                if let Some(path) = record.relative_file_path() {
                    removed.file_paths.push(path.to_string());
                }
                removed.track_keys.push(track_key);
            }
        }
        Some(removed)
    }

    /// Drop the explicit request on an album, cascading if it is now unowned.
    pub fn clear_explicit(&mut self, album_identity: &str) -> Option<RemovedAlbum> {
        self.albums.get_mut(album_identity)?.is_explicit = false;
        self.remove_album_if_unowned(album_identity)
    }

    /// Sever one collection's ownership of an album, cascading if it is now
    /// unowned.
    pub fn detach_collection(
        &mut self,
        album_identity: &str,
        collection_key: &str,
    ) -> Option<RemovedAlbum> {
        self.albums
            .get_mut(album_identity)?
            .collection_keys
            .shift_remove(collection_key);
        self.remove_album_if_unowned(album_identity)
    }

    /// Delete a collection record and sever its edge on every album it owned.
    pub fn remove_collection(&mut self, collection_key: &str) -> Vec<RemovedAlbum> {
        let Some(collection) = self.collections.remove(collection_key) else {
            return Vec::new();
        };
        collection
            .album_identities
            .iter()
            .filter_map(|identity| self.detach_collection(identity, collection_key))
            .collect()
    }

    /// Replace a collection record wholesale.
    ///
    /// Albums the previous record owned but the new one does not lose this
    /// collection's ownership edge.
    pub fn replace_collection(&mut self, record: CollectionRecord) -> Vec<RemovedAlbum> {
        let key = record.collection_key.clone();
        let previous = self
            .collections
            .insert(key.clone(), record)
            .map(|c| c.album_identities)
            .unwrap_or_default();

        let live = &self.collections[&key].album_identities;
        let dropped: Vec<String> = previous
            .into_iter()
            .filter(|identity| !live.contains(identity))
            .collect();

        dropped
            .iter()
            .filter_map(|identity| self.detach_collection(identity, &key))
            .collect()
    }

    /// Remove a track from the manifest entirely.
    ///
    /// Albums left without member tracks are deleted, and their identities
    /// are removed from every collection.
    pub fn remove_track_completely(&mut self, track_key: &str) -> TrackRemoval {
        let mut removal = TrackRemoval {
            file_path: self
                .tracks
                .remove(track_key)
                .and_then(|r| r.relative_file_path().map(str::to_string)),
            ..TrackRemoval::default()
        };

        for album in self.albums.values_mut() {
            if album.track_keys.shift_remove(track_key) && album.track_keys.is_empty() {
                removal.removed_albums.push(album.album_identity.clone());
            }
        }

        for identity in &removal.removed_albums {
            self.albums.remove(identity);
            for collection in self.collections.values_mut() {
                collection.album_identities.shift_remove(identity);
            }
        }
        removal
    }
}
