//! Record types stored in the download manifest.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a single track download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackState {
    /// Waiting in the pending queue.
    Pending,
    /// Bytes are being transferred.
    InProgress,
    /// Stored locally and playable.
    Completed,
    /// Terminal failure; a fresh enqueue retries it.
    Failed,
}

impl TrackState {
    /// Whether the state is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Stable string form, as written to the manifest.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "inProgress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TrackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted state of one track.
///
/// `state` and `relative_file_path` are only reachable through the
/// transition methods so that a completed record always carries a file path
/// and no other state ever does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    /// Catalog rating key of the track.
    pub track_key: String,
    /// Display title, kept for failed tracks too.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Display artist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    /// Downloadable part reference, if one was resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_key: Option<String>,
    state: TrackState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    relative_file_path: Option<String>,
    /// Size announced by the download response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_bytes: Option<u64>,
    /// Size actually written to the byte store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_bytes: Option<u64>,
    /// Queued by look-ahead caching rather than an explicit request.
    #[serde(default)]
    pub is_opportunistic: bool,
    /// Last time the track was played from local storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_played_at: Option<DateTime<Utc>>,
    /// When the download finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TrackRecord {
    /// Create a pending record.
    pub fn pending(track_key: impl Into<String>, part_key: Option<String>) -> Self {
        Self {
            track_key: track_key.into(),
            title: None,
            artist_name: None,
            part_key,
            state: TrackState::Pending,
            relative_file_path: None,
            expected_bytes: None,
            actual_bytes: None,
            is_opportunistic: false,
            last_played_at: None,
            completed_at: None,
        }
    }

    /// Attach display metadata.
    #[must_use]
    pub fn with_display(mut self, title: Option<String>, artist_name: Option<String>) -> Self {
        self.title = title;
        self.artist_name = artist_name;
        self
    }

    /// Set the opportunistic flag.
    #[must_use]
    pub const fn opportunistic(mut self, is_opportunistic: bool) -> Self {
        self.is_opportunistic = is_opportunistic;
        self
    }

    pub const fn state(&self) -> TrackState {
        self.state
    }

    pub fn relative_file_path(&self) -> Option<&str> {
        self.relative_file_path.as_deref()
    }

    pub fn is_completed(&self) -> bool {
        self.state == TrackState::Completed
    }

    /// Bytes this record contributes to used storage.
    pub fn stored_bytes(&self) -> u64 {
        if self.is_completed() {
            self.actual_bytes.unwrap_or(0)
        } else {
            0
        }
    }

    /// Move to `inProgress`, dropping any previous transfer result.
    pub fn mark_in_progress(&mut self) {
        self.state = TrackState::InProgress;
        self.clear_transfer();
    }

    /// Move to `completed` with the stored file and its byte counts.
    pub fn mark_completed(
        &mut self,
        relative_file_path: impl Into<String>,
        expected_bytes: Option<u64>,
        actual_bytes: u64,
        completed_at: DateTime<Utc>,
    ) {
        self.state = TrackState::Completed;
        self.relative_file_path = Some(relative_file_path.into());
        self.expected_bytes = expected_bytes;
        self.actual_bytes = Some(actual_bytes);
        self.completed_at = Some(completed_at);
    }

    /// Move to `failed`. Returns the file path the record held, if any.
    pub fn mark_failed(&mut self) -> Option<String> {
        self.state = TrackState::Failed;
        self.clear_transfer()
    }

    /// Restore the file-state invariant on a record read from disk.
    ///
    /// Returns `true` when the record had to be changed.
    pub(crate) fn repair(&mut self) -> bool {
        let has_path = self
            .relative_file_path
            .as_deref()
            .is_some_and(|p| !p.is_empty());
        match (self.is_completed(), has_path) {
            (true, false) => {
                self.mark_failed();
                true
            }
            (false, true) => {
                self.relative_file_path = None;
                true
            }
            _ => false,
        }
    }

    fn clear_transfer(&mut self) -> Option<String> {
        self.expected_bytes = None;
        self.actual_bytes = None;
        self.completed_at = None;
        self.relative_file_path.take()
    }
}

/// One logical album download target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumRecord {
    pub album_identity: String,
    pub display_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork_path: Option<String>,
    /// Catalog albums merged into this identity.
    #[serde(default)]
    pub source_album_rating_keys: BTreeSet<String>,
    /// Member tracks in first-seen order.
    #[serde(default)]
    pub track_keys: IndexSet<String>,
    /// Directly requested by the user.
    #[serde(default)]
    pub is_explicit: bool,
    /// Collections that also own this album.
    #[serde(default)]
    pub collection_keys: IndexSet<String>,
}

impl AlbumRecord {
    pub fn new(album_identity: impl Into<String>, display_title: impl Into<String>) -> Self {
        Self {
            album_identity: album_identity.into(),
            display_title: display_title.into(),
            artist_name: None,
            artwork_path: None,
            source_album_rating_keys: BTreeSet::new(),
            track_keys: IndexSet::new(),
            is_explicit: false,
            collection_keys: IndexSet::new(),
        }
    }

    /// Whether anything still owns this album.
    pub fn has_ownership(&self) -> bool {
        self.is_explicit || !self.collection_keys.is_empty()
    }
}

/// A downloaded collection and the album identities it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRecord {
    pub collection_key: String,
    pub title: String,
    #[serde(default)]
    pub album_identities: IndexSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reconciled_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_requires_path() {
        let mut record = TrackRecord::pending("t1", Some("/parts/1".into()));
        assert_eq!(record.relative_file_path(), None);

        record.mark_completed("tracks/abc.mp3", Some(10), 10, Utc::now());
        assert!(record.is_completed());
        assert_eq!(record.relative_file_path(), Some("tracks/abc.mp3"));
        assert_eq!(record.stored_bytes(), 10);

        let removed = record.mark_failed();
        assert_eq!(removed.as_deref(), Some("tracks/abc.mp3"));
        assert_eq!(record.state(), TrackState::Failed);
        assert_eq!(record.relative_file_path(), None);
        assert_eq!(record.actual_bytes, None);
        assert_eq!(record.stored_bytes(), 0);
    }

    #[test]
    fn test_track_state_serializes_camel_case() {
        let json = serde_json::to_string(&TrackState::InProgress).unwrap();
        assert_eq!(json, "\"inProgress\"");
        assert_eq!(TrackState::InProgress.to_string(), "inProgress");
        assert!(TrackState::Failed.is_terminal());
        assert!(!TrackState::Pending.is_terminal());
    }

    #[test]
    fn test_repair_fixes_inconsistent_records() {
        let json = r#"{"trackKey":"t","state":"completed"}"#;
        let mut record: TrackRecord = serde_json::from_str(json).unwrap();
        assert!(record.repair());
        assert_eq!(record.state(), TrackState::Failed);

        let json = r#"{"trackKey":"t","state":"pending","relativeFilePath":"tracks/x.mp3"}"#;
        let mut record: TrackRecord = serde_json::from_str(json).unwrap();
        assert!(record.repair());
        assert_eq!(record.relative_file_path(), None);
        assert_eq!(record.state(), TrackState::Pending);
    }

    #[test]
    fn test_album_lists_default_when_missing() {
        let json = r#"{"albumIdentity":"a","displayTitle":"A"}"#;
        let album: AlbumRecord = serde_json::from_str(json).unwrap();
        assert!(album.track_keys.is_empty());
        assert!(album.collection_keys.is_empty());
        assert!(!album.is_explicit);
        assert!(!album.has_ownership());
    }
}
