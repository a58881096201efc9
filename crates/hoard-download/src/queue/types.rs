//! Queue item types (internal implementation).

use hoard_core::{CatalogTrack, DownloadSource, TrackRecord};

/// A track waiting to be downloaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingTrackRequest {
    pub track_key: String,
    pub part_key: String,
    pub title: Option<String>,
    pub artist_name: Option<String>,
    /// Album the track was queued for, if known.
    pub album_identity: Option<String>,
    pub source: DownloadSource,
}

impl PendingTrackRequest {
    /// Build a request from a catalog track with a usable part key.
    ///
    /// Returns `None` when the track cannot be downloaded.
    pub fn from_catalog(
        track: &CatalogTrack,
        album_identity: Option<&str>,
        fallback_artist: Option<&str>,
        source: DownloadSource,
    ) -> Option<Self> {
        let part_key = track.usable_part_key()?;
        Some(Self {
            track_key: track.rating_key.clone(),
            part_key: part_key.to_string(),
            title: Some(track.title.clone()),
            artist_name: track
                .artist_name
                .clone()
                .or_else(|| fallback_artist.map(str::to_string)),
            album_identity: album_identity.map(str::to_string),
            source,
        })
    }

    /// The manifest record written when this request is queued.
    pub fn pending_record(&self) -> TrackRecord {
        TrackRecord::pending(self.track_key.clone(), Some(self.part_key.clone()))
            .with_display(self.title.clone(), self.artist_name.clone())
            .opportunistic(self.source.is_opportunistic())
    }
}
