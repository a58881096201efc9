//! Catalog metadata consumed by the download subsystem.
//!
//! The remote catalog client lives outside this workspace. These types are the
//! narrow projection of a catalog track that the coordinator needs: identity,
//! display metadata, and the downloadable part reference.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A track as resolved from the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTrack {
    /// Catalog-stable track identifier.
    pub rating_key: String,
    /// Display title.
    pub title: String,
    /// Track-level artist (falls back to the album artist when absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    /// Rating key of the catalog album this track belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_rating_key: Option<String>,
    /// Disc number (1-based).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disc_number: Option<u32>,
    /// Track number within its disc.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_number: Option<u32>,
    /// Reference to the downloadable media part, if the catalog exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_key: Option<String>,
}

impl CatalogTrack {
    /// Create a track with only the required fields.
    pub fn new(rating_key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            rating_key: rating_key.into(),
            title: title.into(),
            artist_name: None,
            album_rating_key: None,
            disc_number: None,
            track_number: None,
            part_key: None,
        }
    }

    /// Set the downloadable part reference.
    #[must_use]
    pub fn with_part_key(mut self, part_key: impl Into<String>) -> Self {
        self.part_key = Some(part_key.into());
        self
    }

    /// Set the track artist.
    #[must_use]
    pub fn with_artist(mut self, artist_name: impl Into<String>) -> Self {
        self.artist_name = Some(artist_name.into());
        self
    }

    /// Set the parent album rating key.
    #[must_use]
    pub fn with_album(mut self, album_rating_key: impl Into<String>) -> Self {
        self.album_rating_key = Some(album_rating_key.into());
        self
    }

    /// Set disc and track position.
    #[must_use]
    pub const fn with_position(mut self, disc_number: u32, track_number: u32) -> Self {
        self.disc_number = Some(disc_number);
        self.track_number = Some(track_number);
        self
    }

    /// The part key, if it is present and non-blank.
    pub fn usable_part_key(&self) -> Option<&str> {
        self.part_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }

    /// Merge track lists fetched from several catalog albums.
    ///
    /// Keeps the first occurrence of every rating key, then orders by disc,
    /// track number (unnumbered tracks last), and case-insensitive title.
    pub fn merge_sorted(tracks: Vec<Self>) -> Vec<Self> {
        let mut seen = HashSet::new();
        let mut unique: Vec<Self> = tracks
            .into_iter()
            .filter(|track| seen.insert(track.rating_key.clone()))
            .collect();
        unique.sort_by(Self::album_order);
        unique
    }

    fn album_order(lhs: &Self, rhs: &Self) -> Ordering {
        let lhs_disc = lhs.disc_number.unwrap_or(0);
        let rhs_disc = rhs.disc_number.unwrap_or(0);
        lhs_disc
            .cmp(&rhs_disc)
            .then_with(|| {
                let lhs_index = lhs.track_number.unwrap_or(u32::MAX);
                let rhs_index = rhs.track_number.unwrap_or(u32::MAX);
                lhs_index.cmp(&rhs_index)
            })
            .then_with(|| lhs.title.to_lowercase().cmp(&rhs.title.to_lowercase()))
    }
}

/// Derive the album identity used to merge duplicate catalog entries.
///
/// A non-blank universal identifier wins. Otherwise the identity is
/// `title|artist|year`, each part trimmed and lower-cased.
pub fn album_identity(
    guid: Option<&str>,
    title: &str,
    artist: Option<&str>,
    year: Option<i32>,
) -> String {
    if let Some(guid) = guid.map(str::trim).filter(|g| !g.is_empty()) {
        return guid.to_string();
    }

    let title = title.trim().to_lowercase();
    let artist = artist.map(|a| a.trim().to_lowercase()).unwrap_or_default();
    let year = year.map(|y| y.to_string()).unwrap_or_default();
    format!("{title}|{artist}|{year}")
}
