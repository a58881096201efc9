//! Terminal formatting for command output.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use hoard_core::{ManageDownloadsSnapshot, Manifest, QueueSnapshot, TrackState};

/// Everything `hoard status` prints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub used_bytes: u64,
    pub budget_bytes: u64,
    pub completed_files: usize,
    pub failed_tracks: Vec<String>,
    pub downloads: ManageDownloadsSnapshot,
}

impl StatusReport {
    pub fn from_manifest(manifest: &Manifest, budget_bytes: u64) -> Self {
        let failed_tracks = manifest
            .tracks
            .values()
            .filter(|t| t.state() == TrackState::Failed)
            .map(|t| t.track_key.clone())
            .collect();

        Self {
            used_bytes: manifest.total_bytes(),
            budget_bytes,
            completed_files: manifest.completed_file_count(),
            failed_tracks,
            downloads: ManageDownloadsSnapshot::from_manifest(manifest, QueueSnapshot::default()),
        }
    }
}

impl Display for StatusReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Storage: {} of {} ({} files)",
            format_bytes(self.used_bytes),
            format_bytes(self.budget_bytes),
            self.completed_files
        )?;

        let albums = &self.downloads.downloaded_albums;
        writeln!(f, "\nAlbums ({}):", albums.len())?;
        for album in albums {
            let artist = album.artist_name.as_deref().unwrap_or("Unknown artist");
            write!(
                f,
                "  {} - {}  [{}/{}]",
                album.display_title, artist, album.completed_track_count, album.total_track_count
            )?;
            if album.collection_membership_count > 0 {
                write!(f, "  in {} collection(s)", album.collection_membership_count)?;
            }
            writeln!(f)?;
        }

        let collections = &self.downloads.downloaded_collections;
        writeln!(f, "\nCollections ({}):", collections.len())?;
        for collection in collections {
            writeln!(
                f,
                "  {}  ({} albums)  [{}]",
                collection.title, collection.album_count, collection.collection_key
            )?;
        }

        writeln!(
            f,
            "\nStream-cached tracks: {}",
            self.downloads.stream_cached_tracks.len()
        )?;

        if !self.failed_tracks.is_empty() {
            writeln!(f, "Failed tracks: {}", self.failed_tracks.join(", "))?;
        }
        Ok(())
    }
}

/// Human-readable byte count using binary units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
