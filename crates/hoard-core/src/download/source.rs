//! Download source (ownership reason) for queued work.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a download was requested.
///
/// The source decides which ownership edge an album gains and whether the
/// resulting track records are opportunistic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "collectionKey", rename_all = "camelCase")]
pub enum DownloadSource {
    /// The user asked for this album directly.
    ExplicitAlbum,
    /// The album belongs to a downloaded collection.
    Collection(String),
    /// Look-ahead caching during playback.
    Opportunistic,
}

impl DownloadSource {
    #[must_use]
    pub const fn is_opportunistic(&self) -> bool {
        matches!(self, Self::Opportunistic)
    }
}

impl fmt::Display for DownloadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExplicitAlbum => f.write_str("explicit"),
            Self::Collection(key) => write!(f, "collection:{key}"),
            Self::Opportunistic => f.write_str("opportunistic"),
        }
    }
}
