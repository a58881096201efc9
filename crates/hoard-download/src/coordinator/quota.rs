//! Storage-quota enforcement.
//!
//! Pure manifest surgery: the caller deletes the files and forgets the
//! evicted tracks in its own in-memory state.

use hoard_core::{Manifest, OfflineError, OfflineResult};

/// What an enforcement pass did to the manifest.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QuotaReport {
    /// Evicted track keys, in eviction order.
    pub evicted: Vec<String>,
    /// Relative paths of evicted files.
    pub file_paths: Vec<String>,
    /// Albums deleted because eviction emptied them.
    pub removed_albums: Vec<String>,
    /// Usage after eviction.
    pub used_bytes: u64,
    pub budget_bytes: u64,
}

impl QuotaReport {
    pub const fn is_satisfied(&self) -> bool {
        self.used_bytes <= self.budget_bytes
    }

    /// `InsufficientStorageNonEvictable` if eviction ran out of candidates.
    pub const fn check(&self) -> OfflineResult<()> {
        if self.is_satisfied() {
            Ok(())
        } else {
            Err(OfflineError::insufficient_storage(
                self.used_bytes,
                self.budget_bytes,
            ))
        }
    }
}

/// Evict completed, non-explicit tracks until usage fits `budget_bytes`.
pub fn enforce_budget(manifest: &mut Manifest, budget_bytes: u64) -> QuotaReport {
    let mut report = QuotaReport {
        used_bytes: manifest.total_bytes(),
        budget_bytes,
        ..QuotaReport::default()
    };
    if report.is_satisfied() {
        return report;
    }

    for track_key in manifest.eviction_candidates() {
        if report.is_satisfied() {
            break;
        }
        let freed = manifest
            .tracks
            .get(&track_key)
            .map_or(0, hoard_core::TrackRecord::stored_bytes);

        let removal = manifest.remove_track_completely(&track_key);
        report.file_paths.extend(removal.file_path);
        report.removed_albums.extend(removal.removed_albums);
        report.used_bytes = report.used_bytes.saturating_sub(freed);
        report.evicted.push(track_key);
    }
    report
}
