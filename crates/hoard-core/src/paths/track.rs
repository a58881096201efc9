//! Deterministic relative paths for stored tracks.

use std::path::Path;

use sha2::{Digest, Sha256};

/// Extension used when neither the response nor the part key names one.
pub const DEFAULT_EXTENSION: &str = "mp3";

const TRACKS_DIR: &str = "tracks";

/// Normalize an extension: trim, drop leading dots, lower-case, keep only
/// ASCII alphanumerics. Returns `None` if nothing is left.
pub fn normalized_file_extension(raw: &str) -> Option<String> {
    let normalized: String = raw
        .trim()
        .trim_start_matches('.')
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    (!normalized.is_empty()).then_some(normalized)
}

/// Relative path for a track's stored content.
///
/// `tracks/<sha256 hex of "track|part">.<ext>`, where the extension is the
/// first usable of `suggested_extension`, the part key's own extension, and
/// [`DEFAULT_EXTENSION`].
pub fn track_relative_path(
    track_key: &str,
    part_key: Option<&str>,
    suggested_extension: Option<&str>,
) -> String {
    let part = part_key.unwrap_or_default();
    let digest = Sha256::digest(format!("{track_key}|{part}").as_bytes());

    let extension = suggested_extension
        .and_then(normalized_file_extension)
        .or_else(|| {
            Path::new(part)
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(normalized_file_extension)
        })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

    format!("{TRACKS_DIR}/{digest:x}.{extension}")
}
