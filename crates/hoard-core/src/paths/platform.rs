//! Data root resolution.

use std::env;
use std::path::{Path, PathBuf};

use super::error::PathError;

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "HOARD_DATA_DIR";

const MANIFEST_DIR: &str = "offline";
const MANIFEST_FILE: &str = "offline-manifest.json";
const AUDIO_DIR: &str = "offline-audio";

/// Get the root directory for offline data.
///
/// Resolution order:
/// 1. `HOARD_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/hoard`)
///
/// Directories are created by the stores on first write, not here.
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var(DATA_DIR_ENV) {
        if path.trim().is_empty() {
            return Err(PathError::EmptyPath);
        }
        return Ok(PathBuf::from(path));
    }

    let data_dir = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;
    Ok(data_dir.join("hoard"))
}

/// Manifest location under the default data root.
pub fn manifest_path() -> Result<PathBuf, PathError> {
    Ok(manifest_path_in(&data_root()?))
}

/// Audio directory under the default data root.
pub fn audio_dir() -> Result<PathBuf, PathError> {
    Ok(audio_dir_in(&data_root()?))
}

/// Manifest location under an explicit root.
pub fn manifest_path_in(root: &Path) -> PathBuf {
    root.join(MANIFEST_DIR).join(MANIFEST_FILE)
}

/// Audio directory under an explicit root.
pub fn audio_dir_in(root: &Path) -> PathBuf {
    root.join(AUDIO_DIR)
}
