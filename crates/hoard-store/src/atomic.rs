//! Atomic file replacement.

use std::io;
use std::path::{Path, PathBuf};

use hoard_core::StoreError;

/// Write `data` to `path` through a temporary sibling and a rename.
///
/// Parent directories are created as needed. The temporary file is removed
/// if the write or the rename fails.
pub async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::from_io(parent, &e))?;
    }

    let temp_path = temp_sibling(path);
    let result = async {
        tokio::fs::write(&temp_path, data).await?;
        tokio::fs::rename(&temp_path, path).await
    }
    .await;

    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(StoreError::from_io(path, &e));
    }
    Ok(())
}

/// Remove a file; a missing file is not an error.
pub async fn remove_if_exists(path: &Path) -> Result<(), StoreError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::from_io(path, &e)),
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "file".into(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.tmp"))
}
