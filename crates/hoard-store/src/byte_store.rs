//! Filesystem byte store.

use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use hoard_core::paths::audio_dir_in;
use hoard_core::{ByteStorePort, StoreError};

use crate::atomic::{remove_if_exists, write_atomic};

/// Stores track content as plain files under a root directory.
#[derive(Debug, Clone)]
pub struct FsByteStore {
    root: PathBuf,
}

impl FsByteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the audio directory of a data root.
    pub fn in_data_root(data_root: &Path) -> Self {
        Self::new(audio_dir_in(data_root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path, refusing anything that would leave the root.
    fn resolve(&self, relative_path: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(relative_path);
        let contained = !relative_path.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !contained {
            return Err(StoreError::io(relative_path, "path escapes the store root"));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ByteStorePort for FsByteStore {
    fn absolute_path(&self, relative_path: &str) -> PathBuf {
        self.root.join(relative_path)
    }

    async fn write(&self, data: &[u8], relative_path: &str) -> Result<(), StoreError> {
        let path = self.resolve(relative_path)?;
        write_atomic(&path, data).await?;
        tracing::debug!(target: "hoard.store", path = %relative_path, bytes = data.len(), "Stored file");
        Ok(())
    }

    async fn exists(&self, relative_path: &str) -> bool {
        let Ok(path) = self.resolve(relative_path) else {
            return false;
        };
        tokio::fs::metadata(&path)
            .await
            .is_ok_and(|metadata| metadata.is_file())
    }

    async fn remove(&self, relative_path: &str) -> Result<(), StoreError> {
        let path = self.resolve(relative_path)?;
        remove_if_exists(&path).await
    }

    async fn remove_all(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => {
                tracing::info!(target: "hoard.store", root = %self.root.display(), "Removed all stored files");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::from_io(&self.root, &e)),
        }
    }
}
