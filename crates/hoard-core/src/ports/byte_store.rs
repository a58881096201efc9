//! Byte store port.

use std::path::PathBuf;

use async_trait::async_trait;

use super::StoreError;
use crate::paths::track_relative_path;

/// Durable storage for downloaded track bytes, addressed by relative path.
///
/// There are never two concurrent writers to the same path: paths derive
/// from track and part identity, so a collision means identical content.
#[async_trait]
pub trait ByteStorePort: Send + Sync {
    /// Relative path for a track's content.
    fn relative_path_for(&self, track_key: &str, part_key: &str, extension: Option<&str>) -> String {
        track_relative_path(track_key, Some(part_key), extension)
    }

    /// Absolute location of a relative path.
    fn absolute_path(&self, relative_path: &str) -> PathBuf;

    /// Write bytes atomically, replacing any existing file.
    async fn write(&self, data: &[u8], relative_path: &str) -> Result<(), StoreError>;

    async fn exists(&self, relative_path: &str) -> bool;

    /// Remove one file. Missing files are not an error.
    async fn remove(&self, relative_path: &str) -> Result<(), StoreError>;

    /// Remove every stored file. A missing root is not an error.
    async fn remove_all(&self) -> Result<(), StoreError>;
}
