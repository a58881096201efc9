//! JSON manifest store.
//!
//! The manifest is one pretty-printed JSON document. A document written
//! under a different schema version loads as absent; there is no migration.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use hoard_core::paths::manifest_path_in;
use hoard_core::{CURRENT_SCHEMA_VERSION, Manifest, ManifestStorePort, StoreError};

use crate::atomic::{remove_if_exists, write_atomic};

/// Just enough of the document to read its version.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionHeader {
    schema_version: Option<u32>,
}

/// Persists the manifest as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonManifestStore {
    path: PathBuf,
}

impl JsonManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the standard manifest location of a data root.
    pub fn in_data_root(data_root: &Path) -> Self {
        Self::new(manifest_path_in(data_root))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Decode a manifest document, applying the schema gate and repairing
/// records whose file path disagrees with their state.
fn decode(bytes: &[u8]) -> Result<Option<Manifest>, StoreError> {
    let header: VersionHeader =
        serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization(e.to_string()))?;
    if header.schema_version != Some(CURRENT_SCHEMA_VERSION) {
        tracing::info!(
            target: "hoard.store",
            found = ?header.schema_version,
            current = CURRENT_SCHEMA_VERSION,
            "Ignoring manifest with a different schema version"
        );
        return Ok(None);
    }

    let mut manifest: Manifest =
        serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let repaired = manifest.repair_file_invariants();
    if repaired > 0 {
        tracing::warn!(target: "hoard.store", repaired, "Repaired inconsistent track records");
    }
    Ok(Some(manifest))
}

#[async_trait]
impl ManifestStorePort for JsonManifestStore {
    async fn load(&self) -> Result<Option<Manifest>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::from_io(&self.path, &e)),
        };
        decode(&bytes)
    }

    async fn save(&self, manifest: &Manifest) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(manifest)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        write_atomic(&self.path, &bytes).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        remove_if_exists(&self.path).await
    }
}
