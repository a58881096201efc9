//! Manifest store port.

use async_trait::async_trait;

use super::StoreError;
use crate::manifest::Manifest;

/// Durable load/save/clear of the single manifest document.
///
/// # Schema gate
///
/// `load` returns `Ok(None)` when no document exists and also when the stored
/// document carries a schema version other than
/// [`CURRENT_SCHEMA_VERSION`](crate::manifest::CURRENT_SCHEMA_VERSION). Old
/// documents are discarded, never migrated.
#[async_trait]
pub trait ManifestStorePort: Send + Sync {
    async fn load(&self) -> Result<Option<Manifest>, StoreError>;

    async fn save(&self, manifest: &Manifest) -> Result<(), StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;
}
