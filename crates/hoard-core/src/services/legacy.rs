//! Start-up cleanup of the obsolete `.audio` storage format.

use crate::ports::{ByteStorePort, ManifestStorePort, StoreError};

/// Discard all offline content if the stored manifest references `.audio`
/// files. Returns `true` when content was discarded.
pub async fn discard_legacy_audio(
    manifest_store: &dyn ManifestStorePort,
    byte_store: &dyn ByteStorePort,
) -> Result<bool, StoreError> {
    let Some(manifest) = manifest_store.load().await? else {
        return Ok(false);
    };
    if !manifest.contains_legacy_audio_files() {
        return Ok(false);
    }

    tracing::info!(
        target: "hoard.store",
        tracks = manifest.tracks.len(),
        "Discarding offline content stored in the legacy .audio format"
    );
    byte_store.remove_all().await?;
    manifest_store.clear().await?;
    Ok(true)
}
