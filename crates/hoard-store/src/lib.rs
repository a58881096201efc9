//! Filesystem adapters for hoard.
//!
//! - [`FsByteStore`] - one file per completed track under the audio directory
//! - [`JsonManifestStore`] - the manifest as a single JSON document
//!
//! Both write atomically: content goes to a temporary sibling which is then
//! renamed over the destination.

mod atomic;
mod byte_store;
mod manifest_store;

pub use byte_store::FsByteStore;
pub use manifest_store::JsonManifestStore;
