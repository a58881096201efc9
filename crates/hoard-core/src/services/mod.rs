//! Port-only services.
//!
//! These orchestrate the manifest and byte store ports without owning any
//! download state; the coordinator in `hoard-download` is the only writer of
//! queue state.

mod legacy;
mod playback_index;

pub use legacy::discard_legacy_audio;
pub use playback_index::LocalPlaybackIndex;

#[cfg(test)]
pub(crate) mod test_support;
