//! Path utilities for hoard data directories and stored track files.
//!
//! # Layout
//!
//! ```text
//! <data_root>/
//!   offline/offline-manifest.json
//!   offline-audio/tracks/<sha256>.<ext>
//! ```

mod error;
mod platform;
mod track;

pub use error::PathError;
pub use platform::{DATA_DIR_ENV, audio_dir, audio_dir_in, data_root, manifest_path, manifest_path_in};
pub use track::{DEFAULT_EXTENSION, normalized_file_extension, track_relative_path};
