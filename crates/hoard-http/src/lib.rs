//! HTTP adapter for the byte half of the track source.
//!
//! [`HttpTrackDownloader`] fetches a track's media part from the server,
//! streaming the body and reporting progress per chunk.

#![deny(unsafe_code)]

mod config;
mod content_type;
mod downloader;
mod url;

// ============================================================================
// Public API
// ============================================================================

pub use config::HttpDownloaderConfig;
pub use content_type::extension_for_content_type;
pub use downloader::HttpTrackDownloader;
pub use crate::url::{TOKEN_QUERY_KEY, direct_play_url};
