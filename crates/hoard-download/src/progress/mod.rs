//! Progress rate estimation.
//!
//! This module turns raw byte counts from the downloader into throughput
//! and time-remaining estimates for the in-progress snapshot.

mod rate;

pub use rate::{ProgressSample, estimated_remaining_seconds, throughput};
