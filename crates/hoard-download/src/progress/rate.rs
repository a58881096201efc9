//! Throughput and ETA from successive progress samples.

use chrono::{DateTime, Utc};

/// The last observed byte count for a track and when it was seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSample {
    pub bytes_received: u64,
    pub at: DateTime<Utc>,
}

impl ProgressSample {
    pub const fn new(bytes_received: u64, at: DateTime<Utc>) -> Self {
        Self { bytes_received, at }
    }
}

/// Bytes per second since `previous`.
///
/// `None` when no time has passed or the byte count went backwards.
pub fn throughput(previous: &ProgressSample, bytes_received: u64, now: DateTime<Utc>) -> Option<f64> {
    let elapsed = (now - previous.at).num_microseconds()?;
    if elapsed <= 0 || bytes_received < previous.bytes_received {
        return None;
    }
    let delta = bytes_received - previous.bytes_received;

    #[allow(clippy::cast_precision_loss)]
    let rate = delta as f64 / (elapsed as f64 / 1_000_000.0);
    Some(rate)
}

/// Seconds until `expected_bytes` is reached at `bytes_per_second`.
///
/// Only computed when the expected size is known and the rate is positive.
pub fn estimated_remaining_seconds(
    bytes_received: u64,
    expected_bytes: Option<u64>,
    bytes_per_second: Option<f64>,
) -> Option<f64> {
    let expected = expected_bytes?;
    let rate = bytes_per_second.filter(|rate| *rate > 0.0)?;
    let remaining = expected.saturating_sub(bytes_received);

    #[allow(clippy::cast_precision_loss)]
    let seconds = remaining as f64 / rate;
    Some(seconds)
}
