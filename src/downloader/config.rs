//! Collection configuration constants

use chrono::TimeDelta;
use std::time::Duration;

/// Chunk length in hours.
/// The OpenSky flights endpoint rejects intervals longer than two hours.
pub const DEFAULT_CHUNK_HOURS: i64 = 2;

/// Callsign prefix of the carrier whose flights are kept (Southwest Airlines)
pub const DEFAULT_CARRIER_PREFIX: &str = "SWA";

/// Length of the rolling window the daily quota applies to
pub const QUOTA_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Default chunk length
pub fn default_chunk_size() -> TimeDelta {
    TimeDelta::hours(DEFAULT_CHUNK_HOURS)
}
