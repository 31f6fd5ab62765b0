//! Collection orchestration and rate limiting
//!
//! A collection run processes one [`CollectionUnit`] (an airport over a
//! calendar year or month):
//!
//! 1. **Chunking**: the unit's period is split into two-hour windows by [`chunker`]
//! 2. **Resume**: windows already in the progress artifact are skipped
//! 3. **Fetching**: remaining windows go through [`RateLimitedClient`]
//! 4. **Filtering**: only the carrier's flights at the airport are kept
//! 5. **Checkpointing**: both artifacts are rewritten after every window
//!
//! # Quick Start
//!
//! ```no_run
//! use flight_harvester::downloader::{CollectionUnit, HistoricalCollector, RateLimitedClient};
//! use flight_harvester::fetcher::opensky::OpenSkyFetcher;
//! use flight_harvester::fetcher::opensky_config::{AUTHENTICATED_TIER, OPENSKY_BASE_URL, Credentials};
//! use flight_harvester::resume::CheckpointStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::from_parts(Some("user".into()), Some("secret".into()));
//! let fetcher = OpenSkyFetcher::new(OPENSKY_BASE_URL, credentials)?;
//! let client = RateLimitedClient::new(Box::new(fetcher), &AUTHENTICATED_TIER);
//!
//! let mut collector = HistoricalCollector::new(client, CheckpointStore::new("data/historical"));
//! let report = collector.collect_unit(&CollectionUnit::new("KDAL", 2024, None)?).await?;
//! println!("{} new flights", report.new_records);
//! # Ok(())
//! # }
//! ```

pub mod chunker;
pub mod client;
pub mod collector;
pub mod config;
pub mod rate_limit;
pub mod unit;

pub use client::{FetchOutcome, RateLimitedClient};
pub use collector::{CollectionReport, CollectionStop, CollectorState, HistoricalCollector};
pub use rate_limit::{CooldownLimiter, RateLimitError};
pub use unit::CollectionUnit;

use crate::resume::ResumeError;

/// Collection errors
///
/// Upstream failures are absorbed by the client and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// Collection unit parameters are invalid
    #[error("invalid collection unit: {0}")]
    InvalidUnit(String),

    /// Requested time range or chunk size is invalid
    #[error("invalid time range: {0}")]
    InvalidRange(String),

    /// Reading or writing a unit artifact failed
    #[error(transparent)]
    Resume(#[from] ResumeError),
}
