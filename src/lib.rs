//! # Flight Harvester Library
//!
//! A resumable, rate-limited harvester for historical flight data from the
//! OpenSky Network. The harvested data files feed downstream demand models.
//!
//! ## Features
//!
//! - **Rate Limiting**: Per-request cooldown and daily quota matched to the account tier
//! - **Chunked Collection**: Time ranges are processed in fixed two-hour windows
//! - **Resume Capability**: Every completed window is checkpointed atomically
//! - **Carrier Filtering**: Only flights of one carrier touching one airport are kept
//! - **Failure Absorption**: Upstream errors become "no flights for this window"
//!
//! ## Quick Start
//!
//! ```no_run
//! use flight_harvester::downloader::{CollectionUnit, HistoricalCollector, RateLimitedClient};
//! use flight_harvester::fetcher::opensky::OpenSkyFetcher;
//! use flight_harvester::fetcher::opensky_config::{ANONYMOUS_TIER, OPENSKY_BASE_URL};
//! use flight_harvester::resume::CheckpointStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = OpenSkyFetcher::new(OPENSKY_BASE_URL, None)?;
//! let client = RateLimitedClient::new(Box::new(fetcher), &ANONYMOUS_TIER);
//! let store = CheckpointStore::new("data/historical");
//!
//! let mut collector = HistoricalCollector::new(client, store).with_carrier("SWA");
//! let unit = CollectionUnit::new("KLAS", 2024, Some(1))?;
//! let report = collector.collect_unit(&unit).await?;
//! println!("{} flights collected", report.records.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`fetcher`] - Upstream flight source trait, OpenSky HTTP fetcher, record filter
//! - [`downloader`] - Rate-limited client, time window chunker, collection orchestrator
//! - [`resume`] - Chunk descriptors, progress state and atomic artifact storage
//! - [`registry`] - Embedded registry of carrier hub airports
//! - [`cli`] - Command line front end

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};

/// CLI command implementations
pub mod cli;

/// Collection orchestration and rate limiting
pub mod downloader;

/// Upstream flight data sources
pub mod fetcher;

/// Metrics collection
pub mod metrics;

/// Hub airport registry
pub mod registry;

/// Resume capability for collection units
pub mod resume;

/// Graceful shutdown coordination
pub mod shutdown;

/// One observed flight segment as reported by the upstream source.
///
/// Field names are serialized exactly as the upstream API spells them
/// (`icao24`, `firstSeen`, `estDepartureAirport`, ...) because downstream
/// consumers read the data files by those keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    /// ICAO 24-bit transponder address of the aircraft
    pub icao24: String,
    /// Callsign; padded with trailing spaces upstream, trimmed once selected
    #[serde(default)]
    pub callsign: Option<String>,
    /// First time the aircraft was seen in the window (Unix seconds)
    pub first_seen: i64,
    /// Last time the aircraft was seen in the window (Unix seconds)
    pub last_seen: i64,
    /// Estimated departure airport (ICAO)
    #[serde(default)]
    pub est_departure_airport: Option<String>,
    /// Estimated arrival airport (ICAO)
    #[serde(default)]
    pub est_arrival_airport: Option<String>,
    /// Horizontal distance to the departure airport (meters)
    #[serde(default)]
    pub est_departure_airport_horiz_distance: Option<f64>,
    /// Vertical distance to the departure airport (meters)
    #[serde(default)]
    pub est_departure_airport_vert_distance: Option<f64>,
    /// Horizontal distance to the arrival airport (meters)
    #[serde(default)]
    pub est_arrival_airport_horiz_distance: Option<f64>,
    /// Vertical distance to the arrival airport (meters)
    #[serde(default)]
    pub est_arrival_airport_vert_distance: Option<f64>,
}

impl FlightRecord {
    /// Callsign with surrounding whitespace removed, `None` when absent or blank
    pub fn trimmed_callsign(&self) -> Option<&str> {
        self.callsign
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Whether the flight departed from or arrived at `airport`
    pub fn touches_airport(&self, airport: &str) -> bool {
        self.est_departure_airport.as_deref() == Some(airport)
            || self.est_arrival_airport.as_deref() == Some(airport)
    }

    /// Validate record integrity
    pub fn validate(&self) -> Result<(), String> {
        if self.icao24.trim().is_empty() {
            return Err("Aircraft identifier cannot be empty".to_string());
        }

        if self.first_seen < 0 {
            return Err(format!(
                "First seen must be non-negative, got {}",
                self.first_seen
            ));
        }

        if self.last_seen < self.first_seen {
            return Err(format!(
                "Last seen ({}) must not precede first seen ({})",
                self.last_seen, self.first_seen
            ));
        }

        Ok(())
    }
}
