//! Upstream flight data sources

use crate::FlightRecord;
use async_trait::async_trait;

pub mod filter;
pub mod opensky;
pub mod opensky_config;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Transport failure (connection refused, timeout, TLS)
    #[error("network error: {0}")]
    NetworkError(String),

    /// Upstream answered with a non-success status
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Status code
        status: u16,
        /// Truncated response body
        body: String,
    },

    /// Response body is not a valid flight list
    #[error("parse error: {0}")]
    ParseError(String),

    /// Fetcher could not be constructed
    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// A source of historical flights
#[async_trait]
pub trait FlightSource: Send + Sync {
    /// Fetch every flight seen in `[begin, end)`
    ///
    /// # Arguments
    /// * `begin` - Window start (Unix seconds)
    /// * `end` - Window end (Unix seconds)
    ///
    /// An interval without flights is `Ok` with an empty list, not an error.
    async fn flights_in_interval(&self, begin: i64, end: i64) -> FetcherResult<Vec<FlightRecord>>;

    /// Base URL of the upstream service
    fn base_url(&self) -> &str;
}
