//! OpenSky Network flights fetcher
//!
//! Talks to `GET /flights/all?begin=<unix>&end=<unix>`. OpenSky answers 404
//! when an interval contains no flights, which is mapped to an empty list.
//! This fetcher performs exactly one request per call: no retries and no
//! rate limiting. Both are the caller's responsibility.

use super::opensky_config::{
    Credentials, FLIGHTS_ALL_ENDPOINT, HTTP_CONNECT_TIMEOUT_SECS, HTTP_REQUEST_TIMEOUT_SECS,
};
use super::{FetcherError, FetcherResult, FlightSource};
use crate::FlightRecord;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Maximum length of the error body kept in [`FetcherError::HttpStatus`]
const BODY_PREVIEW_LEN: usize = 200;

/// HTTP fetcher for the OpenSky REST API
pub struct OpenSkyFetcher {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl OpenSkyFetcher {
    /// Create a fetcher for `base_url`, authenticating when credentials are given
    pub fn new(
        base_url: impl Into<String>,
        credentials: Option<Credentials>,
    ) -> FetcherResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("flight-harvester/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetcherError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Whether requests carry credentials
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }
}

#[async_trait]
impl FlightSource for OpenSkyFetcher {
    async fn flights_in_interval(&self, begin: i64, end: i64) -> FetcherResult<Vec<FlightRecord>> {
        let url = format!("{}{}", self.base_url, FLIGHTS_ALL_ENDPOINT);
        debug!(%url, begin, end, "Requesting flights");

        let mut request = self
            .client
            .get(&url)
            .query(&[("begin", begin), ("end", end)]);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                FetcherError::NetworkError(format!("request timed out: {e}"))
            } else {
                FetcherError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(begin, end, "No flights in interval");
            return Ok(Vec::new());
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetcherError::HttpStatus {
                status: status.as_u16(),
                body: body.chars().take(BODY_PREVIEW_LEN).collect(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetcherError::NetworkError(format!("Failed to read body: {e}")))?;
        parse_flights(&body)
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Parse a `/flights/all` response body
///
/// An empty body or a JSON `null` means no flights.
pub fn parse_flights(body: &str) -> FetcherResult<Vec<FlightRecord>> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }

    let flights: Option<Vec<FlightRecord>> = serde_json::from_str(body)
        .map_err(|e| FetcherError::ParseError(format!("Invalid flights payload: {e}")))?;
    Ok(flights.unwrap_or_default())
}
