//! Rate-limited access to a flight source
//!
//! [`RateLimitedClient`] is the only path to the upstream source. It spaces
//! requests by the tier cooldown, tracks the daily quota, and turns every
//! transport or decode failure into [`FetchOutcome::Failed`] so the
//! collector never has to handle a raw upstream error.

use super::rate_limit::{CooldownLimiter, RateLimitError};
use crate::fetcher::opensky_config::QuotaTier;
use crate::fetcher::FlightSource;
use crate::metrics;
use crate::resume::ChunkDescriptor;
use crate::shutdown::Shutdown;
use crate::FlightRecord;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

/// Result of one rate-limited fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Records returned by the source (possibly none)
    Records(Vec<FlightRecord>),
    /// The request failed; the window is treated as having no flights
    Failed {
        /// Human-readable cause
        reason: String,
    },
    /// No request was issued because the daily quota is used up
    QuotaExhausted {
        /// Quota size
        limit: u32,
        /// Time until the quota window restarts
        resets_in: Duration,
    },
    /// Shutdown was requested while waiting for the cooldown
    Interrupted,
}

/// Flight source wrapper enforcing cooldown and quota
pub struct RateLimitedClient {
    source: Box<dyn FlightSource>,
    limiter: CooldownLimiter,
    tier: &'static QuotaTier,
    shutdown: Option<Shutdown>,
    requests_issued: u64,
}

impl RateLimitedClient {
    /// Wrap `source` with the cooldown and daily quota of `tier`
    pub fn new(source: Box<dyn FlightSource>, tier: &'static QuotaTier) -> Self {
        Self {
            source,
            limiter: CooldownLimiter::new(tier.cooldown).with_daily_quota(tier.daily_quota),
            tier,
            shutdown: None,
            requests_issued: 0,
        }
    }

    /// Enable or disable daily quota enforcement (cooldown always applies)
    pub fn with_quota_enforcement(mut self, enforce: bool) -> Self {
        let limiter = CooldownLimiter::new(self.tier.cooldown);
        self.limiter = if enforce {
            limiter.with_daily_quota(self.tier.daily_quota)
        } else {
            limiter
        };
        self
    }

    /// Abandon cooldown waits when `shutdown` is requested
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Tier this client was configured for
    pub fn tier(&self) -> &'static QuotaTier {
        self.tier
    }

    /// Minimum delay between two requests
    pub fn cooldown(&self) -> Duration {
        self.limiter.cooldown()
    }

    /// Requests issued to the source so far
    pub fn requests_issued(&self) -> u64 {
        self.requests_issued
    }

    /// Base URL of the wrapped source
    pub fn base_url(&self) -> &str {
        self.source.base_url()
    }

    /// Fetch all flights for `chunk`, honoring cooldown and quota
    ///
    /// An empty window returns no records without contacting the source.
    pub async fn fetch(&mut self, chunk: &ChunkDescriptor) -> FetchOutcome {
        if chunk.is_empty() {
            debug!(%chunk, "Empty window, skipping request");
            return FetchOutcome::Records(Vec::new());
        }

        if let Err(RateLimitError::QuotaExhausted { limit, resets_in }) =
            self.limiter.check_quota(Instant::now())
        {
            warn!(
                tier = self.tier.name,
                limit,
                resets_in_secs = resets_in.as_secs(),
                "Daily request quota exhausted"
            );
            return FetchOutcome::QuotaExhausted { limit, resets_in };
        }

        let wait = self.limiter.remaining_wait(Instant::now());
        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis() as u64, "Waiting for request cooldown");
            match &self.shutdown {
                Some(shutdown) => {
                    tokio::select! {
                        _ = sleep(wait) => {}
                        _ = shutdown.requested() => {
                            debug!("Shutdown requested during cooldown");
                            return FetchOutcome::Interrupted;
                        }
                    }
                }
                None => sleep(wait).await,
            }
            metrics::record_cooldown_wait(wait);
        }

        self.limiter.mark_request(Instant::now());
        self.requests_issued += 1;

        match self
            .source
            .flights_in_interval(chunk.start_unix(), chunk.end_unix())
            .await
        {
            Ok(records) => {
                metrics::record_upstream_request("ok");
                debug!(%chunk, flights = records.len(), "Window fetched");
                FetchOutcome::Records(records)
            }
            Err(e) => {
                metrics::record_upstream_request("error");
                warn!(%chunk, error = %e, "Error fetching flights");
                FetchOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
