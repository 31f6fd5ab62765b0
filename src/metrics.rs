//! Harvest metrics
//!
//! Counters are emitted through the `metrics` facade and are no-ops until a
//! recorder is installed. [`init_metrics`] installs a Prometheus exporter
//! serving a scrape endpoint on the given address.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, info};

static METRICS_INITIALIZED: OnceCell<SocketAddr> = OnceCell::new();

/// Metrics setup errors
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Exporter could not be installed
    #[error("failed to install Prometheus exporter: {0}")]
    Install(String),
}

/// Install the Prometheus exporter on `addr`
///
/// Idempotent: later calls keep the first exporter. Must be called from
/// within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), MetricsError> {
    if let Some(existing) = METRICS_INITIALIZED.get() {
        debug!(%existing, "Metrics already initialized, skipping");
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    describe_counter!(
        "upstream_requests_total",
        Unit::Count,
        "Requests issued to the flight data source, by outcome"
    );
    describe_counter!(
        "chunks_fetched_total",
        Unit::Count,
        "Chunks fetched and checkpointed"
    );
    describe_counter!(
        "chunks_skipped_total",
        Unit::Count,
        "Chunks skipped because they were already collected"
    );
    describe_counter!(
        "chunks_failed_total",
        Unit::Count,
        "Chunks whose fetch failed and were checkpointed without flights"
    );
    describe_counter!(
        "flights_collected_total",
        Unit::Count,
        "Carrier flights appended to data files"
    );
    describe_histogram!(
        "cooldown_wait_seconds",
        Unit::Seconds,
        "Time spent waiting for the request cooldown"
    );

    let _ = METRICS_INITIALIZED.set(addr);
    info!(%addr, "Metrics exporter listening");
    Ok(())
}

/// Record one upstream request and its outcome (`ok` or `error`)
pub fn record_upstream_request(outcome: &'static str) {
    counter!("upstream_requests_total", "outcome" => outcome).increment(1);
}

/// Record time spent in the cooldown wait
pub fn record_cooldown_wait(waited: Duration) {
    histogram!("cooldown_wait_seconds").record(waited.as_secs_f64());
}

/// Record a freshly collected chunk and the flights it contributed
pub fn record_chunk_fetched(airport: &str, flights: usize) {
    counter!("chunks_fetched_total", "airport" => airport.to_string()).increment(1);
    counter!("flights_collected_total", "airport" => airport.to_string())
        .increment(flights as u64);
}

/// Record a chunk skipped because it was already collected
pub fn record_chunk_skipped(airport: &str) {
    counter!("chunks_skipped_total", "airport" => airport.to_string()).increment(1);
}

/// Record a chunk whose fetch failed
pub fn record_chunk_failed(airport: &str) {
    counter!("chunks_failed_total", "airport" => airport.to_string()).increment(1);
}
