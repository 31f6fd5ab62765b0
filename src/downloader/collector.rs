//! Resumable collection of one unit
//!
//! For each chunk of the unit's period the collector either skips it (already
//! in the progress artifact) or fetches it through the rate-limited client,
//! keeps the carrier's flights at the unit's airport, and checkpoints.
//!
//! Checkpointing writes the flight data artifact first and the progress
//! artifact second. A crash between the two leaves the chunk unrecorded, so
//! it is fetched again on restart and its flights may appear twice; flights
//! are never lost.

use super::chunker::{chunk_count, chunks};
use super::client::{FetchOutcome, RateLimitedClient};
use super::config::{default_chunk_size, DEFAULT_CARRIER_PREFIX};
use super::unit::CollectionUnit;
use super::CollectError;
use crate::fetcher::filter;
use crate::metrics;
use crate::resume::{CheckpointStore, UnitLock};
use crate::shutdown::Shutdown;
use crate::FlightRecord;
use chrono::{NaiveDateTime, TimeDelta};
use indicatif::ProgressBar;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};

/// Where the collector currently is in its per-chunk cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    /// No run in progress
    Idle,
    /// Choosing the next chunk and checking it against progress
    SelectingChunk,
    /// Waiting on the rate-limited client
    Fetching,
    /// Filtering and appending the chunk's flights
    Merging,
    /// Writing both artifacts
    Checkpointing,
    /// The last run finished or stopped
    Done,
}

impl fmt::Display for CollectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::SelectingChunk => "selecting",
            Self::Fetching => "fetching",
            Self::Merging => "merging",
            Self::Checkpointing => "checkpointing",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStop {
    /// Every chunk of the range is in the progress artifact
    Completed,
    /// The daily quota ran out; remaining chunks are left for a later run
    QuotaExhausted {
        /// Time until the quota window restarts
        resets_in: Duration,
    },
    /// Shutdown was requested; remaining chunks are left for a later run
    ShutdownRequested,
}

/// Summary of one collection run
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionReport {
    /// Unit that was collected
    pub unit: CollectionUnit,
    /// Every record in the flight data artifact after the run
    pub records: Vec<FlightRecord>,
    /// Chunks covering the requested range
    pub chunks_total: u64,
    /// Chunks skipped because they were already in progress
    pub chunks_skipped: u64,
    /// Chunks processed in this run, including failed ones
    pub chunks_fetched: u64,
    /// Chunks whose fetch failed and were recorded without flights
    pub chunks_failed: u64,
    /// Flights appended in this run
    pub new_records: u64,
    /// Why the run ended
    pub stop: CollectionStop,
}

impl CollectionReport {
    /// Whether the whole range has been processed
    pub fn is_complete(&self) -> bool {
        self.stop == CollectionStop::Completed
    }
}

/// Orchestrates chunking, fetching, filtering and checkpointing
pub struct HistoricalCollector {
    client: RateLimitedClient,
    store: CheckpointStore,
    carrier_prefix: String,
    chunk_size: TimeDelta,
    shutdown: Option<Shutdown>,
    progress_bar: Option<ProgressBar>,
    state: CollectorState,
}

impl HistoricalCollector {
    /// Create a collector with the default carrier and chunk size
    pub fn new(client: RateLimitedClient, store: CheckpointStore) -> Self {
        Self {
            client,
            store,
            carrier_prefix: DEFAULT_CARRIER_PREFIX.to_string(),
            chunk_size: default_chunk_size(),
            shutdown: None,
            progress_bar: None,
            state: CollectorState::Idle,
        }
    }

    /// Keep flights whose callsign starts with `prefix`
    pub fn with_carrier(mut self, prefix: impl Into<String>) -> Self {
        self.carrier_prefix = prefix.into();
        self
    }

    /// Use chunks of `size` instead of the default two hours
    pub fn with_chunk_size(mut self, size: TimeDelta) -> Self {
        self.chunk_size = size;
        self
    }

    /// Stop before the next chunk once `shutdown` is requested
    pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Report chunk progress on `bar`
    pub fn with_progress_bar(mut self, bar: ProgressBar) -> Self {
        self.progress_bar = Some(bar);
        self
    }

    /// Current cycle state
    pub fn state(&self) -> CollectorState {
        self.state
    }

    /// Underlying rate-limited client
    pub fn client(&self) -> &RateLimitedClient {
        &self.client
    }

    /// Artifact store
    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Collect the unit's whole calendar period
    pub async fn collect_unit(
        &mut self,
        unit: &CollectionUnit,
    ) -> Result<CollectionReport, CollectError> {
        let (start, end) = unit.period()?;
        self.collect_range(unit, start, end).await
    }

    /// Collect `[start, end)` into the unit's artifacts
    ///
    /// Returns the full record list after the run. Upstream failures never
    /// fail the run; artifact I/O failures do.
    pub async fn collect_range(
        &mut self,
        unit: &CollectionUnit,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<CollectionReport, CollectError> {
        if start > end {
            return Err(CollectError::InvalidRange(format!(
                "start {start} is after end {end}"
            )));
        }
        if self.chunk_size <= TimeDelta::zero() {
            return Err(CollectError::InvalidRange(format!(
                "chunk size must be positive, got {}",
                self.chunk_size
            )));
        }

        let span = info_span!("collect", unit = %unit, carrier = %self.carrier_prefix);
        let result = self.run(unit, start, end).instrument(span).await;
        self.state = CollectorState::Done;
        result
    }

    async fn run(
        &mut self,
        unit: &CollectionUnit,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<CollectionReport, CollectError> {
        let mut lock = UnitLock::open(&self.store.lock_path(unit))?;
        let _guard = lock.try_hold()?;

        let mut progress = self.store.load_progress(unit)?;
        let mut records = self.store.load_records(unit)?;
        let chunks_total = chunk_count(start, end, self.chunk_size);

        info!(
            start = %start,
            end = %end,
            chunks_total,
            already_done = progress.len(),
            existing_flights = records.len(),
            "Starting collection"
        );

        if let Some(bar) = &self.progress_bar {
            bar.set_length(chunks_total);
            bar.set_position(0);
            bar.set_message(unit.to_string());
        }

        let mut report = CollectionReport {
            unit: unit.clone(),
            records: Vec::new(),
            chunks_total,
            chunks_skipped: 0,
            chunks_fetched: 0,
            chunks_failed: 0,
            new_records: 0,
            stop: CollectionStop::Completed,
        };

        for chunk in chunks(start, end, self.chunk_size) {
            self.state = CollectorState::SelectingChunk;

            if progress.contains(&chunk) {
                debug!(%chunk, "Skipping already processed chunk");
                report.chunks_skipped += 1;
                metrics::record_chunk_skipped(unit.airport());
                self.advance_bar();
                continue;
            }

            if self.shutdown_requested() {
                info!("Shutdown requested, stopping before next chunk");
                report.stop = CollectionStop::ShutdownRequested;
                break;
            }

            info!(%chunk, "Processing chunk");
            self.state = CollectorState::Fetching;

            let fetched = match self.client.fetch(&chunk).await {
                FetchOutcome::Records(fetched) => fetched,
                FetchOutcome::Failed { reason } => {
                    warn!(%chunk, %reason, "Chunk fetch failed, recording it without flights");
                    report.chunks_failed += 1;
                    metrics::record_chunk_failed(unit.airport());
                    Vec::new()
                }
                FetchOutcome::QuotaExhausted { resets_in, .. } => {
                    warn!(
                        resets_in_secs = resets_in.as_secs(),
                        "Daily quota exhausted, stopping; rerun later to resume"
                    );
                    report.stop = CollectionStop::QuotaExhausted { resets_in };
                    break;
                }
                FetchOutcome::Interrupted => {
                    info!("Shutdown requested, stopping before next chunk");
                    report.stop = CollectionStop::ShutdownRequested;
                    break;
                }
            };

            self.state = CollectorState::Merging;
            let selected = filter::select(&fetched, unit.airport(), &self.carrier_prefix);
            let added = selected.len();
            records.extend(selected);
            info!(
                %chunk,
                upstream = fetched.len(),
                selected = added,
                total = records.len(),
                "Found carrier flights"
            );
            progress.record(chunk);

            self.state = CollectorState::Checkpointing;
            self.store.save_records(unit, &records)?;
            self.store.save_progress(unit, &progress)?;

            report.chunks_fetched += 1;
            report.new_records += added as u64;
            metrics::record_chunk_fetched(unit.airport(), added);
            self.advance_bar();
        }

        info!(
            total_flights = records.len(),
            new_flights = report.new_records,
            fetched = report.chunks_fetched,
            skipped = report.chunks_skipped,
            failed = report.chunks_failed,
            stop = ?report.stop,
            "Collection finished"
        );

        report.records = records;
        Ok(report)
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(Shutdown::is_requested)
    }

    fn advance_bar(&self) {
        if let Some(bar) = &self.progress_bar {
            bar.inc(1);
        }
    }
}
