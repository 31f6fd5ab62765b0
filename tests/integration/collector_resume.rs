//! Integration tests for resumable collection

use crate::support::{at, collector, flight, swa_from_klas, ScriptedSource};
use async_trait::async_trait;
use chrono::TimeDelta;
use flight_harvester::downloader::{
    CollectError, CollectionStop, CollectionUnit, HistoricalCollector, RateLimitedClient,
};
use flight_harvester::fetcher::{FetcherError, FetcherResult, FlightSource};
use flight_harvester::FlightRecord;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use flight_harvester::resume::{
    CheckpointStore, ChunkDescriptor, ProgressState, ResumeError, UnitLock,
};
use tempfile::TempDir;

fn klas_january() -> CollectionUnit {
    CollectionUnit::new("KLAS", 2024, Some(1)).unwrap()
}

#[tokio::test]
async fn test_resume_skips_completed_chunks() {
    let temp_dir = TempDir::new().unwrap();
    let store = CheckpointStore::new(temp_dir.path());
    let unit = klas_january();
    let t = at(2024, 1, 1, 0);

    // Seed: first chunk already done with 3 flights
    let seeded = vec![swa_from_klas(1), swa_from_klas(2), swa_from_klas(3)];
    store
        .save_progress(
            &unit,
            &ProgressState::from_chunks(vec![ChunkDescriptor::new(t, t + TimeDelta::hours(2))]),
        )
        .unwrap();
    store.save_records(&unit, &seeded).unwrap();

    let (source, calls) = ScriptedSource::new();
    let source = source.respond(Ok(vec![
        swa_from_klas(4),
        flight(Some("AAL9"), Some("KLAS"), Some("KDFW")),
    ]));
    let mut collector = collector(source, temp_dir.path());

    let report = collector
        .collect_range(&unit, t, t + TimeDelta::hours(4))
        .await
        .unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1, "only the missing chunk is fetched");
    assert_eq!(calls[0].begin, (t + TimeDelta::hours(2)).and_utc().timestamp());
    assert_eq!(calls[0].end, (t + TimeDelta::hours(4)).and_utc().timestamp());

    assert_eq!(report.chunks_skipped, 1);
    assert_eq!(report.chunks_fetched, 1);
    assert_eq!(report.records.len(), 4);
    assert_eq!(&report.records[..3], &seeded[..]);
    assert_eq!(report.records[3].callsign.as_deref(), Some("SWA4"));
    assert_eq!(store.load_progress(&unit).unwrap().len(), 2);
}

#[tokio::test]
async fn test_second_run_over_finished_range_fetches_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let unit = klas_january();
    let t = at(2024, 1, 1, 0);
    let end = t + TimeDelta::hours(10);

    let (source, first_calls) = ScriptedSource::new();
    let source = source.respond(Ok(vec![swa_from_klas(1)]));
    let first = collector(source, temp_dir.path())
        .collect_range(&unit, t, end)
        .await
        .unwrap();
    assert_eq!(first_calls.lock().unwrap().len(), 5);

    let (source, second_calls) = ScriptedSource::new();
    let second = collector(source, temp_dir.path())
        .collect_range(&unit, t, end)
        .await
        .unwrap();

    assert!(second_calls.lock().unwrap().is_empty());
    assert_eq!(second.chunks_skipped, 5);
    assert_eq!(second.new_records, 0);
    assert_eq!(second.records, first.records);
}

#[tokio::test]
async fn test_failed_chunk_is_absorbed_and_marked_complete() {
    let temp_dir = TempDir::new().unwrap();
    let store = CheckpointStore::new(temp_dir.path());
    let unit = klas_january();
    let t = at(2024, 1, 1, 0);

    let (source, calls) = ScriptedSource::new();
    let source = source
        .respond(Ok(vec![swa_from_klas(1)]))
        .respond(Err(FetcherError::NetworkError("connection reset".to_string())))
        .respond(Ok(vec![swa_from_klas(3)]));
    let mut collector = collector(source, temp_dir.path());

    let report = collector
        .collect_range(&unit, t, t + TimeDelta::hours(6))
        .await
        .unwrap();

    assert_eq!(calls.lock().unwrap().len(), 3);
    assert!(report.is_complete());
    assert_eq!(report.chunks_fetched, 3);
    assert_eq!(report.chunks_failed, 1);
    assert_eq!(report.records.len(), 2);

    let progress = store.load_progress(&unit).unwrap();
    assert_eq!(progress.len(), 3);
    assert!(progress.contains(&ChunkDescriptor::new(
        t + TimeDelta::hours(2),
        t + TimeDelta::hours(4)
    )));
}

#[tokio::test]
async fn test_persisted_artifacts_match_accumulator() {
    let temp_dir = TempDir::new().unwrap();
    let store = CheckpointStore::new(temp_dir.path());
    let unit = klas_january();
    let t = at(2024, 1, 31, 18);

    let (source, _calls) = ScriptedSource::new();
    let source = source
        .respond(Ok(vec![swa_from_klas(1), swa_from_klas(2)]))
        .respond(Ok(vec![flight(Some("SWA7"), Some("KDEN"), Some("KLAS"))]));
    let mut collector = collector(source, temp_dir.path());

    let report = collector
        .collect_range(&unit, t, t + TimeDelta::hours(5))
        .await
        .unwrap();

    assert_eq!(store.load_records(&unit).unwrap(), report.records);

    let progress = store.load_progress(&unit).unwrap();
    assert_eq!(progress.len() as u64, report.chunks_fetched);
    assert_eq!(
        progress.last(),
        Some(&ChunkDescriptor::new(t + TimeDelta::hours(4), t + TimeDelta::hours(5)))
    );
}

#[tokio::test]
async fn test_only_carrier_flights_at_airport_are_kept() {
    let temp_dir = TempDir::new().unwrap();
    let unit = klas_january();
    let t = at(2024, 1, 1, 0);

    let (source, _calls) = ScriptedSource::new();
    let source = source.respond(Ok(vec![
        flight(Some("SWA100"), Some("KLAS"), Some("KPHX")),
        flight(Some("AAL200"), Some("KLAS"), Some("KDFW")),
        flight(Some("SWA300"), Some("KDAL"), Some("KHOU")),
        flight(None, Some("KLAS"), None),
    ]));

    let report = collector(source, temp_dir.path())
        .collect_range(&unit, t, t + TimeDelta::hours(2))
        .await
        .unwrap();

    let callsigns: Vec<_> = report
        .records
        .iter()
        .filter_map(|r| r.trimmed_callsign())
        .collect();
    assert_eq!(callsigns, vec!["SWA100"]);
}

#[tokio::test]
async fn test_custom_carrier_prefix() {
    let temp_dir = TempDir::new().unwrap();
    let unit = klas_january();
    let t = at(2024, 1, 1, 0);

    let (source, _calls) = ScriptedSource::new();
    let source = source.respond(Ok(vec![
        flight(Some("SWA100"), Some("KLAS"), Some("KPHX")),
        flight(Some("AAL200"), Some("KLAS"), Some("KDFW")),
    ]));

    let report = collector(source, temp_dir.path())
        .with_carrier("AAL")
        .collect_range(&unit, t, t + TimeDelta::hours(2))
        .await
        .unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].callsign.as_deref(), Some("AAL200"));
}

#[tokio::test]
async fn test_stored_callsigns_are_trimmed() {
    let temp_dir = TempDir::new().unwrap();
    let store = CheckpointStore::new(temp_dir.path());
    let unit = klas_january();
    let t = at(2024, 1, 1, 0);

    let (source, _calls) = ScriptedSource::new();
    let source = source.respond(Ok(vec![swa_from_klas(4)]));

    let report = collector(source, temp_dir.path())
        .collect_range(&unit, t, t + TimeDelta::hours(2))
        .await
        .unwrap();
    assert_eq!(report.records[0].callsign.as_deref(), Some("SWA4"));

    let contents = std::fs::read_to_string(store.records_path(&unit)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(value[0]["callsign"], "SWA4");
}

/// Source that replaces the unit's flight data file with a non-empty
/// directory on its second request, so the next records save fails
struct BlockingRecordsSource {
    records_path: PathBuf,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl FlightSource for BlockingRecordsSource {
    async fn flights_in_interval(&self, _begin: i64, _end: i64) -> FetcherResult<Vec<FlightRecord>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == 2 {
            std::fs::remove_file(&self.records_path).unwrap();
            std::fs::create_dir(&self.records_path).unwrap();
            std::fs::write(self.records_path.join("occupied"), "x").unwrap();
        }
        Ok(vec![swa_from_klas(call as u32)])
    }

    fn base_url(&self) -> &str {
        "http://blocking.invalid"
    }
}

#[tokio::test]
async fn test_checkpoint_write_failure_aborts_run() {
    let temp_dir = TempDir::new().unwrap();
    let store = CheckpointStore::new(temp_dir.path());
    let unit = klas_january();
    let t = at(2024, 1, 1, 0);

    let calls = Arc::new(AtomicUsize::new(0));
    let source = BlockingRecordsSource {
        records_path: store.records_path(&unit),
        calls: calls.clone(),
    };
    let client = RateLimitedClient::new(Box::new(source), &crate::support::INSTANT_TIER);
    let mut collector = HistoricalCollector::new(client, CheckpointStore::new(temp_dir.path()));

    let result = collector
        .collect_range(&unit, t, t + TimeDelta::hours(6))
        .await;

    assert!(matches!(
        result,
        Err(CollectError::Resume(ResumeError::Io { .. }))
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let progress = store.load_progress(&unit).unwrap();
    assert_eq!(progress.len(), 1);
    assert!(progress.contains(&ChunkDescriptor::new(t, t + TimeDelta::hours(2))));
}

#[tokio::test]
async fn test_custom_chunk_size() {
    let temp_dir = TempDir::new().unwrap();
    let unit = klas_january();
    let t = at(2024, 1, 1, 0);

    let (source, calls) = ScriptedSource::new();
    let report = collector(source, temp_dir.path())
        .with_chunk_size(TimeDelta::hours(1))
        .collect_range(&unit, t, t + TimeDelta::hours(3))
        .await
        .unwrap();

    assert_eq!(report.chunks_total, 3);
    let calls = calls.lock().unwrap();
    assert!(calls.iter().all(|c| c.end - c.begin == 3600));
}

#[tokio::test]
async fn test_corrupt_progress_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let store = CheckpointStore::new(temp_dir.path());
    let unit = klas_january();
    std::fs::write(store.progress_path(&unit), "{not json").unwrap();

    let (source, calls) = ScriptedSource::new();
    let t = at(2024, 1, 1, 0);
    let result = collector(source, temp_dir.path())
        .collect_range(&unit, t, t + TimeDelta::hours(2))
        .await;

    assert!(matches!(
        result,
        Err(CollectError::Resume(ResumeError::Corrupt { .. }))
    ));
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_locked_unit_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let store = CheckpointStore::new(temp_dir.path());
    let unit = klas_january();

    let mut lock = UnitLock::open(&store.lock_path(&unit)).unwrap();
    let _held = lock.try_hold().unwrap();

    let (source, calls) = ScriptedSource::new();
    let t = at(2024, 1, 1, 0);
    let result = collector(source, temp_dir.path())
        .collect_range(&unit, t, t + TimeDelta::hours(2))
        .await;

    assert!(matches!(
        result,
        Err(CollectError::Resume(ResumeError::Lock(_)))
    ));
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_shutdown_between_chunks_keeps_checkpoint_consistent() {
    use flight_harvester::shutdown::Shutdown;

    let temp_dir = TempDir::new().unwrap();
    let store = CheckpointStore::new(temp_dir.path());
    let unit = klas_january();
    let t = at(2024, 1, 1, 0);

    // First run collects one chunk and is then cut short
    let (source, _calls) = ScriptedSource::new();
    let source = source.respond(Ok(vec![swa_from_klas(1)]));
    collector(source, temp_dir.path())
        .collect_range(&unit, t, t + TimeDelta::hours(2))
        .await
        .unwrap();

    let shutdown = Shutdown::new();
    shutdown.request();
    let (source, calls) = ScriptedSource::new();
    let report = collector(source, temp_dir.path())
        .with_shutdown(shutdown)
        .collect_range(&unit, t, t + TimeDelta::hours(6))
        .await
        .unwrap();

    assert_eq!(report.stop, CollectionStop::ShutdownRequested);
    assert_eq!(report.chunks_skipped, 1);
    assert!(calls.lock().unwrap().is_empty());
    assert_eq!(report.records.len(), 1);
    assert_eq!(store.load_progress(&unit).unwrap().len(), 1);
}

#[tokio::test]
async fn test_whole_month_unit_period() {
    let temp_dir = TempDir::new().unwrap();
    let unit = CollectionUnit::new("KLAS", 2024, Some(2)).unwrap();

    let (source, calls) = ScriptedSource::new();
    let report = collector(source, temp_dir.path())
        .collect_unit(&unit)
        .await
        .unwrap();

    // 29 days in February 2024, 12 two-hour chunks per day
    assert_eq!(report.chunks_total, 29 * 12);
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 29 * 12);
    assert_eq!(calls[0].begin, at(2024, 2, 1, 0).and_utc().timestamp());
    assert_eq!(calls.last().unwrap().end, at(2024, 3, 1, 0).and_utc().timestamp());
}
