//! Unit tests for collection units and their artifact paths

use crate::support::at;
use flight_harvester::downloader::{CollectError, CollectionUnit};
use flight_harvester::resume::CheckpointStore;
use std::path::Path;

#[test]
fn test_year_unit_period_and_paths() {
    let unit = CollectionUnit::new("KDAL", 2023, None).unwrap();
    assert_eq!(unit.period().unwrap(), (at(2023, 1, 1, 0), at(2024, 1, 1, 0)));

    let store = CheckpointStore::new("/data");
    assert_eq!(
        store.progress_path(&unit),
        Path::new("/data/KDAL_2023_progress.json")
    );
    assert_eq!(
        store.records_path(&unit),
        Path::new("/data/KDAL_2023_flights.json")
    );
}

#[test]
fn test_month_unit_paths_are_zero_padded() {
    let unit = CollectionUnit::new("KMDW", 2024, Some(3)).unwrap();
    let store = CheckpointStore::new("data/historical");
    assert_eq!(
        store.records_path(&unit),
        Path::new("data/historical/KMDW_2024_03_flights.json")
    );
}

#[test]
fn test_december_period_ends_next_january() {
    let unit = CollectionUnit::new("KSTL", 2024, Some(12)).unwrap();
    let (start, end) = unit.period().unwrap();
    assert_eq!(start, at(2024, 12, 1, 0));
    assert_eq!(end, at(2025, 1, 1, 0));
}

#[test]
fn test_invalid_month_rejected() {
    assert!(matches!(
        CollectionUnit::new("KLAS", 2024, Some(13)),
        Err(CollectError::InvalidUnit(_))
    ));
}
