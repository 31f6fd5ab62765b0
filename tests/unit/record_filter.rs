//! Unit tests for carrier/airport record selection

use crate::support::flight;
use flight_harvester::fetcher::filter::{matches, select};

#[test]
fn test_selects_carrier_flights_at_airport() {
    let records = vec![
        flight(Some("SWA100"), Some("KLAS"), Some("KPHX")),
        flight(Some("AAL200"), Some("KDFW"), Some("KLAS")),
        flight(Some("SWA300"), Some("KDAL"), Some("KHOU")),
    ];

    let selected = select(&records, "KLAS", "SWA");
    assert_eq!(selected, vec![records[0].clone()]);
}

#[test]
fn test_arrivals_count_as_touching_airport() {
    let record = flight(Some("SWA12"), Some("KPHX"), Some("KLAS"));
    assert!(matches(&record, "KLAS", "SWA"));
}

#[test]
fn test_callsign_whitespace_is_trimmed() {
    let record = flight(Some("  SWA12   "), Some("KLAS"), None);
    assert!(matches(&record, "KLAS", "SWA"));
}

#[test]
fn test_missing_or_blank_callsign_never_matches() {
    assert!(!matches(&flight(None, Some("KLAS"), None), "KLAS", "SWA"));
    assert!(!matches(&flight(Some("   "), Some("KLAS"), None), "KLAS", "SWA"));
}

#[test]
fn test_matching_is_case_sensitive() {
    assert!(!matches(&flight(Some("swa12"), Some("KLAS"), None), "KLAS", "SWA"));
    assert!(!matches(&flight(Some("SWA12"), Some("klas"), None), "KLAS", "SWA"));
}

#[test]
fn test_order_preserved_and_duplicates_kept() {
    let a = flight(Some("SWA1"), Some("KLAS"), None);
    let b = flight(Some("SWA2"), None, Some("KLAS"));
    let records = vec![a.clone(), b.clone(), a.clone()];

    assert_eq!(select(&records, "KLAS", "SWA"), vec![a.clone(), b, a]);
}
