//! Selection of carrier flights at one airport

use crate::FlightRecord;

/// Whether `record` is a flight of the carrier touching `airport`
///
/// The callsign is trimmed and must start with `carrier_prefix`
/// (case-sensitive). Records without a callsign never match.
pub fn matches(record: &FlightRecord, airport: &str, carrier_prefix: &str) -> bool {
    record.touches_airport(airport)
        && record
            .trimmed_callsign()
            .is_some_and(|callsign| callsign.starts_with(carrier_prefix))
}

/// Keep the records departing from or arriving at `airport` whose callsign
/// carries `carrier_prefix`, in input order
///
/// Selected records carry the trimmed callsign.
pub fn select(records: &[FlightRecord], airport: &str, carrier_prefix: &str) -> Vec<FlightRecord> {
    records
        .iter()
        .filter(|record| matches(record, airport, carrier_prefix))
        .map(|record| FlightRecord {
            callsign: record.trimmed_callsign().map(str::to_string),
            ..record.clone()
        })
        .collect()
}
