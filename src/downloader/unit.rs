//! Collection units: one airport over one calendar year or month

use super::CollectError;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// Scope of one progress artifact and one flight data artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionUnit {
    airport: String,
    year: i32,
    month: Option<u32>,
}

impl CollectionUnit {
    /// Create a unit for `airport` (ICAO code) over `year`, or one month of it
    pub fn new(airport: impl Into<String>, year: i32, month: Option<u32>) -> Result<Self, CollectError> {
        let airport: String = airport.into();
        let airport = airport.trim().to_ascii_uppercase();

        if airport.is_empty() || !airport.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CollectError::InvalidUnit(format!(
                "airport code must be alphanumeric, got {airport:?}"
            )));
        }

        if !(1..=9998).contains(&year) {
            return Err(CollectError::InvalidUnit(format!(
                "year out of range: {year}"
            )));
        }

        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(CollectError::InvalidUnit(format!(
                    "month must be between 1 and 12, got {m}"
                )));
            }
        }

        Ok(Self {
            airport,
            year,
            month,
        })
    }

    /// ICAO airport code
    pub fn airport(&self) -> &str {
        &self.airport
    }

    /// Calendar year
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Calendar month, if the unit covers a single month
    pub fn month(&self) -> Option<u32> {
        self.month
    }

    /// Artifact name stem: `KLAS_2024` or `KLAS_2024_01`
    pub fn file_stem(&self) -> String {
        match self.month {
            Some(m) => format!("{}_{}_{m:02}", self.airport, self.year),
            None => format!("{}_{}", self.airport, self.year),
        }
    }

    /// Half-open UTC period `[start, end)` covered by the unit
    pub fn period(&self) -> Result<(NaiveDateTime, NaiveDateTime), CollectError> {
        let (start, end) = match self.month {
            Some(12) => (
                NaiveDate::from_ymd_opt(self.year, 12, 1),
                NaiveDate::from_ymd_opt(self.year + 1, 1, 1),
            ),
            Some(m) => (
                NaiveDate::from_ymd_opt(self.year, m, 1),
                NaiveDate::from_ymd_opt(self.year, m + 1, 1),
            ),
            None => (
                NaiveDate::from_ymd_opt(self.year, 1, 1),
                NaiveDate::from_ymd_opt(self.year + 1, 1, 1),
            ),
        };

        match (
            start.and_then(|d| d.and_hms_opt(0, 0, 0)),
            end.and_then(|d| d.and_hms_opt(0, 0, 0)),
        ) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(CollectError::InvalidUnit(format!(
                "cannot compute calendar period for {self}"
            ))),
        }
    }
}

impl fmt::Display for CollectionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.month {
            Some(m) => write!(f, "{} {}-{m:02}", self.airport, self.year),
            None => write!(f, "{} {}", self.airport, self.year),
        }
    }
}
