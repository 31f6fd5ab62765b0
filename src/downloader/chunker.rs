//! Splitting a time range into fixed-size collection windows

use crate::resume::ChunkDescriptor;
use chrono::{NaiveDateTime, TimeDelta};
use std::iter::FusedIterator;

/// Lazy sequence of contiguous windows covering `[start, end)`
///
/// Every window is `size` long except possibly the last, which is clipped to
/// `end`. A non-positive `size` yields nothing.
#[derive(Debug, Clone)]
pub struct Chunks {
    cursor: NaiveDateTime,
    end: NaiveDateTime,
    size: TimeDelta,
}

impl Iterator for Chunks {
    type Item = ChunkDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.end || self.size <= TimeDelta::zero() {
            return None;
        }

        let chunk_end = self
            .cursor
            .checked_add_signed(self.size)
            .map_or(self.end, |t| t.min(self.end));
        let chunk = ChunkDescriptor::new(self.cursor, chunk_end);
        self.cursor = chunk_end;
        Some(chunk)
    }
}

impl FusedIterator for Chunks {}

/// Split `[start, end)` into windows of `size`
pub fn chunks(start: NaiveDateTime, end: NaiveDateTime, size: TimeDelta) -> Chunks {
    Chunks {
        cursor: start,
        end,
        size,
    }
}

/// Number of windows [`chunks`] yields for the same arguments
pub fn chunk_count(start: NaiveDateTime, end: NaiveDateTime, size: TimeDelta) -> u64 {
    chunks(start, end, size).count() as u64
}
