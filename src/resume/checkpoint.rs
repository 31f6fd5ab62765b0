//! Chunk descriptors and per-unit progress state
//!
//! A chunk is a half-open window `[start, end)` of UTC wall-clock time. The
//! progress state is the ordered list of chunks already processed for one
//! collection unit and is persisted as a plain JSON array.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open collection window `[start, end)` (UTC)
///
/// Two descriptors are equal only when both endpoints match exactly;
/// overlapping windows are not considered equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkDescriptor {
    /// Start of the window (inclusive)
    pub start: NaiveDateTime,
    /// End of the window (exclusive)
    pub end: NaiveDateTime,
}

impl ChunkDescriptor {
    /// Create a descriptor for `[start, end)`
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Window length
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Whether the window covers no time at all
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Start as a Unix timestamp in seconds
    pub fn start_unix(&self) -> i64 {
        self.start.and_utc().timestamp()
    }

    /// End as a Unix timestamp in seconds
    pub fn end_unix(&self) -> i64 {
        self.end.and_utc().timestamp()
    }
}

impl fmt::Display for ChunkDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

/// Ordered, append-only list of chunks already processed for one unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressState {
    chunks: Vec<ChunkDescriptor>,
}

impl ProgressState {
    /// Create an empty progress state
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a progress state from already completed chunks, keeping their order
    pub fn from_chunks(chunks: Vec<ChunkDescriptor>) -> Self {
        Self { chunks }
    }

    /// Whether `chunk` was already processed (exact endpoint match)
    pub fn contains(&self, chunk: &ChunkDescriptor) -> bool {
        self.chunks.iter().any(|c| c == chunk)
    }

    /// Append a processed chunk
    pub fn record(&mut self, chunk: ChunkDescriptor) {
        self.chunks.push(chunk);
    }

    /// All processed chunks in processing order
    pub fn chunks(&self) -> &[ChunkDescriptor] {
        &self.chunks
    }

    /// Most recently processed chunk
    pub fn last(&self) -> Option<&ChunkDescriptor> {
        self.chunks.last()
    }

    /// Number of processed chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no chunk has been processed yet
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
