//! Durable storage of per-unit collection artifacts
//!
//! Every collection unit owns two JSON artifacts in the data directory:
//!
//! - `<AIRPORT>_<YEAR>[_<MM>]_progress.json` - the completed chunk list
//! - `<AIRPORT>_<YEAR>[_<MM>]_flights.json` - the accumulated flight records
//!
//! Both are rewritten in full on every save. Writes go to a temp file in the
//! same directory which is fsynced and then renamed over the target, so a
//! crash leaves either the previous or the new artifact, never a torn one.

use super::checkpoint::ProgressState;
use crate::downloader::CollectionUnit;
use crate::FlightRecord;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default data directory used by the harvester
pub const DEFAULT_DATA_DIR: &str = "data/historical";

/// Suffix of progress artifacts
pub const PROGRESS_SUFFIX: &str = "_progress.json";

/// Suffix of flight data artifacts
pub const FLIGHTS_SUFFIX: &str = "_flights.json";

/// Read/write access to the artifacts of every collection unit in one directory
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    data_dir: PathBuf,
}

impl CheckpointStore {
    /// Create a store rooted at `data_dir`
    ///
    /// The directory is created lazily on the first save.
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Data directory of this store
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the progress artifact for `unit`
    pub fn progress_path(&self, unit: &CollectionUnit) -> PathBuf {
        self.data_dir
            .join(format!("{}{PROGRESS_SUFFIX}", unit.file_stem()))
    }

    /// Path of the flight data artifact for `unit`
    pub fn records_path(&self, unit: &CollectionUnit) -> PathBuf {
        self.data_dir
            .join(format!("{}{FLIGHTS_SUFFIX}", unit.file_stem()))
    }

    /// Path of the advisory lock file for `unit`
    pub fn lock_path(&self, unit: &CollectionUnit) -> PathBuf {
        self.data_dir.join(format!("{}.lock", unit.file_stem()))
    }

    /// Load the completed chunk list, empty if the unit has no artifact yet
    pub fn load_progress(&self, unit: &CollectionUnit) -> Result<ProgressState, ResumeError> {
        Self::read_progress_file(&self.progress_path(unit))
    }

    /// Overwrite the progress artifact with `progress`
    pub fn save_progress(
        &self,
        unit: &CollectionUnit,
        progress: &ProgressState,
    ) -> Result<(), ResumeError> {
        write_json_atomic(&self.progress_path(unit), progress)
    }

    /// Load the accumulated flight records, empty if the unit has no artifact yet
    pub fn load_records(&self, unit: &CollectionUnit) -> Result<Vec<FlightRecord>, ResumeError> {
        Self::read_records_file(&self.records_path(unit))
    }

    /// Overwrite the flight data artifact with `records`
    pub fn save_records(
        &self,
        unit: &CollectionUnit,
        records: &[FlightRecord],
    ) -> Result<(), ResumeError> {
        write_json_atomic(&self.records_path(unit), records)
    }

    /// Read a progress artifact by path
    pub fn read_progress_file(path: &Path) -> Result<ProgressState, ResumeError> {
        read_json_or_default(path)
    }

    /// Read a flight data artifact by path
    pub fn read_records_file(path: &Path) -> Result<Vec<FlightRecord>, ResumeError> {
        read_json_or_default(path)
    }
}

/// Read a JSON artifact, returning the default value when it does not exist
///
/// A present but unparsable artifact is an error: silently starting over
/// would discard collection history.
fn read_json_or_default<T>(path: &Path) -> Result<T, ResumeError>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        debug!(path = %path.display(), "No artifact found, starting empty");
        return Ok(T::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ResumeError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    serde_json::from_str(&contents).map_err(|e| {
        warn!(path = %path.display(), error = %e, "Failed to parse artifact");
        ResumeError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })
}

/// Serialize `value` and atomically replace `path` with it
fn write_json_atomic<T>(path: &Path, value: &T) -> Result<(), ResumeError>
where
    T: Serialize + ?Sized,
{
    let io_err = |message: String| ResumeError::Io {
        path: path.to_path_buf(),
        message,
    };

    let parent_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent_dir)
        .map_err(|e| io_err(format!("Failed to create directory: {e}")))?;

    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ResumeError::Serialization(e.to_string()))?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent_dir)
        .map_err(|e| io_err(format!("Failed to create temp file: {e}")))?;
    temp_file
        .write_all(json.as_bytes())
        .map_err(|e| io_err(format!("Failed to write temp file: {e}")))?;
    temp_file
        .flush()
        .map_err(|e| io_err(format!("Failed to flush temp file: {e}")))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| io_err(format!("Failed to sync temp file: {e}")))?;
    temp_file
        .persist(path)
        .map_err(|e| io_err(format!("Failed to persist temp file: {e}")))?;

    // Make the rename itself durable
    if let Ok(dir) = std::fs::File::open(parent_dir) {
        let _ = dir.sync_all();
    }

    debug!(path = %path.display(), bytes = json.len(), "Artifact written");
    Ok(())
}

/// Errors related to collection artifacts
#[derive(Debug, thiserror::Error)]
pub enum ResumeError {
    /// Filesystem failure while reading or writing an artifact
    #[error("IO error on {}: {message}", path.display())]
    Io {
        /// Artifact path
        path: PathBuf,
        /// Underlying error
        message: String,
    },

    /// Artifact exists but cannot be parsed
    #[error("corrupt artifact {}: {message}", path.display())]
    Corrupt {
        /// Artifact path
        path: PathBuf,
        /// Parser error
        message: String,
    },

    /// In-memory state could not be serialized
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Unit lock could not be acquired
    #[error("lock error: {0}")]
    Lock(String),
}
