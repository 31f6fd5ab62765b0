//! Resume capability for collection units
//!
//! Provides chunk descriptors, progress state, atomic artifact storage and
//! per-unit file locking.

pub mod checkpoint;
pub mod lock;
pub mod store;

pub use checkpoint::{ChunkDescriptor, ProgressState};
pub use lock::UnitLock;
pub use store::{CheckpointStore, ResumeError};
