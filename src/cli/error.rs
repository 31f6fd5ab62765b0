//! CLI error types and conversions

use crate::downloader::CollectError;
use crate::fetcher::FetcherError;
use crate::resume::ResumeError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Collection error
    #[error("collection error: {0}")]
    CollectError(#[from] CollectError),

    /// Fetcher error
    #[error("fetcher error: {0}")]
    FetcherError(#[from] FetcherError),

    /// Resume error
    #[error("resume error: {0}")]
    ResumeError(#[from] ResumeError),

    /// Output serialization error
    #[error("output error: {0}")]
    OutputError(#[from] serde_json::Error),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    /// One or more artifacts failed verification
    #[error("verification failed: {0}")]
    VerificationFailed(String),
}
