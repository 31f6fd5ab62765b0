//! Verify command: integrity check of every artifact in the data directory

use super::{Cli, CliError, OutputFormat};
use crate::resume::store::{FLIGHTS_SUFFIX, PROGRESS_SUFFIX};
use crate::resume::CheckpointStore;
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Only check artifacts of this airport (ICAO code)
    #[arg(long)]
    pub airport: Option<String>,
}

/// Kind of collection artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Completed chunk list
    Progress,
    /// Accumulated flight records
    Flights,
}

/// Verification result for one artifact
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    /// File name inside the data directory
    pub file: String,
    /// Artifact kind
    pub kind: ArtifactKind,
    /// Chunks or flights contained
    pub entries: usize,
    /// Flights failing record validation
    pub invalid: usize,
    /// Load error, if the artifact could not be parsed
    pub error: Option<String>,
}

impl VerifyArgs {
    /// Execute the verify command
    pub fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let summaries = verify_dir(&cli.data_dir, self.airport.as_deref())?;

        match cli.output_format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
            OutputFormat::Human => print_summaries(&cli.data_dir, &summaries),
        }

        let corrupt = summaries.iter().filter(|s| s.error.is_some()).count();
        if corrupt > 0 {
            return Err(CliError::VerificationFailed(format!(
                "{corrupt} corrupt artifact(s) in {}",
                cli.data_dir.display()
            )));
        }
        Ok(())
    }
}

/// Load every progress and flight data artifact under `data_dir`
///
/// A missing directory yields no summaries. Only directory listing failures
/// are errors; per-artifact load failures are reported in the summaries.
pub fn verify_dir(data_dir: &Path, airport: Option<&str>) -> Result<Vec<ArtifactSummary>, CliError> {
    if !data_dir.exists() {
        info!(path = %data_dir.display(), "Data directory does not exist, nothing to verify");
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(data_dir).map_err(|e| {
        CliError::InvalidArgument(format!(
            "Failed to read data directory {}: {e}",
            data_dir.display()
        ))
    })?;

    let prefix = airport.map(|a| format!("{}_", a.trim().to_ascii_uppercase()));
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| {
                    artifact_kind(name).is_some()
                        && prefix.as_deref().map_or(true, |p| name.starts_with(p))
                })
        })
        .collect();
    paths.sort();

    let mut summaries = Vec::with_capacity(paths.len());
    for path in paths {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let Some(kind) = artifact_kind(&file) else {
            continue;
        };

        let summary = match kind {
            ArtifactKind::Progress => match CheckpointStore::read_progress_file(&path) {
                Ok(progress) => ArtifactSummary {
                    file,
                    kind,
                    entries: progress.len(),
                    invalid: progress.chunks().iter().filter(|c| c.end <= c.start).count(),
                    error: None,
                },
                Err(e) => corrupt(file, kind, e.to_string()),
            },
            ArtifactKind::Flights => match CheckpointStore::read_records_file(&path) {
                Ok(records) => ArtifactSummary {
                    file,
                    kind,
                    entries: records.len(),
                    invalid: records.iter().filter(|r| r.validate().is_err()).count(),
                    error: None,
                },
                Err(e) => corrupt(file, kind, e.to_string()),
            },
        };
        summaries.push(summary);
    }

    Ok(summaries)
}

fn artifact_kind(file_name: &str) -> Option<ArtifactKind> {
    if file_name.ends_with(PROGRESS_SUFFIX) {
        Some(ArtifactKind::Progress)
    } else if file_name.ends_with(FLIGHTS_SUFFIX) {
        Some(ArtifactKind::Flights)
    } else {
        None
    }
}

fn corrupt(file: String, kind: ArtifactKind, error: String) -> ArtifactSummary {
    warn!(%file, %error, "Artifact failed to load");
    ArtifactSummary {
        file,
        kind,
        entries: 0,
        invalid: 0,
        error: Some(error),
    }
}

fn print_summaries(data_dir: &Path, summaries: &[ArtifactSummary]) {
    if summaries.is_empty() {
        println!("No artifacts found in {}", data_dir.display());
        return;
    }

    println!("Found {} artifact(s) in {}", summaries.len(), data_dir.display());
    for s in summaries {
        match (&s.error, s.kind) {
            (Some(error), _) => println!("  - {} (corrupt: {error})", s.file),
            (None, ArtifactKind::Progress) => println!("  - {} ({} chunks)", s.file, s.entries),
            (None, ArtifactKind::Flights) if s.invalid > 0 => println!(
                "  - {} ({} flights, {} invalid)",
                s.file, s.entries, s.invalid
            ),
            (None, ArtifactKind::Flights) => println!("  - {} ({} flights)", s.file, s.entries),
        }
    }

    let corrupt = summaries.iter().filter(|s| s.error.is_some()).count();
    println!("\nSummary:");
    println!("  Valid files: {}", summaries.len() - corrupt);
    if corrupt > 0 {
        println!("  Corrupt files: {corrupt}");
    }
}
