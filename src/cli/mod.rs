//! CLI command implementations

pub mod collect;
pub mod error;
pub mod hubs;
pub mod verify;

pub use collect::CollectArgs;
pub use error::CliError;
pub use verify::VerifyArgs;

use crate::fetcher::opensky_config::OPENSKY_BASE_URL;
use crate::resume::store::DEFAULT_DATA_DIR;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Flight Harvester CLI
#[derive(Parser, Debug)]
#[command(name = "flight-harvester")]
#[command(about = "Harvest historical carrier flights from the OpenSky Network", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json or human)
    #[arg(long, global = true, default_value = "human")]
    pub output_format: OutputFormat,

    /// Directory holding progress and flight data artifacts
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// OpenSky account user name
    #[arg(long, global = true, env = "OPENSKY_USERNAME")]
    pub username: Option<String>,

    /// OpenSky account password
    #[arg(long, global = true, env = "OPENSKY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// OpenSky REST API base URL
    #[arg(long, global = true, default_value = OPENSKY_BASE_URL)]
    pub base_url: String,

    /// Serve Prometheus metrics on this address (e.g. 127.0.0.1:9000)
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect carrier flights for one airport or every hub
    Collect(CollectArgs),

    /// List the carrier's hub airports
    Hubs,

    /// Check every artifact in the data directory
    Verify(VerifyArgs),
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
