//! Main entry point for the flight-harvester CLI

use clap::Parser;
use flight_harvester::cli::{hubs, Cli, Commands};
use flight_harvester::metrics::init_metrics;
use flight_harvester::shutdown::{listen_for_ctrl_c, Shutdown};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("flight_harvester=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Some(addr) = cli.metrics_addr {
        if let Err(e) = init_metrics(addr) {
            error!("Metrics disabled: {}", e);
        }
    }

    let shutdown = Shutdown::new();
    listen_for_ctrl_c(shutdown.clone());

    let result = match cli.command {
        Commands::Collect(ref args) => args
            .execute(&cli, shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e)),
        Commands::Hubs => hubs::execute(cli.output_format).map_err(|e| anyhow::anyhow!(e)),
        Commands::Verify(ref args) => args.execute(&cli).map_err(|e| anyhow::anyhow!(e)),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
