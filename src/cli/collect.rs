//! Collect command implementation

use super::{Cli, CliError, OutputFormat};
use crate::downloader::config::DEFAULT_CHUNK_HOURS;
use crate::downloader::{
    CollectionReport, CollectionStop, CollectionUnit, HistoricalCollector, RateLimitedClient,
};
use crate::fetcher::opensky::OpenSkyFetcher;
use crate::fetcher::opensky_config::{tier_for, Credentials, MAX_INTERVAL_HOURS};
use crate::registry::HubRegistry;
use crate::resume::CheckpointStore;
use crate::shutdown::Shutdown;
use chrono::TimeDelta;
use clap::{ArgGroup, Args};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::{info, warn};

/// Arguments for the collect command
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["airport", "all_hubs"])))]
pub struct CollectArgs {
    /// ICAO code of the airport to collect (e.g. KLAS)
    #[arg(long)]
    pub airport: Option<String>,

    /// Collect every hub in the registry, one after another
    #[arg(long, default_value_t = false)]
    pub all_hubs: bool,

    /// Calendar year to collect
    #[arg(long)]
    pub year: i32,

    /// Restrict collection to one month of the year (1-12)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Callsign prefix of the carrier to keep (default: the registry's carrier)
    #[arg(long)]
    pub carrier: Option<String>,

    /// Chunk length in hours (1-2)
    #[arg(
        long,
        default_value_t = DEFAULT_CHUNK_HOURS,
        value_parser = clap::value_parser!(i64).range(1..=MAX_INTERVAL_HOURS)
    )]
    pub chunk_hours: i64,

    /// Treat the daily quota as advisory and keep requesting after it is used up
    #[arg(long, default_value_t = false)]
    pub no_quota_enforcement: bool,
}

impl CollectArgs {
    /// Execute the collect command
    pub async fn execute(&self, cli: &Cli, shutdown: Shutdown) -> Result<(), CliError> {
        let registry =
            HubRegistry::load().map_err(|e| CliError::ConfigurationError(e.to_string()))?;

        let airports: Vec<String> = match &self.airport {
            Some(airport) => {
                if registry.get(airport).is_err() {
                    warn!(%airport, "Airport is not a registered hub, collecting anyway");
                }
                vec![airport.clone()]
            }
            None => registry.hubs().iter().map(|hub| hub.icao.clone()).collect(),
        };

        let units = airports
            .iter()
            .map(|airport| CollectionUnit::new(airport.as_str(), self.year, self.month))
            .collect::<Result<Vec<_>, _>>()?;

        let carrier = self
            .carrier
            .clone()
            .unwrap_or_else(|| registry.carrier_prefix().to_string());
        if carrier.trim().is_empty() {
            return Err(CliError::InvalidArgument(
                "carrier prefix cannot be empty".to_string(),
            ));
        }

        let credentials = Credentials::from_parts(cli.username.clone(), cli.password.clone());
        if credentials.is_none() {
            warn!("No OpenSky credentials configured, using the anonymous tier");
        }
        let tier = tier_for(credentials.as_ref());
        info!(
            tier = tier.name,
            cooldown_secs = tier.cooldown.as_secs(),
            daily_quota = tier.daily_quota,
            quota_enforced = !self.no_quota_enforcement,
            "Rate limits configured"
        );

        let fetcher = OpenSkyFetcher::new(cli.base_url.as_str(), credentials)?;
        let client = RateLimitedClient::new(Box::new(fetcher), tier)
            .with_quota_enforcement(!self.no_quota_enforcement)
            .with_shutdown(shutdown.clone());

        let progress_bar = create_progress_bar(cli.output_format);
        let mut collector = HistoricalCollector::new(client, CheckpointStore::new(&cli.data_dir))
            .with_carrier(carrier)
            .with_chunk_size(TimeDelta::hours(self.chunk_hours))
            .with_shutdown(shutdown)
            .with_progress_bar(progress_bar.clone());

        let mut reports = Vec::with_capacity(units.len());
        for unit in &units {
            let report = collector.collect_unit(unit).await?;
            let stop = report.stop;
            if cli.output_format == OutputFormat::Human {
                progress_bar.suspend(|| print_report(&report));
            }
            reports.push(report);

            if stop != CollectionStop::Completed {
                break;
            }
        }
        progress_bar.finish_and_clear();

        match cli.output_format {
            OutputFormat::Json => {
                let summary: Vec<_> = reports.iter().map(report_json).collect();
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            OutputFormat::Human => {
                if let Some(last) = reports.last() {
                    print_stop_hint(last.stop);
                }
            }
        }

        Ok(())
    }
}

fn create_progress_bar(format: OutputFormat) -> ProgressBar {
    if format == OutputFormat::Json {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

fn print_report(report: &CollectionReport) {
    println!(
        "{}: {} flights ({} new) - {} fetched, {} skipped, {} failed of {} chunks",
        report.unit,
        report.records.len(),
        report.new_records,
        report.chunks_fetched,
        report.chunks_skipped,
        report.chunks_failed,
        report.chunks_total
    );
}

fn print_stop_hint(stop: CollectionStop) {
    match stop {
        CollectionStop::Completed => {}
        CollectionStop::QuotaExhausted { resets_in } => println!(
            "Daily request quota exhausted; it resets in about {}h. Rerun the same command then to resume.",
            resets_in.as_secs().div_ceil(3600)
        ),
        CollectionStop::ShutdownRequested => {
            println!("Interrupted. Progress is saved; rerun the same command to resume.")
        }
    }
}

fn report_json(report: &CollectionReport) -> serde_json::Value {
    let stop = match report.stop {
        CollectionStop::Completed => "completed",
        CollectionStop::QuotaExhausted { .. } => "quota_exhausted",
        CollectionStop::ShutdownRequested => "shutdown_requested",
    };
    json!({
        "unit": report.unit.file_stem(),
        "airport": report.unit.airport(),
        "year": report.unit.year(),
        "month": report.unit.month(),
        "flights": report.records.len(),
        "new_flights": report.new_records,
        "chunks_total": report.chunks_total,
        "chunks_fetched": report.chunks_fetched,
        "chunks_skipped": report.chunks_skipped,
        "chunks_failed": report.chunks_failed,
        "stop": stop,
    })
}
