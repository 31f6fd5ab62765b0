//! Hubs command: list the registry

use super::{CliError, OutputFormat};
use crate::registry::HubRegistry;
use serde_json::json;

/// Print the carrier and its hub airports
pub fn execute(format: OutputFormat) -> Result<(), CliError> {
    let registry = HubRegistry::load().map_err(|e| CliError::ConfigurationError(e.to_string()))?;

    match format {
        OutputFormat::Json => {
            let output = json!({
                "carrier": registry.carrier(),
                "hubs": registry.hubs(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            let carrier = registry.carrier();
            println!(
                "{} ({}) - {} hubs:\n",
                carrier.name,
                carrier.callsign_prefix,
                registry.hubs().len()
            );
            for hub in registry.hubs() {
                println!("  {:<6} {}", hub.icao, hub.name);
            }
        }
    }

    Ok(())
}
