//! Hub airport registry for the tracked carrier
//!
//! The registry lists the carrier's callsign prefix and the airports a full
//! harvest covers. It is embedded in the binary and parsed once.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Embedded registry data
const HUBS_JSON: &str = include_str!("hubs.json");

/// Global registry instance (loaded once)
static REGISTRY: Lazy<Result<HubRegistry, RegistryError>> =
    Lazy::new(|| HubRegistry::from_json(HUBS_JSON));

/// Carrier tracked by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carrier {
    /// Display name
    pub name: String,
    /// ICAO callsign prefix
    pub callsign_prefix: String,
}

/// One hub airport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hub {
    /// ICAO airport code
    pub icao: String,
    /// Display name
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct RawRegistry {
    #[allow(dead_code)]
    schema_version: String,
    carrier: Carrier,
    hubs: Vec<Hub>,
}

/// Carrier hubs, in harvest order
#[derive(Debug, Clone)]
pub struct HubRegistry {
    carrier: Carrier,
    hubs: Vec<Hub>,
}

impl HubRegistry {
    /// Load the embedded registry
    ///
    /// The registry is parsed once and cached for the life of the process.
    pub fn load() -> Result<&'static Self, &'static RegistryError> {
        REGISTRY.as_ref()
    }

    fn from_json(json: &str) -> Result<Self, RegistryError> {
        let raw: RawRegistry = serde_json::from_str(json)
            .map_err(|e| RegistryError::ParseError(format!("Failed to parse hub registry: {e}")))?;

        if raw.hubs.is_empty() {
            return Err(RegistryError::ParseError(
                "hub registry lists no airports".to_string(),
            ));
        }

        Ok(Self {
            carrier: raw.carrier,
            hubs: raw.hubs,
        })
    }

    /// Tracked carrier
    pub fn carrier(&self) -> &Carrier {
        &self.carrier
    }

    /// Callsign prefix of the tracked carrier
    pub fn carrier_prefix(&self) -> &str {
        &self.carrier.callsign_prefix
    }

    /// All hubs in harvest order
    pub fn hubs(&self) -> &[Hub] {
        &self.hubs
    }

    /// Look up a hub by ICAO code (case-insensitive)
    pub fn get(&self, icao: &str) -> Result<&Hub, RegistryError> {
        self.hubs
            .iter()
            .find(|hub| hub.icao.eq_ignore_ascii_case(icao.trim()))
            .ok_or_else(|| RegistryError::NotFound(format!("{icao} is not a registered hub")))
    }
}

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Failed to parse registry JSON
    #[error("registry parse error: {0}")]
    ParseError(String),

    /// Airport not found in registry
    #[error("hub not found: {0}")]
    NotFound(String),
}
