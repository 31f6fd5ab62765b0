//! OpenSky Network access configuration
//!
//! OpenSky grants different request budgets to anonymous and registered
//! users. Which budget applies is decided once, from whether credentials are
//! configured, and never changes during a run.

use std::fmt;
use std::time::Duration;

/// Default OpenSky REST API base URL
pub const OPENSKY_BASE_URL: &str = "https://opensky-network.org/api";

/// Endpoint returning every flight seen in an interval (max 2 hours)
pub const FLIGHTS_ALL_ENDPOINT: &str = "/flights/all";

/// Longest interval the flights endpoint accepts, in hours
pub const MAX_INTERVAL_HOURS: i64 = 2;

/// HTTP connect timeout (seconds)
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP request timeout (seconds). Interval queries over busy hours are slow.
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Request budget for one class of OpenSky account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaTier {
    /// Tier name used in logs
    pub name: &'static str,
    /// Minimum delay between two upstream requests
    pub cooldown: Duration,
    /// Maximum upstream requests per rolling day
    pub daily_quota: u32,
}

/// Anonymous access: 100 requests per day, 10 seconds apart
pub const ANONYMOUS_TIER: QuotaTier = QuotaTier {
    name: "anonymous",
    cooldown: Duration::from_secs(10),
    daily_quota: 100,
};

/// Registered user access: 1000 requests per day, 5 seconds apart
pub const AUTHENTICATED_TIER: QuotaTier = QuotaTier {
    name: "authenticated",
    cooldown: Duration::from_secs(5),
    daily_quota: 1000,
};

/// OpenSky account credentials (HTTP basic auth)
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account user name
    pub username: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Build credentials only when both parts are present and non-blank
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        match (username, password) {
            (Some(username), Some(password))
                if !username.trim().is_empty() && !password.is_empty() =>
            {
                Some(Self { username, password })
            }
            _ => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Select the quota tier for the configured credentials
pub fn tier_for(credentials: Option<&Credentials>) -> &'static QuotaTier {
    match credentials {
        Some(_) => &AUTHENTICATED_TIER,
        None => &ANONYMOUS_TIER,
    }
}
