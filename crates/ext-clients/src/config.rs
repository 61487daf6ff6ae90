//! Environment-driven configuration for the geocoder and routing clients.

use std::env;
use std::time::Duration;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Configuration for [`crate::GeocoderClient`].
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub retry_count: u32,
    pub cache_ttl: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl GeocoderConfig {
    /// Builds configuration from `GEOCODING_*` and `GEOCODE_CACHE_TTL_SECONDS` environment
    /// variables, falling back to sane defaults for any that are unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("GEOCODING_BASE_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            user_agent: env::var("GEOCODING_USER_AGENT")
                .unwrap_or_else(|_| "fuel-route-planner/0.1".to_string()),
            timeout: Duration::from_secs(env_or("GEOCODING_TIMEOUT_SECONDS", 12)),
            retry_count: env_or("GEOCODING_RETRY_COUNT", 3),
            cache_ttl: Duration::from_secs(env_or("GEOCODE_CACHE_TTL_SECONDS", 86_400)),
        }
    }
}

/// Configuration for [`crate::RoutingClient`].
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub retry_count: u32,
    pub cache_ttl: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl RouterConfig {
    /// Builds configuration from `OSRM_*` and `ROUTE_CACHE_TTL_SECONDS` environment
    /// variables, falling back to sane defaults for any that are unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("OSRM_BASE_URL")
                .unwrap_or_else(|_| "https://router.project-osrm.org".to_string()),
            timeout: Duration::from_secs(env_or("OSRM_TIMEOUT_SECONDS", 12)),
            retry_count: env_or("OSRM_RETRY_COUNT", 3),
            cache_ttl: Duration::from_secs(env_or("ROUTE_CACHE_TTL_SECONDS", 600)),
        }
    }
}
