//! Client for a Nominatim-compatible geocoding service.

use crate::config::GeocoderConfig;
use cache::{digest_key, TtlCache};
use planner_types::{GeoPoint, PlannerError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Client for a Nominatim-compatible `/search` endpoint, with retry and cache-aside lookups.
#[derive(Clone)]
pub struct GeocoderClient {
    client: Client,
    config: GeocoderConfig,
    cache: Arc<TtlCache<(GeoPoint, String)>>,
}

impl GeocoderClient {
    /// Builds a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: GeocoderConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            cache: Arc::new(TtlCache::new()),
        })
    }

    /// Resolves a free-text address to a point, restricting results to `country_code`
    /// (ISO 3166-1 alpha-2, lower-case) when it is present in the response.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidLocation`] if the address cannot be resolved or
    /// resolves outside `country_code`, or [`PlannerError::ExternalService`] once retries
    /// are exhausted.
    #[instrument(skip(self))]
    pub async fn geocode(&self, query: &str, country_code: &str) -> Result<(GeoPoint, String)> {
        let cache_key = digest_key(&format!("{}|{}", query.to_lowercase(), country_code));
        if let Some(hit) = self.cache.get(&cache_key) {
            return Ok(hit);
        }

        let url = format!("{}/search", self.config.base_url);
        let results: Vec<NominatimResult> = self.get_json(&url, query, country_code).await?;

        let first = results.first().ok_or_else(|| {
            PlannerError::InvalidLocation(format!("no geocoding match for '{query}'"))
        })?;

        let latitude: f64 = first
            .lat
            .parse()
            .map_err(|_| PlannerError::InvalidLocation(format!("malformed latitude for '{query}'")))?;
        let longitude: f64 = first
            .lon
            .parse()
            .map_err(|_| PlannerError::InvalidLocation(format!("malformed longitude for '{query}'")))?;
        let point = GeoPoint::new(latitude, longitude)
            .ok_or_else(|| PlannerError::InvalidLocation(format!("out-of-range coordinates for '{query}'")))?;

        let resolved_country = first
            .address
            .as_ref()
            .and_then(|addr| addr.country_code.clone())
            .unwrap_or_else(|| country_code.to_string());

        if !country_code.is_empty()
            && first
                .address
                .as_ref()
                .and_then(|addr| addr.country_code.as_deref())
                .is_some_and(|cc| !cc.eq_ignore_ascii_case(country_code))
        {
            return Err(PlannerError::InvalidLocation(format!(
                "'{query}' must be within {country_code}"
            )));
        }

        let result = (point, resolved_country);
        self.cache
            .insert(cache_key, result.clone(), self.config.cache_ttl);
        Ok(result)
    }

    async fn get_json(
        &self,
        url: &str,
        query: &str,
        country_code: &str,
    ) -> Result<Vec<NominatimResult>> {
        let mut last_error = None;

        for attempt in 0..=self.config.retry_count {
            let response = self
                .client
                .get(url)
                .header("Accept", "application/json")
                .header("User-Agent", &self.config.user_agent)
                .query(&[
                    ("q", query),
                    ("format", "jsonv2"),
                    ("limit", "1"),
                    ("addressdetails", "1"),
                    ("countrycodes", country_code),
                ])
                .send()
                .await;

            match response {
                Ok(response) if response.status().is_success() => {
                    let body = response.text().await?;
                    return serde_json::from_str(&body).map_err(|e| {
                        PlannerError::InvalidLocation(format!("malformed geocoder response: {e}"))
                    });
                }
                Ok(response) => {
                    last_error = Some(format!("geocoder returned status {}", response.status()));
                }
                Err(e) => last_error = Some(e.to_string()),
            }

            if attempt < self.config.retry_count {
                tokio::time::sleep(Duration::from_secs_f64(0.3 * f64::from(attempt + 1))).await;
            }
        }

        Err(PlannerError::ExternalService(
            last_error.unwrap_or_else(|| "geocoder request failed".to_string()),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    #[serde(default)]
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    country_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_case_insensitive_on_query_only() {
        let a = digest_key(&format!("{}|{}", "Tulsa, OK".to_lowercase(), "us"));
        let b = digest_key(&format!("{}|{}", "tulsa, ok".to_lowercase(), "us"));
        assert_eq!(a, b);
    }
}
