//! Client for an OSRM-compatible driving-route engine.

use crate::config::RouterConfig;
use cache::{digest_key, TtlCache};
use planner_types::{GeoPoint, PlannerError, Result, RouteData};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

const METERS_PER_MILE: f64 = 0.000_621_371;

/// Client for `/route/v1/driving/{coords}`, with retry and cache-aside lookups.
#[derive(Clone)]
pub struct RoutingClient {
    client: Client,
    config: RouterConfig,
    cache: Arc<TtlCache<RouteData>>,
}

impl RoutingClient {
    /// Builds a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: RouterConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            cache: Arc::new(TtlCache::new()),
        })
    }

    /// Requests a driving route through `waypoints`, in order. Requires at least two points.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::NoRouteFound`] if fewer than two waypoints are given or the
    /// engine returns degenerate geometry, or [`PlannerError::ExternalService`] once retries
    /// are exhausted.
    #[instrument(skip(self))]
    pub async fn route_through(&self, waypoints: &[GeoPoint]) -> Result<RouteData> {
        if waypoints.len() < 2 {
            return Err(PlannerError::NoRouteFound(
                "at least two waypoints are required".to_string(),
            ));
        }

        let cache_key = digest_key(&waypoint_key(waypoints));
        if let Some(hit) = self.cache.get(&cache_key) {
            return Ok(hit);
        }

        let coords = waypoints
            .iter()
            .map(|p| format!("{},{}", p.longitude, p.latitude))
            .collect::<Vec<_>>()
            .join(";");
        let url = format!("{}/route/v1/driving/{}", self.config.base_url, coords);

        let body = self.get_json(&url).await?;

        if body.code != "Ok" {
            return Err(PlannerError::NoRouteFound(format!(
                "routing engine returned code '{}'",
                body.code
            )));
        }

        let route = body
            .routes
            .first()
            .ok_or_else(|| PlannerError::NoRouteFound("no routes in response".to_string()))?;

        if route.geometry.coordinates.len() < 2 {
            return Err(PlannerError::NoRouteFound(
                "route geometry has fewer than two points".to_string(),
            ));
        }

        let route_data = RouteData {
            coordinates: route
                .geometry
                .coordinates
                .iter()
                .map(|pair| (pair[0], pair[1]))
                .collect(),
            distance_miles: route.distance * METERS_PER_MILE,
            duration_seconds: route.duration,
        };

        self.cache
            .insert(cache_key, route_data.clone(), self.config.cache_ttl);
        Ok(route_data)
    }

    async fn get_json(&self, url: &str) -> Result<OsrmResponse> {
        let mut last_error = None;

        for attempt in 0..=self.config.retry_count {
            let response = self
                .client
                .get(url)
                .query(&[
                    ("overview", "full"),
                    ("geometries", "geojson"),
                    ("steps", "false"),
                    ("annotations", "false"),
                ])
                .send()
                .await;

            match response {
                Ok(response) if response.status().is_success() => {
                    let text = response.text().await?;
                    return serde_json::from_str(&text).map_err(|e| {
                        PlannerError::NoRouteFound(format!("malformed routing response: {e}"))
                    });
                }
                Ok(response) => {
                    last_error = Some(format!("routing engine returned status {}", response.status()));
                }
                Err(e) => last_error = Some(e.to_string()),
            }

            if attempt < self.config.retry_count {
                tokio::time::sleep(Duration::from_secs_f64(0.3 * f64::from(attempt + 1))).await;
            }
        }

        Err(PlannerError::ExternalService(
            last_error.unwrap_or_else(|| "routing request failed".to_string()),
        ))
    }
}

fn waypoint_key(waypoints: &[GeoPoint]) -> String {
    waypoints
        .iter()
        .map(|p| format!("{:.5}:{:.5}", p.latitude, p.longitude))
        .collect::<Vec<_>>()
        .join("|")
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waypoint_key_rounds_to_five_decimals() {
        let a = waypoint_key(&[
            GeoPoint { latitude: 36.123_456, longitude: -95.987_654 },
            GeoPoint { latitude: 37.0, longitude: -96.0 },
        ]);
        let b = waypoint_key(&[
            GeoPoint { latitude: 36.123_455_9, longitude: -95.987_654_1 },
            GeoPoint { latitude: 37.0, longitude: -96.0 },
        ]);
        assert_eq!(a, b);
    }
}
