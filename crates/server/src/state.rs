//! Application state shared across handlers.

use catalog::CatalogStore;
use ext_clients::{GeocoderClient, GeocoderConfig, RouterConfig, RoutingClient};
use planner_types::{
    Result, DEFAULT_FUEL_TANK_GALLONS, DEFAULT_MAX_CANDIDATE_STATIONS, DEFAULT_MAX_RANGE_MILES,
    DEFAULT_VEHICLE_MPG,
};
use std::env;
use std::sync::Arc;

/// Default vehicle parameters, resolved once at startup from the environment.
#[derive(Debug, Clone, Copy)]
pub struct DefaultVehicleParams {
    pub mpg: f64,
    pub tank_capacity_gallons: f64,
    pub max_range_miles: f64,
}

impl DefaultVehicleParams {
    fn from_env() -> Self {
        Self {
            mpg: env_f64("VEHICLE_MPG", DEFAULT_VEHICLE_MPG),
            tank_capacity_gallons: env_f64("FUEL_TANK_GALLONS", DEFAULT_FUEL_TANK_GALLONS),
            max_range_miles: env_f64("MAX_RANGE_MILES", DEFAULT_MAX_RANGE_MILES),
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub geocoder: GeocoderClient,
    pub router: RoutingClient,
    pub defaults: DefaultVehicleParams,
    pub max_candidate_stations: usize,
}

impl AppState {
    /// Builds application state from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog database or either HTTP client cannot be constructed.
    pub fn from_env() -> Result<Self> {
        let db = catalog::Database::from_env()
            .map_err(|e| planner_types::PlannerError::Validation(e.to_string()))?;
        let store = CatalogStore::new(db);
        store
            .init_schema()
            .map_err(|e| planner_types::PlannerError::Validation(e.to_string()))?;

        Self::new(store)
    }

    /// Builds application state from an already-constructed catalog store, used in tests.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client cannot be constructed.
    pub fn new(store: CatalogStore) -> Result<Self> {
        let geocoder = GeocoderClient::new(GeocoderConfig::from_env())?;
        let router = RoutingClient::new(RouterConfig::from_env())?;
        let max_candidate_stations = env::var("MAX_CANDIDATE_STATIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_CANDIDATE_STATIONS);

        Ok(Self {
            catalog: Arc::new(store),
            geocoder,
            router,
            defaults: DefaultVehicleParams::from_env(),
            max_candidate_stations,
        })
    }
}
