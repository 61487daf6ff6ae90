//! Domain types shared between the catalog, the route-graph crate, and the server.

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Builds a point, rejecting coordinates outside the valid ranges.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
            Some(Self { latitude, longitude })
        } else {
            None
        }
    }
}

/// A catalog fuel station row.
///
/// `price_milli_dollars` is the fixed-point price (price per gallon times 1000); converting
/// to a float happens only at the store/selector boundary, never in the optimizer.
#[derive(Debug, Clone)]
pub struct Station {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub price_milli_dollars: i64,
    pub canonical_key: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub geocode_attempts: i32,
    pub geocode_failed: bool,
}

impl Station {
    #[must_use]
    pub fn price_per_gallon(&self) -> f64 {
        self.price_milli_dollars as f64 / 1000.0
    }

    /// The address string the geocoder is queried with.
    #[must_use]
    pub fn full_address(&self) -> String {
        format!("{}, {}, {}, USA", self.address, self.city, self.state)
    }
}

/// A catalog station projected onto a specific route.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateStation {
    pub station_id: i64,
    pub station_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price_per_gallon: f64,
    pub milepost: f64,
    pub distance_from_route_miles: f64,
}

/// A single fuel purchase decision produced by an optimizer.
#[derive(Debug, Clone, Serialize)]
pub struct FuelStopPlan {
    pub station_id: i64,
    pub station_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
    pub milepost: f64,
    pub distance_from_route_miles: f64,
    pub price_per_gallon: f64,
    pub gallons_purchased: f64,
    pub cost: f64,
    pub fuel_before_gallons: f64,
    pub fuel_after_gallons: f64,
}

/// Which planner produced an `OptimizationResult`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    #[default]
    Baseline,
    Ortools,
}

/// The output of a fuel-plan optimizer run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub stops: Vec<FuelStopPlan>,
    pub total_gallons_purchased: f64,
    pub total_fuel_cost: f64,
    pub optimizer_used: OptimizerKind,
}

/// Effective vehicle parameters after applying request overrides to defaults.
#[derive(Debug, Clone, Copy)]
pub struct VehicleParams {
    pub mpg: f64,
    pub tank_capacity_gallons: f64,
    pub max_range_miles: f64,
}

impl VehicleParams {
    /// The longest distance drivable on one full tank.
    #[must_use]
    pub fn effective_range_miles(&self) -> f64 {
        self.max_range_miles.min(self.tank_capacity_gallons * self.mpg)
    }
}

/// Route geometry and distance returned by the routing client.
#[derive(Debug, Clone)]
pub struct RouteData {
    /// `(longitude, latitude)` pairs, matching the external routing convention.
    pub coordinates: Vec<(f64, f64)>,
    pub distance_miles: f64,
    pub duration_seconds: f64,
}

/// Request body for `POST /api/v1/route-plan`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanRequest {
    pub start_location: String,
    pub finish_location: String,
    #[serde(default = "default_start_fuel_percent")]
    pub start_fuel_percent: f64,
    #[serde(default = "default_corridor_miles")]
    pub corridor_miles: f64,
    pub vehicle_mpg: Option<f64>,
    pub tank_capacity_gallons: Option<f64>,
    pub max_range_miles: Option<f64>,
    #[serde(default)]
    pub optimizer: OptimizerKind,
}

fn default_start_fuel_percent() -> f64 {
    100.0
}

fn default_corridor_miles() -> f64 {
    8.0
}

#[derive(Debug, Clone, Serialize)]
pub struct LineString {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub coordinates: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    pub distance_miles: f64,
    pub duration_minutes: f64,
    pub total_gallons_purchased: f64,
    pub total_fuel_cost: f64,
    pub estimated_fuel_needed_gallons: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanAssumptions {
    pub vehicle_mpg: f64,
    pub max_range_miles: f64,
    pub tank_capacity_gallons: f64,
    pub corridor_miles: f64,
}

/// Response body for `POST /api/v1/route-plan`.
#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    pub start: GeoPoint,
    pub finish: GeoPoint,
    pub optimizer_used: OptimizerKind,
    pub route_geojson: LineString,
    pub stops: Vec<FuelStopPlan>,
    pub summary: PlanSummary,
    pub assumptions: PlanAssumptions,
}
