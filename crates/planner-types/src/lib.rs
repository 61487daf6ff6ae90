//! Shared domain types and error taxonomy for the fuel-route planner.
//!
//! Kept as its own crate so that `catalog`, `ext-clients`, `route-graph`, and `server` can
//! all depend on the same types without pulling each other in.

mod domain;
mod error;

pub use domain::{
    CandidateStation, FuelStopPlan, GeoPoint, LineString, OptimizationResult, OptimizerKind,
    PlanAssumptions, PlanRequest, PlanResponse, PlanSummary, RouteData, Station, VehicleParams,
};
pub use error::{PlannerError, Result};

/// Default miles-per-gallon when a request does not override it.
pub const DEFAULT_VEHICLE_MPG: f64 = 10.0;
/// Default tank capacity in gallons when a request does not override it.
pub const DEFAULT_FUEL_TANK_GALLONS: f64 = 50.0;
/// Default maximum single-tank range in miles when a request does not override it.
pub const DEFAULT_MAX_RANGE_MILES: f64 = 500.0;
/// Default lateral corridor half-width, in miles, used when a request omits it.
pub const DEFAULT_CORRIDOR_MILES: f64 = 8.0;
/// Hard cap on the number of candidate stations passed to an optimizer.
pub const DEFAULT_MAX_CANDIDATE_STATIONS: usize = 600;
