//! Composes geocoding, routing, station selection, and fuel-plan optimization into a single
//! `POST /api/v1/route-plan` response.

use crate::state::AppState;
use planner_types::{
    FuelStopPlan, GeoPoint, LineString, PlanAssumptions, PlanRequest, PlanResponse, PlanSummary,
    PlannerError, Result, VehicleParams,
};

/// Runs the full plan pipeline for one request.
///
/// # Errors
///
/// Returns [`PlannerError::Validation`] for out-of-range request fields,
/// [`PlannerError::InvalidLocation`]/[`PlannerError::NoRouteFound`] if either endpoint or the
/// route between them cannot be resolved, and [`PlannerError::NoFeasibleFuelPlan`] if no
/// purchase sequence completes the route.
pub async fn plan(state: &AppState, request: PlanRequest) -> Result<PlanResponse> {
    validate(&request)?;

    let params = VehicleParams {
        mpg: request.vehicle_mpg.unwrap_or(state.defaults.mpg),
        tank_capacity_gallons: request
            .tank_capacity_gallons
            .unwrap_or(state.defaults.tank_capacity_gallons),
        max_range_miles: request.max_range_miles.unwrap_or(state.defaults.max_range_miles),
    };

    let (start, finish) = tokio::try_join!(
        state.geocoder.geocode(&request.start_location, "us"),
        state.geocoder.geocode(&request.finish_location, "us"),
    )?;
    let start_point = start.0;
    let finish_point = finish.0;

    let route = state.router.route_through(&[start_point, finish_point]).await?;

    let candidates = route_graph::select(
        &state.catalog,
        &route.coordinates,
        request.corridor_miles,
        state.max_candidate_stations,
    )?;

    let start_fuel_gallons = params.tank_capacity_gallons * request.start_fuel_percent / 100.0;

    let result = route_graph::optimize_fuel_plan(
        &candidates,
        route.distance_miles,
        start_fuel_gallons,
        &params,
        request.optimizer,
    )?;

    Ok(build_response(start_point, finish_point, &route, &result, &params, &request))
}

fn validate(request: &PlanRequest) -> Result<()> {
    let mut problems = Vec::new();

    if !(3..=300).contains(&request.start_location.chars().count()) {
        problems.push("start_location must be 3..300 characters".to_string());
    }
    if !(3..=300).contains(&request.finish_location.chars().count()) {
        problems.push("finish_location must be 3..300 characters".to_string());
    }
    if !(0.0..=100.0).contains(&request.start_fuel_percent) {
        problems.push("start_fuel_percent must be within [0, 100]".to_string());
    }
    if !(1.0..=50.0).contains(&request.corridor_miles) {
        problems.push("corridor_miles must be within [1, 50]".to_string());
    }
    if let Some(mpg) = request.vehicle_mpg {
        if !(mpg > 0.0 && mpg <= 100.0) {
            problems.push("vehicle_mpg must be within (0, 100]".to_string());
        }
    }
    if let Some(tank) = request.tank_capacity_gallons {
        if !(tank > 0.0 && tank <= 300.0) {
            problems.push("tank_capacity_gallons must be within (0, 300]".to_string());
        }
    }
    if let Some(range) = request.max_range_miles {
        if !(range > 0.0 && range <= 2000.0) {
            problems.push("max_range_miles must be within (0, 2000]".to_string());
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(PlannerError::Validation(problems.join("; ")))
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn build_response(
    start: GeoPoint,
    finish: GeoPoint,
    route: &planner_types::RouteData,
    result: &planner_types::OptimizationResult,
    params: &VehicleParams,
    request: &PlanRequest,
) -> PlanResponse {
    let stops: Vec<FuelStopPlan> = result
        .stops
        .iter()
        .map(|stop| FuelStopPlan {
            latitude: round_to(stop.latitude, 6),
            longitude: round_to(stop.longitude, 6),
            milepost: round_to(stop.milepost, 3),
            distance_from_route_miles: round_to(stop.distance_from_route_miles, 3),
            price_per_gallon: round_to(stop.price_per_gallon, 3),
            gallons_purchased: round_to(stop.gallons_purchased, 3),
            cost: round_to(stop.cost, 2),
            fuel_before_gallons: round_to(stop.fuel_before_gallons, 3),
            fuel_after_gallons: round_to(stop.fuel_after_gallons, 3),
            ..stop.clone()
        })
        .collect();

    PlanResponse {
        start: GeoPoint {
            latitude: round_to(start.latitude, 6),
            longitude: round_to(start.longitude, 6),
        },
        finish: GeoPoint {
            latitude: round_to(finish.latitude, 6),
            longitude: round_to(finish.longitude, 6),
        },
        optimizer_used: result.optimizer_used,
        route_geojson: LineString {
            kind: "LineString",
            coordinates: route
                .coordinates
                .iter()
                .map(|&(lon, lat)| (round_to(lon, 6), round_to(lat, 6)))
                .collect(),
        },
        stops,
        summary: PlanSummary {
            distance_miles: round_to(route.distance_miles, 3),
            duration_minutes: round_to(route.duration_seconds / 60.0, 3),
            total_gallons_purchased: round_to(result.total_gallons_purchased, 3),
            total_fuel_cost: round_to(result.total_fuel_cost, 2),
            estimated_fuel_needed_gallons: round_to(route.distance_miles / params.mpg, 3),
        },
        assumptions: PlanAssumptions {
            vehicle_mpg: params.mpg,
            max_range_miles: params.max_range_miles,
            tank_capacity_gallons: params.tank_capacity_gallons,
            corridor_miles: request.corridor_miles,
        },
    }
}
