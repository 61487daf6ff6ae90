//! Projects catalog stations onto a route polyline and keeps the ones worth considering.

use crate::geo::{haversine_miles, lon_lat_to_miles_xy};
use catalog::CatalogStore;
use planner_types::{CandidateStation, PlannerError, Result};
use std::collections::HashMap;

/// Routes longer than this many points are simplified before projection.
const MAX_POLYLINE_POINTS: usize = 1500;
/// Width of a milepost bucket used for down-sampling, in miles.
const BUCKET_MILES: f64 = 25.0;
/// Cheapest-per-bucket cap applied before the global cap.
const TOP_PER_BUCKET: usize = 3;

/// Selects candidate fuel stations along `route_coordinates` (`(lon, lat)` pairs, matching
/// the routing engine's convention), within `corridor_miles` of the route, down-sampled to
/// at most `max_candidates` and ordered by milepost ascending.
///
/// # Errors
///
/// Returns an error if the catalog store cannot be queried.
pub fn select(
    store: &CatalogStore,
    route_coordinates: &[(f64, f64)],
    corridor_miles: f64,
    max_candidates: usize,
) -> Result<Vec<CandidateStation>> {
    let polyline = simplify_polyline(route_coordinates);
    let cumulative = cumulative_mileage(&polyline);

    let (min_lon, max_lon, min_lat, max_lat) = bounding_box(&polyline);
    let margin = corridor_miles / 69.0;

    let stations = store
        .stations_in_bbox(min_lon - margin, max_lon + margin, min_lat - margin, max_lat + margin)
        .map_err(|e| PlannerError::ExternalService(e.to_string()))?;

    let mut candidates = Vec::new();
    for station in &stations {
        let (Some(lat), Some(lon)) = (station.latitude, station.longitude) else {
            continue;
        };

        if let Some((milepost, distance)) = project_onto_polyline(lon, lat, &polyline, &cumulative) {
            if distance <= corridor_miles {
                candidates.push(CandidateStation {
                    station_id: station.id,
                    station_name: station.name.clone(),
                    address: station.address.clone(),
                    city: station.city.clone(),
                    state: station.state.clone(),
                    latitude: lat,
                    longitude: lon,
                    price_per_gallon: station.price_per_gallon(),
                    milepost,
                    distance_from_route_miles: distance,
                });
            }
        }
    }

    let mut candidates = downsample(candidates, max_candidates);
    candidates.sort_by(|a, b| {
        a.milepost
            .partial_cmp(&b.milepost)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.price_per_gallon.partial_cmp(&b.price_per_gallon).unwrap_or(std::cmp::Ordering::Equal))
    });
    Ok(candidates)
}

fn simplify_polyline(route_coordinates: &[(f64, f64)]) -> Vec<(f64, f64)> {
    if route_coordinates.len() <= MAX_POLYLINE_POINTS {
        return route_coordinates.to_vec();
    }

    let stride = route_coordinates.len() / MAX_POLYLINE_POINTS;
    let mut simplified: Vec<(f64, f64)> = route_coordinates.iter().step_by(stride.max(1)).copied().collect();

    if simplified.last() != route_coordinates.last() {
        if let Some(&last) = route_coordinates.last() {
            simplified.push(last);
        }
    }
    simplified
}

fn cumulative_mileage(polyline: &[(f64, f64)]) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(polyline.len());
    cumulative.push(0.0);
    for window in polyline.windows(2) {
        let (lon0, lat0) = window[0];
        let (lon1, lat1) = window[1];
        let prev = *cumulative.last().unwrap_or(&0.0);
        cumulative.push(prev + haversine_miles(lat0, lon0, lat1, lon1));
    }
    cumulative
}

fn bounding_box(polyline: &[(f64, f64)]) -> (f64, f64, f64, f64) {
    let mut min_lon = f64::MAX;
    let mut max_lon = f64::MIN;
    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;

    for &(lon, lat) in polyline {
        min_lon = min_lon.min(lon);
        max_lon = max_lon.max(lon);
        min_lat = min_lat.min(lat);
        max_lat = max_lat.max(lat);
    }

    (min_lon, max_lon, min_lat, max_lat)
}

/// Returns `(milepost, perpendicular_distance_miles)` of the closest point on the polyline
/// to `(lon, lat)`, or `None` if the polyline has no non-degenerate segments.
fn project_onto_polyline(
    lon: f64,
    lat: f64,
    polyline: &[(f64, f64)],
    cumulative: &[f64],
) -> Option<(f64, f64)> {
    let mut best: Option<(f64, f64)> = None;

    for (i, window) in polyline.windows(2).enumerate() {
        let (lon0, lat0) = window[0];
        let (lon1, lat1) = window[1];
        let ref_lat = (lat0 + lat1) / 2.0;

        let (seg_x, seg_y) = lon_lat_to_miles_xy(lon1 - lon0, lat1 - lat0, ref_lat);
        let (pt_x, pt_y) = lon_lat_to_miles_xy(lon - lon0, lat - lat0, ref_lat);

        let seg_len_sq = seg_x * seg_x + seg_y * seg_y;
        if seg_len_sq < 1e-9 {
            continue;
        }

        let t = ((pt_x * seg_x + pt_y * seg_y) / seg_len_sq).clamp(0.0, 1.0);
        let closest_x = t * seg_x;
        let closest_y = t * seg_y;
        let dx = pt_x - closest_x;
        let dy = pt_y - closest_y;
        let distance = (dx * dx + dy * dy).sqrt();

        let milepost = cumulative.get(i).copied().unwrap_or(0.0)
            + t * (cumulative.get(i + 1).copied().unwrap_or(0.0) - cumulative.get(i).copied().unwrap_or(0.0));

        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((milepost, distance)),
        }
    }

    best
}

fn downsample(candidates: Vec<CandidateStation>, max_candidates: usize) -> Vec<CandidateStation> {
    if candidates.len() <= max_candidates {
        return candidates;
    }

    let mut buckets: HashMap<i64, Vec<CandidateStation>> = HashMap::new();
    for candidate in candidates {
        let bucket = (candidate.milepost / BUCKET_MILES).floor() as i64;
        buckets.entry(bucket).or_default().push(candidate);
    }

    let mut survivors = Vec::new();
    for bucket in buckets.values_mut() {
        bucket.sort_by(|a, b| a.price_per_gallon.partial_cmp(&b.price_per_gallon).unwrap_or(std::cmp::Ordering::Equal));
        survivors.extend(bucket.drain(..bucket.len().min(TOP_PER_BUCKET)));
    }

    if survivors.len() > max_candidates {
        survivors.sort_by(|a, b| a.price_per_gallon.partial_cmp(&b.price_per_gallon).unwrap_or(std::cmp::Ordering::Equal));
        survivors.truncate(max_candidates);
    }

    survivors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_is_sound_for_a_station_near_a_straight_segment() {
        let polyline = vec![(-95.0, 36.0), (-94.0, 36.0)];
        let cumulative = cumulative_mileage(&polyline);

        // Roughly halfway along, a third of a mile north of the route.
        let (milepost, distance) = project_onto_polyline(-94.5, 36.005, &polyline, &cumulative)
            .expect("projects onto the segment");

        let total = *cumulative.last().expect("nonempty");
        assert!(milepost > 0.0 && milepost < total);
        assert!(distance < 1.0);
    }

    #[test]
    fn station_far_outside_corridor_has_large_distance() {
        let polyline = vec![(-95.0, 36.0), (-94.0, 36.0)];
        let cumulative = cumulative_mileage(&polyline);
        let (_, distance) = project_onto_polyline(-94.5, 40.0, &polyline, &cumulative).expect("projects");
        assert!(distance > 50.0);
    }
}
