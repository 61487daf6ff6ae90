//! Pure geometric functions: great-circle distance and a local equirectangular projection.

/// Mean Earth radius, in miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.7613;

/// Miles per degree of latitude (constant everywhere).
pub const MILES_PER_DEGREE_LAT: f64 = 69.0;

/// Great-circle distance between two points, in miles.
#[must_use]
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_MILES * c
}

/// Converts a `(lon, lat)` offset in degrees, relative to some reference point at latitude
/// `ref_lat`, into a local `(x_miles, y_miles)` pair.
///
/// This is an equirectangular projection: adequate for segment-local geometry over a few
/// miles, not for long distances (use [`haversine_miles`] for those).
#[must_use]
pub fn lon_lat_to_miles_xy(lon: f64, lat: f64, ref_lat: f64) -> (f64, f64) {
    let miles_per_degree_lon = MILES_PER_DEGREE_LAT * ref_lat.to_radians().cos();
    (lon * miles_per_degree_lon, lat * MILES_PER_DEGREE_LAT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_zero_distance() {
        assert!((haversine_miles(36.0, -95.0, 36.0, -95.0)).abs() < 1e-9);
    }

    #[test]
    fn haversine_known_pair() {
        // Tulsa, OK to Oklahoma City, OK is roughly 98 miles.
        let miles = haversine_miles(36.1540, -95.9928, 35.4676, -97.5164);
        assert!((miles - 98.0).abs() < 5.0, "got {miles}");
    }

    #[test]
    fn projection_matches_haversine_over_short_segment() {
        let ref_lat = 36.0;
        let (x, y) = lon_lat_to_miles_xy(0.05, 0.05, ref_lat);
        let direct = haversine_miles(ref_lat, -95.0, ref_lat + 0.05, -95.0 + 0.05);
        let projected = (x * x + y * y).sqrt();
        assert!((projected - direct).abs() < 0.5, "projected={projected} direct={direct}");
    }
}
