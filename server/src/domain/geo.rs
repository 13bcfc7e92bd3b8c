//! Great-circle distance

use crate::core::constants::EARTH_RADIUS_KM;

/// Haversine distance in kilometres between two (lat, lon) points in degrees
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    // Rounding can push `a` a hair above 1 for antipodal points
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}
