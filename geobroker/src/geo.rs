//! Great-circle distance and geo-circle intersection.
//!
//! Distance is delegated to the `haversine` crate rather than hand-rolled.

use haversine::{distance, Location, Units};

/// Distance in kilometers between two WGS84 points.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let p1 = Location { latitude: lat1, longitude: lon1 };
    let p2 = Location { latitude: lat2, longitude: lon2 };
    distance(p1, p2, Units::Kilometers)
}

/// Two geo-circles `(p1, r1)` and `(p2, r2)` intersect iff their distance is
/// no greater than the sum of their radii.
pub fn circles_intersect(lat1: f64, lon1: f64, r1: i64, lat2: f64, lon2: f64, r2: i64) -> bool {
    haversine_km(lat1, lon1, lat2, lon2) <= (r1 + r2) as f64
}
