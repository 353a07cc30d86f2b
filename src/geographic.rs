//! Great-circle distances
//!
//! Travel distance between waypoints is approximated by the haversine distance
//! on a sphere with the earth's mean radius. This is not a road-network
//! distance, but it orders candidate routes the same way often enough for
//! trip planning, and it is cheap.

use dimensioned::si::{M, Meter};

use crate::measure::Kilometers;
use crate::types::GeoPoint;

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points, by the haversine formula.
///
/// Symmetric and non-negative, and zero for identical points. Results for
/// nearly antipodal points lose precision, since `1 - h` approaches zero.
pub fn haversine_distance(point1: &GeoPoint, point2: &GeoPoint) -> Meter<f64> {
    let phi1 = point1.lat().to_radians();
    let phi2 = point2.lat().to_radians();
    let dphi = (point2.lat() - point1.lat()).to_radians();
    let dlambda = (point2.lon() - point1.lon()).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt()) * M
}

/// Great-circle distance in plain kilometers.
pub fn haversine_km(point1: &GeoPoint, point2: &GeoPoint) -> f64 {
    Kilometers::<f64>::from(haversine_distance(point1, point2)).0
}

/// Total length of the path visiting `points` in order.
pub fn path_length(points: &[GeoPoint]) -> Meter<f64> {
    points
        .windows(2)
        .fold(0.0 * M, |acc, w| acc + haversine_distance(&w[0], &w[1]))
}
