//! great-circle distance and geofence predicates.
//!
//! pickup and delivery transitions are gated on a fixed 100-foot radius
//! around the target coordinate.

use crate::Coordinates;

/// pickup/delivery geofence radius in feet.
pub const RADIUS_FEET: f64 = 100.0;

/// feet per statute mile.
pub const FEET_PER_MILE: f64 = 5280.0;

/// earth's radius in miles for the haversine computation.
pub const EARTH_RADIUS_MILES: f64 = 3958.7613;

/// convert feet to miles.
pub fn feet_to_miles(feet: f64) -> f64 {
    feet / FEET_PER_MILE
}

/// great-circle distance between two points in miles, via the haversine
/// formula.
pub fn haversine_miles(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (d_lat / 2.0).sin();
    let sin_lng = (d_lng / 2.0).sin();

    let h = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_MILES * c
}

/// whether two points lie within `radius_feet` of each other.
pub fn is_within_radius(a: Coordinates, b: Coordinates, radius_feet: f64) -> bool {
    haversine_miles(a, b) * FEET_PER_MILE <= radius_feet
}
