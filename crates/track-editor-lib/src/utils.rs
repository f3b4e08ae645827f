//! Utility functions for distances and headings on the WGS84 sphere

use geo::Point;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6371000.0;

/// Maximum absolute latitude in degrees
pub const MAX_LATITUDE: f64 = 90.0;

/// Maximum absolute longitude in degrees
pub const MAX_LONGITUDE: f64 = 180.0;

/// Great-circle distance between two points in meters
///
/// Points carry longitude in `x` and latitude in `y`, like GPX waypoints.
#[inline(always)]
pub fn haversine_distance(p1: Point<f64>, p2: Point<f64>) -> f64 {
    let lat1 = p1.y().to_radians();
    let lat2 = p2.y().to_radians();
    let delta_lat = (p2.y() - p1.y()).to_radians();
    let delta_lon = (p2.x() - p1.x()).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial bearing from `p1` towards `p2`, in degrees clockwise from north
///
/// # Returns
/// A heading in `[0, 360)`; 0 for coincident points
#[inline(always)]
pub fn initial_bearing(p1: Point<f64>, p2: Point<f64>) -> f64 {
    let lat1 = p1.y().to_radians();
    let lat2 = p2.y().to_radians();
    let delta_lon = (p2.x() - p1.x()).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();
    if x == 0.0 && y == 0.0 {
        return 0.0;
    }
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Smallest turn between two headings, in degrees within `[0, 180]`
#[inline(always)]
pub fn bearing_delta(from: f64, to: f64) -> f64 {
    let delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 { 360.0 - delta } else { delta }
}

/// Check if a point is a finite WGS84 coordinate
#[inline(always)]
pub fn is_valid_coordinate(point: &Point<f64>) -> bool {
    let lon = point.x();
    let lat = point.y();
    lon.is_finite()
        && lat.is_finite()
        && lat.abs() <= MAX_LATITUDE
        && lon.abs() <= MAX_LONGITUDE
}

/// Convert a GPX timestamp to Unix seconds
#[inline]
pub fn gpx_time_to_seconds(time: gpx::Time) -> f64 {
    let time: time::OffsetDateTime = time.into();
    time.unix_timestamp_nanos() as f64 / 1e9
}

/// Convert Unix seconds to a GPX timestamp, `None` if out of range
#[inline]
pub fn seconds_to_gpx_time(seconds: f64) -> Option<gpx::Time> {
    if !seconds.is_finite() {
        return None;
    }
    let nanos = (seconds * 1e9).round() as i128;
    time::OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .map(gpx::Time::from)
}
