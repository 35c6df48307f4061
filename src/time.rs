//! Sidereal time and instant conversions.
//!
//! GMST drives both the geodetic conversion and the primary-body rotation
//! handed to the renderer.

use chrono::{DateTime, Utc};

pub const SECONDS_PER_DAY: f64 = 86400.0;
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36525.0;
pub const GMST_BASE_DEG: f64 = 280.46061837;
pub const GMST_ROTATION_PER_DAY: f64 = 360.98564736629;
pub const GMST_CORRECTION: f64 = 0.000387933;
/// 2000-01-01T12:00:00Z as a Unix timestamp.
const J2000_UNIX_SECONDS: f64 = 946_728_000.0;

/// Seconds since the Unix epoch with sub-second precision.
pub fn unix_seconds(instant: DateTime<Utc>) -> f64 {
    instant.timestamp() as f64 + instant.timestamp_subsec_nanos() as f64 * 1e-9
}

pub fn unix_minutes(instant: DateTime<Utc>) -> f64 {
    unix_seconds(instant) / 60.0
}

/// Greenwich Mean Sidereal Time in radians, `[0, 2PI)`.
pub fn greenwich_mean_sidereal_time(instant: DateTime<Utc>) -> f64 {
    let days_since_j2000 = (unix_seconds(instant) - J2000_UNIX_SECONDS) / SECONDS_PER_DAY;
    let centuries = days_since_j2000 / DAYS_PER_JULIAN_CENTURY;
    let gmst_degrees = GMST_BASE_DEG
        + GMST_ROTATION_PER_DAY * days_since_j2000
        + GMST_CORRECTION * centuries * centuries
        - centuries * centuries * centuries / 38710000.0;
    gmst_degrees.rem_euclid(360.0).to_radians()
}
