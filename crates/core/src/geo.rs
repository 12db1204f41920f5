//! Geographic calculation utilities
//!
//! Pure functions shared by the beacon scheduler: great-circle distance for
//! stationary detection and the signed course delta for corner pegging.

use libm::{atan2f, cosf, sinf, sqrtf};

/// Calculate the great-circle distance between two GPS positions in meters
/// using the Haversine formula.
///
/// # Arguments
///
/// * `lat1`, `lon1` - Start position in degrees
/// * `lat2`, `lon2` - End position in degrees
pub fn haversine_distance_m(lat1: f32, lon1: f32, lat2: f32, lon2: f32) -> f32 {
    const EARTH_RADIUS_M: f32 = 6_371_000.0;
    const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;

    let lat1_rad = lat1 * DEG_TO_RAD;
    let lat2_rad = lat2 * DEG_TO_RAD;
    let delta_lat = (lat2 - lat1) * DEG_TO_RAD;
    let delta_lon = (lon2 - lon1) * DEG_TO_RAD;

    let sin_dlat = sinf(delta_lat / 2.0);
    let sin_dlon = sinf(delta_lon / 2.0);
    let a = sin_dlat * sin_dlat + cosf(lat1_rad) * cosf(lat2_rad) * sin_dlon * sin_dlon;
    let c = 2.0 * atan2f(sqrtf(a), sqrtf(1.0 - a));

    EARTH_RADIUS_M * c
}

/// Smallest signed angular difference `current - reference` in degrees,
/// normalized to the half-open range (-180, 180].
///
/// A reversal (exactly 180° apart) reads as +180, never -180.
pub fn course_delta(current_deg: f32, reference_deg: f32) -> f32 {
    let mut delta = (current_deg - reference_deg) % 360.0;
    if delta > 180.0 {
        delta -= 360.0;
    } else if delta <= -180.0 {
        delta += 360.0;
    }
    delta
}
