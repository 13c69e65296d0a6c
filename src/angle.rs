//! Angle utilities shared by the orientation and histogram code.

use std::f64::consts::{PI, TAU};

/// Values this close to a full turn are treated as zero after wrapping.
pub const WRAP_SNAP_EPS: f64 = 1e-9;

/// Wraps an angle into the range [0, 2π).
///
/// Angles that land within [`WRAP_SNAP_EPS`] of 2π (typically tiny negative
/// round-off from `atan2`) snap back to 0 so they bin with their true value.
#[inline]
pub fn wrap_two_pi(angle: f64) -> f64 {
    let norm = angle.rem_euclid(TAU);
    if norm >= TAU - WRAP_SNAP_EPS {
        0.0
    } else {
        norm
    }
}

/// Converts degrees to radians.
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * (PI / 180.0)
}

/// Converts radians to degrees.
#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad * (180.0 / PI)
}

/// Clamps a cosine into [-1, 1] before `acos` so round-off cannot produce NaN.
#[inline]
pub fn safe_acos(cos: f64) -> f64 {
    cos.clamp(-1.0, 1.0).acos()
}
