use std::f64::consts::TAU;

/// Wraps an angle in radians into `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Shorter-arc distance between two angles, in `[0, π]`.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let delta = (normalize_angle(a) - normalize_angle(b)).abs();
    delta.min(TAU - delta)
}

pub fn within_beam(angle: f64, sweep: f64, beam_width: f64) -> bool {
    angular_distance(angle, sweep) < beam_width
}
