//! Small interpolation helpers shared by the sensing and scene modules

/// Linear interpolation between `a` and `b` by `t`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Where `x` falls between `a` and `b`, unclamped. Returns 0 when the range
/// is degenerate so a bad calibration can never divide by zero.
pub fn inverse_lerp(a: f32, b: f32, x: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    (x - a) / (b - a)
}

/// Clamp into the unit interval.
pub fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}
