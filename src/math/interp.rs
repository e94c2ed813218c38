//! Scalar and angular interpolation helpers.
//!
//! Angles are in degrees throughout the crate.

/// Linear interpolation between `a` and `b`, `t` clamped to `[0, 1]`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Signed shortest difference from `from` to `to`, in `(-180, 180]`.
pub fn delta_angle(from: f32, to: f32) -> f32 {
    let mut delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

/// Interpolate between two headings along the shortest arc.
pub fn lerp_angle(a: f32, b: f32, t: f32) -> f32 {
    a + delta_angle(a, b) * t.clamp(0.0, 1.0)
}

/// Unit horizontal heading vector for an angle around +Y. 0 degrees is +Z,
/// 90 degrees is +X.
#[inline]
pub fn heading_vector(degrees: f32) -> glam::Vec3 {
    let radians = degrees.to_radians();
    glam::Vec3::new(radians.sin(), 0.0, radians.cos())
}
