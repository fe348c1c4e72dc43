//! Geometry and time helpers. Pure functions, no state.

use crate::types::Vec2;

/// Smallest radius any circular shape may have.
pub const MIN_RADIUS: f64 = 1.0;
/// Smallest width/height/length of a rectangular shape or arena.
pub const MIN_DIMENSION: f64 = 1.0;
/// Smallest gap between a ring's inner and outer radius.
pub const MIN_RING_GAP: f64 = 4.0;
pub const MIN_SECTOR_DEG: f64 = 1.0;
pub const MAX_SECTOR_DEG: f64 = 360.0;

/// Clamp `v` into `[min, max]`. If the bounds are inverted, `min` wins.
pub fn clamp(v: f64, min: f64, max: f64) -> f64 {
    v.min(max).max(min)
}

pub fn rad_to_deg(rad: f64) -> f64 {
    rad.to_degrees()
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Interpolate `x` and `y` independently.
pub fn lerp_vec(a: Vec2, b: Vec2, t: f64) -> Vec2 {
    Vec2::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

pub fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}

/// z-index that puts something in front of everything in `existing`:
/// `1 + max(existing, 0)`.
pub fn front_z(existing: impl IntoIterator<Item = i64>) -> i64 {
    existing.into_iter().fold(0, i64::max) + 1
}

/// Rotation in degrees of the segment `from → to`, or `None` when the points
/// coincide.
pub fn bearing(from: Vec2, to: Vec2) -> Option<f64> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    Some(rad_to_deg(dy.atan2(dx)))
}
