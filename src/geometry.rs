// ============================================================================
// GEOMETRY
// ============================================================================

use crate::sample::PolarSample;
use std::ops::{Add, Mul};

/// Angle offset applied before projection so that sensor angle 0 points up the screen.
pub const ANGLE_ORIGIN_DEG: f64 = 90.0;

/// Cartesian offset in millimetres from the sensor, or a pixel position on a surface.
///
/// Screen convention: +X is right, +Y is down, so "forward" is -Y.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Larger of the two absolute coordinates (Chebyshev norm)
    #[inline]
    pub fn max_abs(&self) -> f64 {
        self.x.abs().max(self.y.abs())
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    #[inline]
    fn mul(self, scale: f64) -> Point {
        Point::new(self.x * scale, self.y * scale)
    }
}

/// Project a polar sample onto the screen-aligned Cartesian frame.
pub fn to_cartesian(sample: PolarSample) -> Point {
    let rads = (sample.angle_deg - ANGLE_ORIGIN_DEG).to_radians();
    let distance = f64::from(sample.distance_mm);
    Point::new(distance * rads.cos(), distance * rads.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(angle_deg: f64, distance_mm: u32) -> PolarSample {
        PolarSample {
            angle_deg,
            distance_mm,
        }
    }

    #[test]
    fn right_angle_points_along_positive_x() {
        let p = to_cartesian(sample(90.0, 100));
        assert_relative_eq!(p.x, 100.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_angle_points_up_the_screen() {
        let p = to_cartesian(sample(0.0, 100));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, -100.0, epsilon = 1e-9);
    }

    #[test]
    fn half_turn_points_down_the_screen() {
        let p = to_cartesian(sample(180.0, 200));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 200.0, epsilon = 1e-9);
    }

    #[test]
    fn angles_wrap_past_full_turn() {
        let a = to_cartesian(sample(30.0, 500));
        let b = to_cartesian(sample(390.0, 500));
        let c = to_cartesian(sample(-330.0, 500));
        assert_relative_eq!(a.x, b.x, epsilon = 1e-9);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-9);
        assert_relative_eq!(a.x, c.x, epsilon = 1e-9);
        assert_relative_eq!(a.y, c.y, epsilon = 1e-9);
    }

    #[test]
    fn zero_distance_maps_to_origin() {
        let p = to_cartesian(sample(123.4, 0));
        assert_eq!(p.max_abs(), 0.0);
    }

    #[test]
    fn point_arithmetic() {
        let p = Point::new(3.0, -4.0) * 2.0 + Point::new(1.0, 1.0);
        assert_eq!(p, Point::new(7.0, -7.0));
        assert_eq!(p.max_abs(), 7.0);
    }
}
