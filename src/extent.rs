// ============================================================================
// EXTENT AND AUTO-SCALE
// ============================================================================

use crate::geometry::Point;

/// Fraction of the surface side the extent ring spans from the centre (10% margin each side)
pub const VIEW_FILL: f64 = 0.45;

/// Divisor used in place of a zero or non-finite extent
pub const MIN_EXTENT_MM: f64 = 1.0;

/// The point set was empty, so there is no extent to scale to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no points to measure")]
pub struct DegenerateExtent;

/// Largest absolute coordinate over all points.
pub fn max_extent<'a, I>(points: I) -> Result<f64, DegenerateExtent>
where
    I: IntoIterator<Item = &'a Point>,
{
    points
        .into_iter()
        .map(Point::max_abs)
        .reduce(f64::max)
        .ok_or(DegenerateExtent)
}

/// Pixels per millimetre so that `extent` lands at [`VIEW_FILL`] of `size` from the centre.
pub fn display_scale(size: u32, extent: f64) -> f64 {
    let usable = f64::from(size) * VIEW_FILL;
    let extent = if extent.is_finite() && extent > 0.0 {
        extent
    } else {
        MIN_EXTENT_MM
    };
    usable / extent
}
