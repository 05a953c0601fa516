/// 2D arc/bulge math utilities.
///
/// Bulge convention: `bulge = tan(sweep_angle / 4)`.
/// - `bulge = 0`: straight line
/// - `bulge > 0`: counter-clockwise arc
/// - `bulge < 0`: clockwise arc
/// - `|bulge| = 1`: semicircle
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use super::Point2;

/// An arc in center-radius-angle form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParams {
    pub center: Point2,
    pub radius: f64,
    pub start_angle: f64,
    /// Signed sweep; positive is counter-clockwise.
    pub sweep: f64,
}

/// Converts a bulge-defined arc segment to center-radius-angle form.
///
/// Returns `None` for a zero-length chord or a zero bulge (a straight line).
#[must_use]
pub fn arc_from_bulge(p0: Point2, p1: Point2, bulge: f64) -> Option<ArcParams> {
    let d = p1 - p0;
    let chord_len = d.norm();
    if chord_len < 1e-12 || bulge.abs() < 1e-12 {
        return None;
    }

    // Distance from chord midpoint to center, in half-chord units.
    let sagitta_ratio = (1.0 - bulge * bulge) / (2.0 * bulge);
    let mid = nalgebra::center(&p0, &p1);

    // Left normal of the chord; the center lies on it for positive bulge.
    let normal = nalgebra::Vector2::new(-d.y, d.x) / chord_len;
    let center = mid + normal * (sagitta_ratio * chord_len * 0.5);

    // r = d*(1+b²)/(4*|b|)
    let radius = (chord_len * 0.5) * (1.0 + bulge * bulge) / (2.0 * bulge.abs());
    let start_angle = (p0.y - center.y).atan2(p0.x - center.x);
    let sweep = 4.0 * bulge.atan();

    Some(ArcParams {
        center,
        radius,
        start_angle,
        sweep,
    })
}

/// Returns `true` if `angle` lies within the angular span of the arc.
#[must_use]
pub fn arc_contains_angle(arc: &ArcParams, angle: f64) -> bool {
    if arc.sweep.abs() >= TAU {
        return true;
    }
    let rel = if arc.sweep >= 0.0 {
        (angle - arc.start_angle).rem_euclid(TAU)
    } else {
        (arc.start_angle - angle).rem_euclid(TAU)
    };
    rel <= arc.sweep.abs()
}

/// Returns the axis-aligned extreme points reached by the arc interior.
///
/// Endpoints are not included; callers add them separately.
#[must_use]
pub fn arc_axis_extremes(arc: &ArcParams) -> Vec<Point2> {
    [0.0, FRAC_PI_2, PI, -FRAC_PI_2]
        .into_iter()
        .filter(|&angle| arc_contains_angle(arc, angle))
        .map(|angle| {
            Point2::new(
                arc.center.x + arc.radius * angle.cos(),
                arc.center.y + arc.radius * angle.sin(),
            )
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn semicircle_from_unit_bulge() {
        let arc = arc_from_bulge(Point2::new(1.0, 0.0), Point2::new(-1.0, 0.0), 1.0).unwrap();
        assert!((arc.center - Point2::origin()).norm() < 1e-12);
        assert!((arc.radius - 1.0).abs() < 1e-12);
        assert!((arc.sweep - PI).abs() < 1e-12);
    }

    #[test]
    fn zero_bulge_is_not_an_arc() {
        assert!(arc_from_bulge(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), 0.0).is_none());
    }

    #[test]
    fn ccw_semicircle_reaches_top() {
        let arc = arc_from_bulge(Point2::new(1.0, 0.0), Point2::new(-1.0, 0.0), 1.0).unwrap();
        let extremes = arc_axis_extremes(&arc);
        assert!(extremes.iter().any(|p| (p - Point2::new(0.0, 1.0)).norm() < 1e-12));
        assert!(!extremes.iter().any(|p| (p - Point2::new(0.0, -1.0)).norm() < 1e-12));
    }

    #[test]
    fn cw_semicircle_reaches_bottom() {
        let arc = arc_from_bulge(Point2::new(1.0, 0.0), Point2::new(-1.0, 0.0), -1.0).unwrap();
        let extremes = arc_axis_extremes(&arc);
        assert!(extremes.iter().any(|p| (p - Point2::new(0.0, -1.0)).norm() < 1e-12));
        assert!(!extremes.iter().any(|p| (p - Point2::new(0.0, 1.0)).norm() < 1e-12));
    }
}
