use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::math::arc_2d::{arc_axis_extremes, arc_from_bulge};
use crate::math::Point2;

/// Bulge-encoded path vertex for mixed line/arc segments.
///
/// `bulge = tan(sweep_angle / 4)` describes the segment that starts at this
/// vertex: `0` is a straight line, positive a counter-clockwise arc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathVertex {
    pub x: f64,
    pub y: f64,
    pub bulge: f64,
}

impl PathVertex {
    /// Creates a new vertex with the given coordinates and bulge.
    #[must_use]
    pub fn new(x: f64, y: f64, bulge: f64) -> Self {
        Self { x, y, bulge }
    }

    /// Creates a line vertex (bulge = 0).
    #[must_use]
    pub fn line(x: f64, y: f64) -> Self {
        Self { x, y, bulge: 0.0 }
    }

    fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// A closed planar profile made of line and arc segments, lying in the XY
/// plane of its shape frame.
///
/// The last vertex always connects back to the first. A clockwise profile
/// has material inside; a counter-clockwise one is a hollow with material
/// outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePath {
    vertices: Vec<PathVertex>,
}

impl LinePath {
    /// Creates a closed path.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two vertices are given, a value is not
    /// finite, or two consecutive vertices coincide.
    pub fn new(vertices: Vec<PathVertex>) -> Result<Self, GeometryError> {
        if vertices.len() < 2 {
            return Err(GeometryError::Degenerate(
                "a closed path needs at least two vertices".into(),
            ));
        }
        if vertices
            .iter()
            .any(|v| !(v.x.is_finite() && v.y.is_finite() && v.bulge.is_finite()))
        {
            return Err(GeometryError::NonFinite("path vertex"));
        }
        let n = vertices.len();
        for i in 0..n {
            let a = vertices[i].point();
            let b = vertices[(i + 1) % n].point();
            if (b - a).norm() < 1e-12 {
                return Err(GeometryError::Degenerate(format!(
                    "path segment {i} has zero length"
                )));
            }
        }
        Ok(Self { vertices })
    }

    #[must_use]
    pub fn vertices(&self) -> &[PathVertex] {
        &self.vertices
    }

    /// Returns the number of segments; equal to the vertex count since the
    /// path is closed.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.vertices.len()
    }

    fn segments(&self) -> impl Iterator<Item = (&PathVertex, &PathVertex)> {
        let n = self.vertices.len();
        (0..n).map(move |i| (&self.vertices[i], &self.vertices[(i + 1) % n]))
    }

    /// Signed enclosed area; positive for counter-clockwise profiles.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        self.segments()
            .map(|(v0, v1)| {
                let chord = 0.5 * (v0.x * v1.y - v1.x * v0.y);
                let bow = arc_from_bulge(v0.point(), v1.point(), v0.bulge).map_or(0.0, |arc| {
                    0.5 * arc.radius * arc.radius * (arc.sweep - arc.sweep.sin())
                });
                chord + bow
            })
            .sum()
    }

    /// Returns `true` if the profile encloses material (clockwise winding).
    #[must_use]
    pub fn is_solid(&self) -> bool {
        self.signed_area() < 0.0
    }

    /// Returns the 2D bounding rectangle as `(min, max)`, including the
    /// bulge of every arc.
    #[must_use]
    pub fn bounds(&self) -> (Point2, Point2) {
        let mut min = Point2::new(f64::MAX, f64::MAX);
        let mut max = Point2::new(-f64::MAX, -f64::MAX);
        for (v0, v1) in self.segments() {
            let mut pts = vec![v0.point()];
            if let Some(arc) = arc_from_bulge(v0.point(), v1.point(), v0.bulge) {
                pts.extend(arc_axis_extremes(&arc));
            }
            for p in &pts {
                min = min.inf(p);
                max = max.sup(p);
            }
        }
        (min, max)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn square_cw() -> LinePath {
        LinePath::new(vec![
            PathVertex::line(0.0, 0.0),
            PathVertex::line(0.0, 1.0),
            PathVertex::line(1.0, 1.0),
            PathVertex::line(1.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn clockwise_square_is_solid() {
        let p = square_cw();
        assert!((p.signed_area() + 1.0).abs() < 1e-12);
        assert!(p.is_solid());
        assert_eq!(p.segment_count(), 4);
    }

    #[test]
    fn circle_from_two_semicircles() {
        let p = LinePath::new(vec![
            PathVertex::new(1.0, 0.0, 1.0),
            PathVertex::new(-1.0, 0.0, 1.0),
        ])
        .unwrap();
        assert!((p.signed_area() - PI).abs() < 1e-9);
        assert!(!p.is_solid());
        let (min, max) = p.bounds();
        assert!((min - Point2::new(-1.0, -1.0)).norm() < 1e-9);
        assert!((max - Point2::new(1.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn single_vertex_is_rejected() {
        assert!(LinePath::new(vec![PathVertex::line(0.0, 0.0)]).is_err());
    }

    #[test]
    fn repeated_vertex_is_rejected() {
        let r = LinePath::new(vec![
            PathVertex::line(0.0, 0.0),
            PathVertex::line(0.0, 0.0),
            PathVertex::line(1.0, 0.0),
        ]);
        assert!(r.is_err());
    }
}
