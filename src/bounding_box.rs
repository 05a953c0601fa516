use serde::{Deserialize, Serialize};

use crate::math::{Point3, Pose, Vector3};

/// An axis-aligned bounding box.
///
/// An empty box has `min > max` on every axis and absorbs the first point
/// merged into it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Creates a box from its two corners.
    #[must_use]
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Creates an empty box.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(-f64::MAX, -f64::MAX, -f64::MAX),
        }
    }

    /// Creates a box symmetric about the origin.
    #[must_use]
    pub fn from_half_extents(half: Vector3) -> Self {
        Self {
            min: Point3::from(-half),
            max: Point3::from(half),
        }
    }

    /// Creates the tightest box around `points`; empty if there are none.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        points.into_iter().fold(Self::empty(), |mut acc, p| {
            acc.expand_by_point(p);
            acc
        })
    }

    /// Returns `true` if no point was ever merged into the box.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_by_point(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Returns the union of two boxes.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Returns the box grown by `amount` on every side.
    #[must_use]
    pub fn inflated(&self, amount: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        let d = Vector3::repeat(amount);
        Self {
            min: self.min - d,
            max: self.max + d,
        }
    }

    /// Returns the eight corners of the box.
    #[must_use]
    pub fn corners(&self) -> [Point3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, b.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(b.x, b.y, a.z),
        ]
    }

    /// Returns the box enclosing this box after it is moved by `pose`.
    #[must_use]
    pub fn transformed(&self, pose: &Pose) -> Self {
        if self.is_empty() {
            return *self;
        }
        let corners = self.corners().map(|c| pose * c);
        Self::from_points(&corners)
    }

    /// Returns the extent of the box along each axis.
    #[must_use]
    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns `true` if the two boxes overlap or touch.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.is_empty()
            || other.is_empty()
            || self.max.x < other.min.x
            || other.max.x < self.min.x
            || self.max.y < other.min.y
            || other.max.y < self.min.y
            || self.max.z < other.min.z
            || other.max.z < self.min.z)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::UnitQuaternion;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn empty_box_absorbs_first_point() {
        let mut b = Aabb::empty();
        assert!(b.is_empty());
        b.expand_by_point(&Point3::new(1.0, 2.0, 3.0));
        assert!(!b.is_empty());
        assert_eq!(b.min, b.max);
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let b = Aabb::from_half_extents(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(b.merged(&Aabb::empty()), b);
        assert_eq!(Aabb::empty().merged(&b), b);
    }

    #[test]
    fn rotation_about_z_swaps_extents() {
        let b = Aabb::from_half_extents(Vector3::new(2.0, 1.0, 0.5));
        let pose = Pose::from_parts(
            Vector3::new(10.0, 0.0, 0.0).into(),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        let t = b.transformed(&pose);
        assert_relative_eq!(t.min, Point3::new(9.0, -2.0, -0.5), epsilon = 1e-9);
        assert_relative_eq!(t.max, Point3::new(11.0, 2.0, 0.5), epsilon = 1e-9);
    }

    #[test]
    fn inflate_grows_every_side() {
        let b = Aabb::from_half_extents(Vector3::repeat(1.0)).inflated(0.5);
        assert_relative_eq!(b.size(), Vector3::repeat(3.0));
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        let c = Aabb::new(Point3::new(1.5, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
