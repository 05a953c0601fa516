mod geometry;

pub use geometry::ShapeGeometry;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::bounding_box::Aabb;
use crate::math::{Point3, Pose, Vector3};

/// Primitive kinds a collision model can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Sphere,
    Ellipsoid,
    Box,
    Cylinder,
    Cone,
    Capsule,
    RoundedBox,
    RoundedCylinder,
    RoundedCone,
    ConvexHull,
    TriangleMesh,
    Barrel,
    Path2D,
    Point,
}

impl ShapeKind {
    /// Every kind, in declaration order.
    pub const ALL: [ShapeKind; 14] = [
        ShapeKind::Sphere,
        ShapeKind::Ellipsoid,
        ShapeKind::Box,
        ShapeKind::Cylinder,
        ShapeKind::Cone,
        ShapeKind::Capsule,
        ShapeKind::RoundedBox,
        ShapeKind::RoundedCylinder,
        ShapeKind::RoundedCone,
        ShapeKind::ConvexHull,
        ShapeKind::TriangleMesh,
        ShapeKind::Barrel,
        ShapeKind::Path2D,
        ShapeKind::Point,
    ];

    /// The backend capability needed to represent this kind.
    ///
    /// Marker points are spheres to a backend, so a backend never has to
    /// special-case them.
    #[must_use]
    pub fn capability(self) -> ShapeKind {
        match self {
            ShapeKind::Point => ShapeKind::Sphere,
            other => other,
        }
    }
}

/// One collision shape attached to a model.
///
/// Immutable once registered; a model hands out shared handles for
/// inspection only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionShape {
    geometry: ShapeGeometry,
    pose: Pose,
    margin: f64,
    envelope: f64,
}

/// Shared, read-only handle to a registered shape.
pub type SharedShape = Arc<CollisionShape>;

impl CollisionShape {
    /// Creates a shape with the tolerances captured from its model.
    ///
    /// Parameters are expected to be validated by the caller.
    pub(crate) fn new(geometry: ShapeGeometry, pose: Pose, margin: f64, envelope: f64) -> Self {
        Self {
            geometry,
            pose,
            margin,
            envelope,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    #[must_use]
    pub fn geometry(&self) -> &ShapeGeometry {
        &self.geometry
    }

    /// Placement relative to the owning body's reference frame.
    #[must_use]
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Suggested inward margin captured when the shape was added.
    #[must_use]
    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Suggested outward envelope captured when the shape was added.
    #[must_use]
    pub fn envelope(&self) -> f64 {
        self.envelope
    }

    /// Returns `false` for marker points, which take part in proximity
    /// queries but never produce contacts.
    #[must_use]
    pub fn generates_contacts(&self) -> bool {
        self.kind() != ShapeKind::Point
    }

    /// Bounding box in the shape's own frame.
    #[must_use]
    pub fn local_aabb(&self) -> Aabb {
        self.geometry.local_bounds()
    }

    /// Bounding box after applying the shape pose and then `frame`.
    ///
    /// Exact for spheres and points, whose bounds do not depend on rotation.
    #[must_use]
    pub fn aabb_in(&self, frame: &Pose) -> Aabb {
        let placement = frame * self.pose;
        match self.geometry {
            ShapeGeometry::Sphere { radius } | ShapeGeometry::Point { radius } => {
                let c = placement * Point3::origin();
                Aabb::new(c - Vector3::repeat(radius), c + Vector3::repeat(radius))
            }
            _ => self.local_aabb().transformed(&placement),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{pose_at, UnitQuaternion};
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn point_maps_to_sphere_capability() {
        assert_eq!(ShapeKind::Point.capability(), ShapeKind::Sphere);
        assert_eq!(ShapeKind::Box.capability(), ShapeKind::Box);
    }

    #[test]
    fn rotated_sphere_bounds_stay_tight() {
        let shape = CollisionShape::new(
            ShapeGeometry::Sphere { radius: 1.0 },
            pose_at(Vector3::new(1.0, 0.0, 0.0)),
            0.01,
            0.03,
        );
        let frame = Pose::from_parts(
            Vector3::zeros().into(),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_4),
        );
        let b = shape.aabb_in(&frame);
        let c = FRAC_PI_4.cos();
        assert_relative_eq!(b.min, Point3::new(c - 1.0, c - 1.0, -1.0), epsilon = 1e-12);
        assert_relative_eq!(b.max, Point3::new(c + 1.0, c + 1.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn shape_pose_offsets_box_bounds() {
        let shape = CollisionShape::new(
            ShapeGeometry::Box {
                half_extents: Vector3::new(1.0, 1.0, 1.0),
            },
            pose_at(Vector3::new(0.0, 5.0, 0.0)),
            0.0,
            0.0,
        );
        let b = shape.aabb_in(&Pose::identity());
        assert_relative_eq!(b.min, Point3::new(-1.0, 4.0, -1.0));
        assert_relative_eq!(b.max, Point3::new(1.0, 6.0, 1.0));
    }

    #[test]
    fn points_do_not_generate_contacts() {
        let shape = CollisionShape::new(
            ShapeGeometry::Point { radius: 0.0 },
            Pose::identity(),
            0.0,
            0.0,
        );
        assert!(!shape.generates_contacts());
        assert_eq!(shape.kind(), ShapeKind::Point);
    }
}
