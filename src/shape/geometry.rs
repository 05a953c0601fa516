use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ShapeKind;
use crate::bounding_box::Aabb;
use crate::error::GeometryError;
use crate::geometry::{LinePath, TriangleMesh};
use crate::math::{Point3, Vector3};

/// Geometric parameters of one collision shape, in its own local frame.
///
/// Axis-symmetric kinds (cylinder, cone, capsule, their rounded variants
/// and the barrel) have their main axis along local Y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeGeometry {
    Sphere {
        radius: f64,
    },
    Ellipsoid {
        /// Semi-axis lengths along x, y, z.
        radii: Vector3,
    },
    Box {
        half_extents: Vector3,
    },
    Cylinder {
        rx: f64,
        rz: f64,
        /// Half height along Y.
        hy: f64,
    },
    Cone {
        rx: f64,
        rz: f64,
        hy: f64,
    },
    Capsule {
        radius: f64,
        /// Half length of the axis segment, caps excluded.
        half_length: f64,
    },
    RoundedBox {
        half_extents: Vector3,
        sphere_radius: f64,
    },
    RoundedCylinder {
        rx: f64,
        rz: f64,
        hy: f64,
        sphere_radius: f64,
    },
    RoundedCone {
        rx: f64,
        rz: f64,
        hy: f64,
        sphere_radius: f64,
    },
    /// Point cloud whose convex hull is the collision volume.
    ConvexHull {
        points: Vec<Point3>,
    },
    TriangleMesh {
        mesh: Arc<TriangleMesh>,
        is_static: bool,
        is_convex: bool,
        /// Outward sphere-swept layer.
        thickness: f64,
    },
    /// Elliptic arc lathed around Y, clipped by the planes `y_low` and `y_high`.
    Barrel {
        y_low: f64,
        y_high: f64,
        r_vert: f64,
        r_hor: f64,
        r_offset: f64,
    },
    Path2D {
        path: Arc<LinePath>,
        thickness: f64,
    },
    /// Marker sphere that never generates contacts.
    Point {
        radius: f64,
    },
}

fn finite(name: &'static str, value: f64) -> Result<f64, GeometryError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GeometryError::NonFinite(name))
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), GeometryError> {
    if finite(name, value)? > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::ParameterOutOfRange {
            parameter: name,
            value,
            min: f64::MIN_POSITIVE,
            max: f64::MAX,
        })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), GeometryError> {
    if finite(name, value)? >= 0.0 {
        Ok(())
    } else {
        Err(GeometryError::ParameterOutOfRange {
            parameter: name,
            value,
            min: 0.0,
            max: f64::MAX,
        })
    }
}

fn positive_vector(name: &'static str, v: &Vector3) -> Result<(), GeometryError> {
    v.iter().try_for_each(|&c| positive(name, c))
}

impl ShapeGeometry {
    /// Returns the kind tag of this geometry.
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Sphere { .. } => ShapeKind::Sphere,
            Self::Ellipsoid { .. } => ShapeKind::Ellipsoid,
            Self::Box { .. } => ShapeKind::Box,
            Self::Cylinder { .. } => ShapeKind::Cylinder,
            Self::Cone { .. } => ShapeKind::Cone,
            Self::Capsule { .. } => ShapeKind::Capsule,
            Self::RoundedBox { .. } => ShapeKind::RoundedBox,
            Self::RoundedCylinder { .. } => ShapeKind::RoundedCylinder,
            Self::RoundedCone { .. } => ShapeKind::RoundedCone,
            Self::ConvexHull { .. } => ShapeKind::ConvexHull,
            Self::TriangleMesh { .. } => ShapeKind::TriangleMesh,
            Self::Barrel { .. } => ShapeKind::Barrel,
            Self::Path2D { .. } => ShapeKind::Path2D,
            Self::Point { .. } => ShapeKind::Point,
        }
    }

    /// Checks that the parameters describe a representable shape.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] for non-finite values, negative radii or
    /// thicknesses, zero extents, an empty hull or an inverted barrel.
    pub fn validate(&self) -> Result<(), GeometryError> {
        match self {
            Self::Sphere { radius } => non_negative("radius", *radius),
            Self::Point { radius } => non_negative("radius", *radius),
            Self::Ellipsoid { radii } => positive_vector("radii", radii),
            Self::Box { half_extents } => positive_vector("half_extents", half_extents),
            Self::Cylinder { rx, rz, hy } | Self::Cone { rx, rz, hy } => {
                positive("rx", *rx)?;
                positive("rz", *rz)?;
                positive("hy", *hy)
            }
            Self::Capsule {
                radius,
                half_length,
            } => {
                positive("radius", *radius)?;
                non_negative("half_length", *half_length)
            }
            Self::RoundedBox {
                half_extents,
                sphere_radius,
            } => {
                positive_vector("half_extents", half_extents)?;
                non_negative("sphere_radius", *sphere_radius)
            }
            Self::RoundedCylinder {
                rx,
                rz,
                hy,
                sphere_radius,
            }
            | Self::RoundedCone {
                rx,
                rz,
                hy,
                sphere_radius,
            } => {
                positive("rx", *rx)?;
                positive("rz", *rz)?;
                positive("hy", *hy)?;
                non_negative("sphere_radius", *sphere_radius)
            }
            Self::ConvexHull { points } => {
                if points.is_empty() {
                    return Err(GeometryError::Degenerate("convex hull has no points".into()));
                }
                if points.iter().any(|p| p.iter().any(|c| !c.is_finite())) {
                    return Err(GeometryError::NonFinite("hull point"));
                }
                Ok(())
            }
            Self::TriangleMesh { thickness, .. } | Self::Path2D { thickness, .. } => {
                non_negative("thickness", *thickness)
            }
            Self::Barrel {
                y_low,
                y_high,
                r_vert,
                r_hor,
                r_offset,
            } => {
                positive("r_vert", *r_vert)?;
                positive("r_hor", *r_hor)?;
                finite("r_offset", *r_offset)?;
                if finite("y_low", *y_low)? >= finite("y_high", *y_high)? {
                    return Err(GeometryError::Degenerate(
                        "barrel y_low must be below y_high".into(),
                    ));
                }
                if r_offset + r_hor <= 0.0 {
                    return Err(GeometryError::Degenerate(
                        "barrel profile does not reach outside the axis".into(),
                    ));
                }
                if *y_low >= *r_vert || *y_high <= -*r_vert {
                    return Err(GeometryError::Degenerate(
                        "barrel clipping planes miss the profile".into(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Returns the bounding box in the shape's own frame.
    #[must_use]
    pub fn local_bounds(&self) -> Aabb {
        match self {
            Self::Sphere { radius } | Self::Point { radius } => {
                Aabb::from_half_extents(Vector3::repeat(*radius))
            }
            Self::Ellipsoid { radii } => Aabb::from_half_extents(*radii),
            Self::Box { half_extents } => Aabb::from_half_extents(*half_extents),
            Self::Cylinder { rx, rz, hy } | Self::Cone { rx, rz, hy } => {
                Aabb::from_half_extents(Vector3::new(*rx, *hy, *rz))
            }
            Self::Capsule {
                radius,
                half_length,
            } => Aabb::from_half_extents(Vector3::new(*radius, half_length + radius, *radius)),
            Self::RoundedBox {
                half_extents,
                sphere_radius,
            } => Aabb::from_half_extents(*half_extents).inflated(*sphere_radius),
            Self::RoundedCylinder {
                rx,
                rz,
                hy,
                sphere_radius,
            }
            | Self::RoundedCone {
                rx,
                rz,
                hy,
                sphere_radius,
            } => Aabb::from_half_extents(Vector3::new(*rx, *hy, *rz)).inflated(*sphere_radius),
            Self::ConvexHull { points } => Aabb::from_points(points),
            Self::TriangleMesh {
                mesh, thickness, ..
            } => mesh.bounds().inflated(*thickness),
            Self::Barrel {
                y_low,
                y_high,
                r_vert,
                r_hor,
                r_offset,
            } => {
                let r = r_offset + r_hor;
                Aabb::new(
                    Point3::new(-r, y_low.max(-r_vert), -r),
                    Point3::new(r, y_high.min(*r_vert), r),
                )
            }
            Self::Path2D { path, thickness } => {
                let (min, max) = path.bounds();
                Aabb::new(
                    Point3::new(min.x, min.y, 0.0),
                    Point3::new(max.x, max.y, 0.0),
                )
                .inflated(*thickness)
            }
        }
    }

    /// Smallest characteristic half-dimension, used to bound the inward
    /// margin. `None` for surface-like kinds that have no interior.
    #[must_use]
    pub fn characteristic_size(&self) -> Option<f64> {
        let min3 = |a: f64, b: f64, c: f64| a.min(b).min(c);
        match self {
            Self::Sphere { radius } | Self::Point { radius } => Some(*radius),
            Self::Ellipsoid { radii: v } | Self::Box { half_extents: v } => Some(v.min()),
            Self::Cylinder { rx, rz, hy } | Self::Cone { rx, rz, hy } => Some(min3(*rx, *rz, *hy)),
            Self::Capsule { radius, .. } => Some(*radius),
            Self::RoundedBox {
                half_extents,
                sphere_radius,
            } => Some(half_extents.min() + sphere_radius),
            Self::RoundedCylinder {
                rx,
                rz,
                hy,
                sphere_radius,
            }
            | Self::RoundedCone {
                rx,
                rz,
                hy,
                sphere_radius,
            } => Some(min3(*rx, *rz, *hy) + sphere_radius),
            Self::ConvexHull { points } => Some(0.5 * Aabb::from_points(points).size().min()),
            Self::Barrel {
                y_low,
                y_high,
                r_hor,
                ..
            } => Some(r_hor.min(0.5 * (y_high - y_low))),
            Self::TriangleMesh { .. } | Self::Path2D { .. } => None,
        }
    }
}
