//! Capabilities a collision engine provides to a [`CollisionModel`](crate::CollisionModel).

use std::collections::HashSet;

use crate::bounding_box::Aabb;
use crate::error::Result;
use crate::math::{Point3, Pose, Vector3};
use crate::shape::{CollisionShape, ShapeGeometry, ShapeKind, SharedShape};

/// Fraction of the smallest characteristic half-dimension the reference
/// backend allows as inward margin.
pub const MARGIN_SIZE_FRACTION: f64 = 0.25;

/// Backend-specific geometry state behind a collision model.
///
/// The model owns the shape sequence and the life cycle; the backend decides
/// which kinds it can represent and keeps whatever acceleration data it
/// needs. Backends of distinct models share nothing, so models may be built
/// on different threads.
pub trait ShapeBackend {
    /// Returns `true` if the backend can represent shapes of `kind`.
    fn supports(&self, kind: ShapeKind) -> bool;

    /// Margin the backend will actually use for `shape`.
    ///
    /// The captured margin is a suggestion; backends may shrink it for thin
    /// or small shapes.
    fn effective_margin(&self, shape: &CollisionShape) -> f64 {
        shape.margin()
    }

    /// Drops all acceleration data.
    fn clear(&mut self);

    /// Builds acceleration data over the final shape sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot process the shapes.
    fn build(&mut self, shapes: &[SharedShape]) -> Result<()>;

    /// World-space bounds of the built shapes placed at `world`, without
    /// envelope inflation.
    fn aabb(&self, shapes: &[SharedShape], world: &Pose) -> Aabb;
}

/// Bounding volume cached per shape at build time.
#[derive(Debug, Clone, Copy)]
enum BoundingVolume {
    /// Rotation-invariant ball, center in model frame.
    Ball { center: Point3, radius: f64 },
    /// Shape-frame box and the pose placing it in the model frame.
    Oriented { local: Aabb, pose: Pose },
}

impl BoundingVolume {
    fn of(shape: &CollisionShape) -> Self {
        match shape.geometry() {
            ShapeGeometry::Sphere { radius } | ShapeGeometry::Point { radius } => Self::Ball {
                center: shape.pose() * Point3::origin(),
                radius: *radius,
            },
            _ => Self::Oriented {
                local: shape.local_aabb(),
                pose: *shape.pose(),
            },
        }
    }

    fn world_aabb(&self, world: &Pose) -> Aabb {
        match self {
            Self::Ball { center, radius } => {
                let c = world * center;
                Aabb::new(c - Vector3::repeat(*radius), c + Vector3::repeat(*radius))
            }
            Self::Oriented { local, pose } => local.transformed(&(world * pose)),
        }
    }
}

/// Reference backend that represents every shape kind by a bounding volume.
///
/// Margin policy: the effective margin is the captured margin clamped to
/// [`MARGIN_SIZE_FRACTION`] of the shape's smallest characteristic
/// half-dimension. Meshes and 2D paths have no interior and are not clamped.
#[derive(Debug, Clone, Default)]
pub struct BoundingVolumeBackend {
    volumes: Vec<BoundingVolume>,
}

impl BoundingVolumeBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once acceleration data exists for at least one shape.
    #[must_use]
    pub fn is_built(&self) -> bool {
        !self.volumes.is_empty()
    }
}

impl ShapeBackend for BoundingVolumeBackend {
    fn supports(&self, _kind: ShapeKind) -> bool {
        true
    }

    fn effective_margin(&self, shape: &CollisionShape) -> f64 {
        match shape.geometry().characteristic_size() {
            Some(size) => shape.margin().min(MARGIN_SIZE_FRACTION * size),
            None => shape.margin(),
        }
    }

    fn clear(&mut self) {
        self.volumes.clear();
    }

    fn build(&mut self, shapes: &[SharedShape]) -> Result<()> {
        self.volumes = shapes.iter().map(|s| BoundingVolume::of(s)).collect();
        Ok(())
    }

    fn aabb(&self, _shapes: &[SharedShape], world: &Pose) -> Aabb {
        self.volumes
            .iter()
            .fold(Aabb::empty(), |acc, v| acc.merged(&v.world_aabb(world)))
    }
}

/// Backend that declines a fixed set of shape kinds and otherwise behaves
/// like [`BoundingVolumeBackend`].
///
/// Useful for engines that only implement a subset of primitives, and for
/// exercising how callers react to declined shapes.
#[derive(Debug, Clone, Default)]
pub struct RestrictedBackend {
    declined: HashSet<ShapeKind>,
    inner: BoundingVolumeBackend,
}

impl RestrictedBackend {
    /// Creates a backend that declines every kind in `declined`.
    #[must_use]
    pub fn declining(declined: impl IntoIterator<Item = ShapeKind>) -> Self {
        Self {
            declined: declined.into_iter().collect(),
            inner: BoundingVolumeBackend::new(),
        }
    }
}

impl ShapeBackend for RestrictedBackend {
    fn supports(&self, kind: ShapeKind) -> bool {
        !self.declined.contains(&kind)
    }

    fn effective_margin(&self, shape: &CollisionShape) -> f64 {
        self.inner.effective_margin(shape)
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn build(&mut self, shapes: &[SharedShape]) -> Result<()> {
        self.inner.build(shapes)
    }

    fn aabb(&self, shapes: &[SharedShape], world: &Pose) -> Aabb {
        self.inner.aabb(shapes, world)
    }
}
