use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::backend::{BoundingVolumeBackend, ShapeBackend};
use crate::bounding_box::Aabb;
use crate::config::ToleranceDefaults;
use crate::contactable::{ContactableId, PlacementSource};
use crate::error::{GeometryError, ImportError, LifecycleError, Result};
use crate::family::CollisionFilter;
use crate::geometry::{LinePath, TriangleMesh};
use crate::hull_file::parse_convex_hulls;
use crate::math::{pose_at, Point3, Pose, Vector3};
use crate::shape::{CollisionShape, ShapeGeometry, SharedShape};

/// Default sphere-swept thickness of 2D path shapes.
pub const DEFAULT_PATH_THICKNESS: f64 = 0.001;

/// Life-cycle phase of a collision model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelState {
    /// Freshly constructed; `clear_model` has not been called yet.
    Empty,
    /// Accepting shapes.
    Building,
    /// Shapes are frozen until the next `clear_model`.
    Built,
}

/// All collision shapes of one body, with tolerances and family filter.
///
/// Shapes are added between [`clear_model`](Self::clear_model) and
/// [`build_model`](Self::build_model). Each `add_*` call returns `Ok(true)`
/// when the shape was registered and `Ok(false)` when the backend does not
/// support that kind, in which case the model is unchanged. Invalid
/// parameters and calls outside the building phase are errors.
#[derive(Debug)]
pub struct CollisionModel<B: ShapeBackend = BoundingVolumeBackend> {
    shapes: Vec<SharedShape>,
    safe_margin: f64,
    envelope: f64,
    filter: CollisionFilter,
    contactable: Option<ContactableId>,
    state: ModelState,
    world_pose: Option<Pose>,
    backend: B,
}

/// Serializable snapshot of a model's shapes, tolerances and filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArchive {
    pub safe_margin: f64,
    pub envelope: f64,
    pub filter: CollisionFilter,
    pub shapes: Vec<CollisionShape>,
}

fn tolerance(name: &'static str, value: f64) -> std::result::Result<f64, GeometryError> {
    if !value.is_finite() {
        return Err(GeometryError::NonFinite(name));
    }
    if value < 0.0 {
        return Err(GeometryError::ParameterOutOfRange {
            parameter: name,
            value,
            min: 0.0,
            max: f64::MAX,
        });
    }
    Ok(value)
}

fn check_pose(pose: &Pose) -> std::result::Result<(), GeometryError> {
    let finite = pose.translation.vector.iter().all(|v| v.is_finite())
        && pose.rotation.coords.iter().all(|v| v.is_finite());
    if finite {
        Ok(())
    } else {
        Err(GeometryError::NonFinite("pose"))
    }
}

impl CollisionModel<BoundingVolumeBackend> {
    /// Creates a model backed by [`BoundingVolumeBackend`].
    #[must_use]
    pub fn new(defaults: &ToleranceDefaults) -> Self {
        Self::with_backend(BoundingVolumeBackend::new(), defaults)
    }
}

impl<B: ShapeBackend> CollisionModel<B> {
    /// Creates a model, seeding its margin and envelope from `defaults`.
    #[must_use]
    pub fn with_backend(backend: B, defaults: &ToleranceDefaults) -> Self {
        if defaults.envelope() <= 0.0 {
            warn!("collision model created with zero envelope; contacts start only at touch");
        }
        Self {
            shapes: Vec::new(),
            safe_margin: defaults.margin(),
            envelope: defaults.envelope(),
            filter: CollisionFilter::default(),
            contactable: None,
            state: ModelState::Empty,
            world_pose: None,
            backend,
        }
    }

    /// Rebuilds a model from an archive, left in the building phase.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive holds an invalid tolerance, filter or
    /// shape.
    pub fn from_archive(archive: ModelArchive, backend: B) -> Result<Self> {
        let defaults = ToleranceDefaults::new(archive.envelope, archive.safe_margin)?;
        let mut model = Self::with_backend(backend, &defaults);
        model.filter = CollisionFilter::new(archive.filter.group(), archive.filter.mask())?;
        model.state = ModelState::Building;
        for shape in archive.shapes {
            shape.geometry().validate()?;
            check_pose(shape.pose())?;
            tolerance("margin", shape.margin())?;
            tolerance("envelope", shape.envelope())?;
            model.shapes.push(Arc::new(shape));
        }
        debug!(shapes = model.shapes.len(), "restored collision model");
        Ok(model)
    }

    /// Takes a serializable snapshot. The contactable association is not
    /// part of it.
    #[must_use]
    pub fn archive(&self) -> ModelArchive {
        ModelArchive {
            safe_margin: self.safe_margin,
            envelope: self.envelope,
            filter: self.filter,
            shapes: self.shapes.iter().map(|s| CollisionShape::clone(s)).collect(),
        }
    }

    #[must_use]
    pub fn state(&self) -> ModelState {
        self.state
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    // --- Life cycle ---

    /// Deletes all shapes and starts a new building phase.
    pub fn clear_model(&mut self) {
        debug!(dropped = self.shapes.len(), "clearing collision model");
        self.shapes.clear();
        self.backend.clear();
        self.world_pose = None;
        self.state = ModelState::Building;
    }

    /// Finalizes the shape sequence and builds backend acceleration data.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotBuilding`] outside the building phase, or
    /// the backend's error if it fails to build.
    pub fn build_model(&mut self) -> Result<()> {
        self.ensure_building()?;
        self.backend.build(&self.shapes)?;
        self.world_pose = None;
        self.state = ModelState::Built;
        debug!(shapes = self.shapes.len(), "built collision model");
        Ok(())
    }

    fn ensure_building(&self) -> Result<()> {
        if self.state == ModelState::Building {
            Ok(())
        } else {
            Err(LifecycleError::NotBuilding(self.state).into())
        }
    }

    fn ensure_built(&self) -> Result<()> {
        if self.state == ModelState::Built {
            Ok(())
        } else {
            Err(LifecycleError::NotBuilt(self.state).into())
        }
    }

    // --- Shape registration ---

    fn register(&mut self, geometry: ShapeGeometry, pose: Pose) -> Result<bool> {
        self.ensure_building()?;
        geometry.validate()?;
        check_pose(&pose)?;

        let kind = geometry.kind();
        if !self.backend.supports(kind.capability()) {
            debug!(?kind, "backend declined collision shape");
            return Ok(false);
        }

        let shape = CollisionShape::new(geometry, pose, self.safe_margin, self.envelope);
        trace!(?kind, index = self.shapes.len(), "registered collision shape");
        self.shapes.push(Arc::new(shape));
        Ok(true)
    }

    /// Adds a sphere centered at `position` in model coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error for a negative radius or outside the building phase.
    pub fn add_sphere(&mut self, radius: f64, position: Vector3) -> Result<bool> {
        self.register(ShapeGeometry::Sphere { radius }, pose_at(position))
    }

    /// Adds an ellipsoid with semi-axes `rx`, `ry`, `rz`.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive semi-axes or outside the building phase.
    pub fn add_ellipsoid(&mut self, rx: f64, ry: f64, rz: f64, pose: Pose) -> Result<bool> {
        let radii = Vector3::new(rx, ry, rz);
        self.register(ShapeGeometry::Ellipsoid { radii }, pose)
    }

    /// Adds a box with half sizes `hx`, `hy`, `hz`.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive half sizes or outside the building phase.
    pub fn add_box(&mut self, hx: f64, hy: f64, hz: f64, pose: Pose) -> Result<bool> {
        let half_extents = Vector3::new(hx, hy, hz);
        self.register(ShapeGeometry::Box { half_extents }, pose)
    }

    /// Adds a cylinder with radii `rx`, `rz` and half height `hy` along Y.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive sizes or outside the building phase.
    pub fn add_cylinder(&mut self, rx: f64, rz: f64, hy: f64, pose: Pose) -> Result<bool> {
        self.register(ShapeGeometry::Cylinder { rx, rz, hy }, pose)
    }

    /// Adds a cone with base radii `rx`, `rz` and half height `hy` along Y.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive sizes or outside the building phase.
    pub fn add_cone(&mut self, rx: f64, rz: f64, hy: f64, pose: Pose) -> Result<bool> {
        self.register(ShapeGeometry::Cone { rx, rz, hy }, pose)
    }

    /// Adds a capsule whose axis segment of half length `half_length` lies on Y.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive radius, a negative length, or
    /// outside the building phase.
    pub fn add_capsule(&mut self, radius: f64, half_length: f64, pose: Pose) -> Result<bool> {
        self.register(
            ShapeGeometry::Capsule {
                radius,
                half_length,
            },
            pose,
        )
    }

    /// Adds a box whose edges are rounded by `sphere_radius`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid sizes or outside the building phase.
    pub fn add_rounded_box(
        &mut self,
        hx: f64,
        hy: f64,
        hz: f64,
        sphere_radius: f64,
        pose: Pose,
    ) -> Result<bool> {
        let half_extents = Vector3::new(hx, hy, hz);
        self.register(
            ShapeGeometry::RoundedBox {
                half_extents,
                sphere_radius,
            },
            pose,
        )
    }

    /// Adds a cylinder whose rims are rounded by `sphere_radius`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid sizes or outside the building phase.
    pub fn add_rounded_cylinder(
        &mut self,
        rx: f64,
        rz: f64,
        hy: f64,
        sphere_radius: f64,
        pose: Pose,
    ) -> Result<bool> {
        self.register(
            ShapeGeometry::RoundedCylinder {
                rx,
                rz,
                hy,
                sphere_radius,
            },
            pose,
        )
    }

    /// Adds a cone whose rim and tip are rounded by `sphere_radius`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid sizes or outside the building phase.
    pub fn add_rounded_cone(
        &mut self,
        rx: f64,
        rz: f64,
        hy: f64,
        sphere_radius: f64,
        pose: Pose,
    ) -> Result<bool> {
        self.register(
            ShapeGeometry::RoundedCone {
                rx,
                rz,
                hy,
                sphere_radius,
            },
            pose,
        )
    }

    /// Adds the convex hull of `points`. The points are copied into the model;
    /// no connectivity is needed.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty or non-finite point list, or outside the
    /// building phase.
    pub fn add_convex_hull(&mut self, points: &[Point3], pose: Pose) -> Result<bool> {
        self.register(
            ShapeGeometry::ConvexHull {
                points: points.to_vec(),
            },
            pose,
        )
    }

    /// Adds a triangle mesh. The mesh is shared, never copied or modified.
    ///
    /// `is_static` hints that the body never moves and `is_convex` that the
    /// mesh may be treated as its convex hull. `thickness` is an outward
    /// sphere-swept layer, `0.0` for none.
    ///
    /// # Errors
    ///
    /// Returns an error for a negative thickness or outside the building phase.
    pub fn add_triangle_mesh(
        &mut self,
        mesh: Arc<TriangleMesh>,
        is_static: bool,
        is_convex: bool,
        pose: Pose,
        thickness: f64,
    ) -> Result<bool> {
        self.register(
            ShapeGeometry::TriangleMesh {
                mesh,
                is_static,
                is_convex,
                thickness,
            },
            pose,
        )
    }

    /// Adds a barrel: an elliptic arc with radii `r_vert` (along Y) and
    /// `r_hor`, centered `r_offset` away from the Y axis, lathed around Y and
    /// clipped by the planes `y_low` and `y_high`.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty profile or outside the building phase.
    pub fn add_barrel(
        &mut self,
        y_low: f64,
        y_high: f64,
        r_vert: f64,
        r_hor: f64,
        r_offset: f64,
        pose: Pose,
    ) -> Result<bool> {
        self.register(
            ShapeGeometry::Barrel {
                y_low,
                y_high,
                r_vert,
                r_hor,
                r_offset,
            },
            pose,
        )
    }

    /// Adds a closed 2D profile lying in the XY plane of `pose`. It collides
    /// only with other profiles on the same plane.
    ///
    /// Use [`DEFAULT_PATH_THICKNESS`] when no specific thickness is needed.
    ///
    /// # Errors
    ///
    /// Returns an error for a negative thickness or outside the building phase.
    pub fn add_2d_path(&mut self, path: Arc<LinePath>, pose: Pose, thickness: f64) -> Result<bool> {
        self.register(ShapeGeometry::Path2D { path, thickness }, pose)
    }

    /// Adds a marker point of the given radius (usually `0.0`). It takes part
    /// in proximity queries but never creates contacts.
    ///
    /// # Errors
    ///
    /// Returns an error for a negative radius or outside the building phase.
    pub fn add_point(&mut self, radius: f64, position: Vector3) -> Result<bool> {
        self.register(ShapeGeometry::Point { radius }, pose_at(position))
    }

    /// Adds every shape of `other`, keeping kinds, parameters, poses and
    /// captured tolerances.
    ///
    /// Each copied entry is a new shape owned by this model; only the mesh
    /// and path payloads stay shared with `other`. Clearing one model leaves
    /// the other intact. If the backend
    /// declines any kind present in `other`, nothing is added.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotBuilding`] outside the building phase.
    pub fn add_copy_of_another_model<C: ShapeBackend>(
        &mut self,
        other: &CollisionModel<C>,
    ) -> Result<bool> {
        self.ensure_building()?;
        if let Some(declined) = other
            .shapes
            .iter()
            .map(|s| s.kind())
            .find(|kind| !self.backend.supports(kind.capability()))
        {
            debug!(kind = ?declined, "backend declined copied collision shape");
            return Ok(false);
        }
        self.shapes.extend(
            other
                .shapes
                .iter()
                .map(|s| Arc::new(CollisionShape::clone(s))),
        );
        debug!(copied = other.shapes.len(), "copied collision shapes");
        Ok(true)
    }

    /// Adds one convex hull per group of a hull batch file read from
    /// `reader`, all placed at `pose`.
    ///
    /// The whole input is parsed before any shape is added, so a malformed
    /// file leaves the model unchanged. Returns `Ok(true)` only if every hull
    /// was accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] for unreadable or malformed input, or
    /// [`LifecycleError::NotBuilding`] outside the building phase.
    pub fn add_convex_hulls_from_reader<R: BufRead>(&mut self, reader: R, pose: Pose) -> Result<bool> {
        self.ensure_building()?;
        let hulls = parse_convex_hulls(reader)?;
        debug!(hulls = hulls.len(), "importing convex hulls");
        let mut all_added = true;
        for points in &hulls {
            all_added &= self.add_convex_hull(points, pose)?;
        }
        Ok(all_added)
    }

    /// Reads a hull batch file from disk; see
    /// [`add_convex_hulls_from_reader`](Self::add_convex_hulls_from_reader).
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Io`] if the file cannot be opened, plus every
    /// error of the reader variant.
    pub fn add_convex_hulls_from_file(&mut self, path: impl AsRef<Path>, pose: Pose) -> Result<bool> {
        self.ensure_building()?;
        let file = File::open(path.as_ref()).map_err(ImportError::Io)?;
        self.add_convex_hulls_from_reader(BufReader::new(file), pose)
    }

    // --- Shape access ---

    #[must_use]
    pub fn num_shapes(&self) -> usize {
        self.shapes.len()
    }

    /// Returns the shape at `index` in insertion order.
    #[must_use]
    pub fn shape(&self, index: usize) -> Option<&SharedShape> {
        self.shapes.get(index)
    }

    #[must_use]
    pub fn shapes(&self) -> &[SharedShape] {
        &self.shapes
    }

    /// Margin the backend uses for the shape at `index`.
    #[must_use]
    pub fn effective_margin(&self, index: usize) -> Option<f64> {
        self.shapes
            .get(index)
            .map(|s| self.backend.effective_margin(s))
    }

    // --- Tolerances ---

    /// Sets the inward safe margin captured by shapes added from now on.
    ///
    /// Think of it as the radius of a smoothing fillet on every corner.
    /// Penetrations within it are resolved quickly and robustly; deeper ones
    /// still work but less reliably.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] for negative or non-finite values.
    pub fn set_safe_margin(&mut self, margin: f64) -> Result<()> {
        self.safe_margin = tolerance("safe_margin", margin)?;
        Ok(())
    }

    #[must_use]
    pub fn safe_margin(&self) -> f64 {
        self.safe_margin
    }

    /// Sets the outward envelope captured by shapes added from now on.
    ///
    /// Contacts are generated once shapes are closer than the envelope, but
    /// contact points stay on the true surface. A zero envelope only yields
    /// contacts at touch, which makes explicit integration unstable.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] for negative or non-finite values.
    pub fn set_envelope(&mut self, envelope: f64) -> Result<()> {
        self.envelope = tolerance("envelope", envelope)?;
        if self.envelope <= 0.0 {
            warn!("collision envelope set to zero; contacts start only at touch");
        }
        Ok(())
    }

    #[must_use]
    pub fn envelope(&self) -> f64 {
        self.envelope
    }

    /// Envelope plus safe margin.
    #[must_use]
    pub fn suggested_full_margin(&self) -> f64 {
        self.envelope + self.safe_margin
    }

    // --- Family filtering ---

    #[must_use]
    pub fn filter(&self) -> &CollisionFilter {
        &self.filter
    }

    /// Moves this model into `family` (`0..=15`).
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::FamilyOutOfRange`](crate::error::FilterError) otherwise.
    pub fn set_family(&mut self, family: i32) -> Result<()> {
        self.filter.set_family(family)?;
        Ok(())
    }

    #[must_use]
    pub fn family(&self) -> i32 {
        self.filter.family()
    }

    /// Sets the raw family group; it must have exactly one bit set.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::GroupNotSingleBit`](crate::error::FilterError) otherwise.
    pub fn set_family_group(&mut self, group: u16) -> Result<()> {
        self.filter.set_group(group)?;
        Ok(())
    }

    #[must_use]
    pub fn family_group(&self) -> u16 {
        self.filter.group()
    }

    pub fn set_family_mask(&mut self, mask: u16) {
        self.filter.set_mask(mask);
    }

    #[must_use]
    pub fn family_mask(&self) -> u16 {
        self.filter.mask()
    }

    /// # Errors
    ///
    /// Returns [`FilterError::FamilyOutOfRange`](crate::error::FilterError) outside `0..=15`.
    pub fn set_family_mask_do_collision_with_family(&mut self, family: i32) -> Result<()> {
        self.filter.do_collision_with_family(family)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`FilterError::FamilyOutOfRange`](crate::error::FilterError) outside `0..=15`.
    pub fn set_family_mask_no_collision_with_family(&mut self, family: i32) -> Result<()> {
        self.filter.no_collision_with_family(family)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`FilterError::FamilyOutOfRange`](crate::error::FilterError) outside `0..=15`.
    pub fn family_mask_does_collision_with_family(&self, family: i32) -> Result<bool> {
        Ok(self.filter.does_collision_with_family(family)?)
    }

    /// Family pre-filter against another model; symmetric.
    #[must_use]
    pub fn can_collide_with<C: ShapeBackend>(&self, other: &CollisionModel<C>) -> bool {
        self.filter.can_collide(&other.filter)
    }

    // --- Contactable and placement ---

    pub fn set_contactable(&mut self, contactable: ContactableId) {
        self.contactable = Some(contactable);
    }

    #[must_use]
    pub fn contactable(&self) -> Option<ContactableId> {
        self.contactable
    }

    /// Updates the world placement from the associated contactable.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotBuilt`] before `build_model`, and
    /// [`LifecycleError::ContactableMissing`] if no contactable is set or its
    /// handle is stale.
    pub fn sync_position(&mut self, source: &impl PlacementSource) -> Result<()> {
        self.ensure_built()?;
        let placement = self
            .contactable
            .and_then(|id| source.placement(id))
            .ok_or(LifecycleError::ContactableMissing)?;
        self.sync_position_to(placement)
    }

    /// Updates the world placement directly.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotBuilt`] before `build_model`, or
    /// [`GeometryError::NonFinite`] for a non-finite placement.
    pub fn sync_position_to(&mut self, placement: Pose) -> Result<()> {
        self.ensure_built()?;
        check_pose(&placement)?;
        self.world_pose = Some(placement);
        Ok(())
    }

    /// World placement from the last synchronization.
    #[must_use]
    pub fn world_pose(&self) -> Option<&Pose> {
        self.world_pose.as_ref()
    }

    fn synced_pose(&self) -> Result<Pose> {
        self.ensure_built()?;
        self.world_pose.ok_or_else(|| LifecycleError::NotSynced.into())
    }

    /// World-space bounding box of all shapes, without envelope inflation.
    ///
    /// A model without shapes yields [`Aabb::empty`], for which
    /// [`Aabb::is_empty`] is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotBuilt`] or [`LifecycleError::NotSynced`]
    /// unless the model was built and then synchronized.
    pub fn aabb(&self) -> Result<Aabb> {
        let world = self.synced_pose()?;
        Ok(self.backend.aabb(&self.shapes, &world))
    }

    /// World-space bounding box with each shape grown by its captured
    /// envelope, as used for broad-phase culling. Empty for a model without
    /// shapes.
    ///
    /// # Errors
    ///
    /// Same as [`aabb`](Self::aabb).
    pub fn envelope_aabb(&self) -> Result<Aabb> {
        let world = self.synced_pose()?;
        Ok(self.shapes.iter().fold(Aabb::empty(), |acc, s| {
            acc.merged(&s.aabb_in(&world).inflated(s.envelope()))
        }))
    }
}
