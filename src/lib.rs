//! Collision shape models for multibody simulation.
//!
//! A [`CollisionModel`] holds the primitive shapes a body exposes to a
//! collision engine, the tolerances used for contact generation and the
//! family filter that suppresses contacts between selected groups. The
//! engine itself plugs in through [`ShapeBackend`].

pub mod backend;
pub mod bounding_box;
pub mod config;
pub mod contactable;
pub mod error;
pub mod family;
pub mod geometry;
pub mod hull_file;
pub mod math;
pub mod model;
pub mod shape;

pub use backend::{BoundingVolumeBackend, RestrictedBackend, ShapeBackend};
pub use bounding_box::Aabb;
pub use config::ToleranceDefaults;
pub use contactable::{ContactableId, ContactableRegistry, PlacementSource};
pub use error::{CollisionError, Result};
pub use family::CollisionFilter;
pub use model::{CollisionModel, ModelArchive, ModelState};
pub use shape::{CollisionShape, ShapeGeometry, ShapeKind, SharedShape};
