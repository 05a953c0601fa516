//! Read-only geometric payloads referenced by collision shapes.
//!
//! These are produced by a mesh or curve provider and shared with the
//! collision model behind an `Arc`; the model never mutates them.

mod mesh;
mod path;

pub use mesh::TriangleMesh;
pub use path::{LinePath, PathVertex};
