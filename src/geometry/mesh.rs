use serde::{Deserialize, Serialize};

use crate::bounding_box::Aabb;
use crate::error::GeometryError;
use crate::math::Point3;

/// An indexed triangle mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    vertices: Vec<Point3>,
    triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Creates a new triangle mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh has no triangles, an index refers to a
    /// missing vertex, or a vertex coordinate is not finite.
    pub fn new(vertices: Vec<Point3>, triangles: Vec<[u32; 3]>) -> Result<Self, GeometryError> {
        if triangles.is_empty() {
            return Err(GeometryError::Degenerate("triangle mesh has no triangles".into()));
        }
        if vertices.iter().any(|v| v.iter().any(|c| !c.is_finite())) {
            return Err(GeometryError::NonFinite("mesh vertex"));
        }
        let count = vertices.len();
        if let Some(bad) = triangles
            .iter()
            .flatten()
            .find(|&&i| usize::try_from(i).map_or(true, |i| i >= count))
        {
            return Err(GeometryError::Degenerate(format!(
                "triangle index {bad} exceeds vertex count {count}"
            )));
        }
        Ok(Self {
            vertices,
            triangles,
        })
    }

    /// Returns the vertex positions.
    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Returns the triangle index triples.
    #[must_use]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Returns the bounding box of the referenced vertices.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tetra() -> TriangleMesh {
        TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
                Point3::new(0.0, 0.0, 3.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]],
        )
        .unwrap()
    }

    #[test]
    fn bounds_cover_vertices() {
        let b = tetra().bounds();
        assert_eq!(b.min, Point3::origin());
        assert_eq!(b.max, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn empty_mesh_is_rejected() {
        assert!(TriangleMesh::new(vec![Point3::origin()], vec![]).is_err());
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let r = TriangleMesh::new(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            vec![[0, 1, 2]],
        );
        assert!(matches!(r, Err(GeometryError::Degenerate(_))));
    }
}
