pub mod arc_2d;

use crate::error::GeometryError;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3x3 matrix type, used for rotation inputs.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Unit quaternion type.
pub type UnitQuaternion = nalgebra::UnitQuaternion<f64>;

/// Rigid placement (position + rotation) of a shape or body.
pub type Pose = nalgebra::Isometry3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Maximum deviation of `RᵀR` from identity for a matrix to count as a rotation.
const ORTHONORMAL_TOLERANCE: f64 = 1e-6;

/// Creates a pose translated by `position` with no rotation.
#[must_use]
pub fn pose_at(position: Vector3) -> Pose {
    Pose::translation(position.x, position.y, position.z)
}

/// Creates a pose from a position and a rotation matrix.
///
/// # Errors
///
/// Returns [`GeometryError::Degenerate`] if `rotation` is not a proper
/// orthonormal matrix (determinant `+1`), or [`GeometryError::NonFinite`] if
/// any entry is NaN or infinite.
pub fn pose_from_parts(position: Vector3, rotation: &Matrix3) -> Result<Pose, GeometryError> {
    if position.iter().any(|v| !v.is_finite()) {
        return Err(GeometryError::NonFinite("position"));
    }
    if rotation.iter().any(|v| !v.is_finite()) {
        return Err(GeometryError::NonFinite("rotation"));
    }

    let deviation = (rotation.transpose() * rotation - Matrix3::identity()).norm();
    if deviation > ORTHONORMAL_TOLERANCE || rotation.determinant() < 0.0 {
        return Err(GeometryError::Degenerate(
            "rotation matrix must be orthonormal with determinant +1".into(),
        ));
    }

    let rotation = nalgebra::Rotation3::from_matrix_unchecked(*rotation);
    Ok(Pose::from_parts(
        position.into(),
        UnitQuaternion::from_rotation_matrix(&rotation),
    ))
}
