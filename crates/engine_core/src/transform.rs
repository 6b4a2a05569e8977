//! Transform component and utilities for spatial positioning.

use glam::{Mat3, Mat4, Quat, Vec3};

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Builder: uniform scale.
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Create the model matrix for this transform.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Transform a point from local space into world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * (local * self.scale)
    }
}

/// Inverse-transpose of the upper 3x3, for transforming normals.
pub fn normal_matrix(matrix: Mat4) -> Mat3 {
    let m = Mat3::from_mat4(matrix);
    if m.determinant().abs() <= f32::EPSILON {
        return Mat3::IDENTITY;
    }
    m.inverse().transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_point_matches_matrix() {
        let t = Transform::from_position_rotation(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(0.7),
        )
        .with_uniform_scale(0.5);
        let p = Vec3::new(-3.0, 0.5, 0.0);
        let a = t.transform_point(p);
        let b = t.to_matrix().transform_point3(p);
        assert!(a.abs_diff_eq(b, 1e-5));
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let m = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = normal_matrix(m);
        let v = n * Vec3::X;
        assert!((v.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn normal_matrix_of_singular_matrix_is_identity() {
        let m = Mat4::from_scale(Vec3::ZERO);
        assert_eq!(normal_matrix(m), Mat3::IDENTITY);
    }
}
