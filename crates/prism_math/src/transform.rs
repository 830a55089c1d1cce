// Transform utilities for Mat4
//
// Extends glam::Mat4 with the pieces scene-graph transforms need on top of
// glam's transform_point3 / transform_vector3.

use glam::{Mat4, Vec3};

/// Extension trait for Mat4 used by transform nodes.
pub trait Mat4Ext {
    /// Inverse of the matrix, or `None` when it is (numerically) singular.
    fn try_inverse(&self) -> Option<Mat4>;

    /// Map an object-space normal to world space.
    ///
    /// `self` must be the world-to-object (inverse) matrix; normals transform
    /// by its transpose. The result is unit length.
    fn transform_normal3(&self, normal: Vec3) -> Vec3;
}

impl Mat4Ext for Mat4 {
    fn try_inverse(&self) -> Option<Mat4> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < 1e-12 {
            return None;
        }
        Some(self.inverse())
    }

    fn transform_normal3(&self, normal: Vec3) -> Vec3 {
        self.transpose().transform_vector3(normal).normalize()
    }
}
