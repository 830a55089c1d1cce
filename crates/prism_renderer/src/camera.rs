//! Camera for ray generation.

use prism_math::{Ray, Vec2, Vec3};

/// Maps continuous pixel coordinates to primary rays.
///
/// Pixel `(x, y)` covers `[x, x + 1) × [y, y + 1)`; row 0 is the top of
/// the image.
pub trait Camera: Send + Sync {
    fn generate_ray(&self, pixel: Vec2) -> Ray;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// Pinhole camera with a vertical field of view.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    center: Vec3,
    // Orthonormal basis (forward, right, up)
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    /// Distance from the eye to an image plane where one pixel is one unit
    focal: f32,
    width: u32,
    height: u32,
}

impl PerspectiveCamera {
    /// `vfov` is the vertical field of view in degrees.
    pub fn new(center: Vec3, direction: Vec3, up: Vec3, vfov: f32, width: u32, height: u32) -> Self {
        let forward = direction.normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);
        let focal = height as f32 / (2.0 * (vfov.to_radians() / 2.0).tan());

        Self {
            center,
            forward,
            right,
            up,
            focal,
            width,
            height,
        }
    }

    /// Camera at `look_from` aimed at `look_at`.
    pub fn looking_at(look_from: Vec3, look_at: Vec3, vup: Vec3, vfov: f32, width: u32, height: u32) -> Self {
        Self::new(look_from, look_at - look_from, vup, vfov, width, height)
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }
}

impl Camera for PerspectiveCamera {
    fn generate_ray(&self, pixel: Vec2) -> Ray {
        let x = (pixel.x - self.width as f32 / 2.0) / self.focal;
        let y = (self.height as f32 / 2.0 - pixel.y) / self.focal;
        Ray::new(self.center, self.right * x + self.up * y + self.forward)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(Vec3::ZERO, -Vec3::Z, Vec3::Y, 90.0, 200, 100)
    }

    #[test]
    fn test_center_ray_points_forward() {
        let ray = camera().generate_ray(Vec2::new(100.0, 50.0));
        assert!((ray.direction() - -Vec3::Z).length() < 1e-6);
        assert_eq!(ray.origin(), Vec3::ZERO);
    }

    #[test]
    fn test_vertical_field_of_view() {
        // Top edge of the image sits 45 degrees above the axis
        let ray = camera().generate_ray(Vec2::new(100.0, 0.0));
        let expected = Vec3::new(0.0, 1.0, -1.0).normalize();
        assert!((ray.direction() - expected).length() < 1e-5);

        // Left edge spans twice as far for a 2:1 image
        let ray = camera().generate_ray(Vec2::new(0.0, 50.0));
        let expected = Vec3::new(-2.0, 0.0, -1.0).normalize();
        assert!((ray.direction() - expected).length() < 1e-5);
    }

    #[test]
    fn test_looking_at_builds_orthonormal_basis() {
        let camera = PerspectiveCamera::looking_at(
            Vec3::new(0.0, 2.0, 5.0),
            Vec3::ZERO,
            Vec3::Y,
            40.0,
            64,
            64,
        );
        assert!((camera.right.length() - 1.0).abs() < 1e-6);
        assert!(camera.right.dot(camera.up).abs() < 1e-6);
        assert!(camera.forward.dot(camera.up).abs() < 1e-6);
        assert!(camera.up.y > 0.0);
        assert_eq!(camera.width(), 64);
        assert_eq!(camera.height(), 64);
    }
}
