//! Infinite plane `dot(normal, p) = d`.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable, Surface},
    Material,
};
use prism_math::{Ray, Vec3};

/// An infinite plane.
#[derive(Debug, Clone)]
pub struct Plane {
    normal: Vec3,
    d: f32,
    material: Arc<Material>,
}

impl Plane {
    /// Plane with unit `normal` (normalized here) at signed offset `d` from
    /// the origin.
    pub fn new(normal: Vec3, d: f32, material: Arc<Material>) -> Self {
        let length = normal.length();
        Self {
            normal: normal / length,
            d: d / length,
            material,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl Hittable for Plane {
    fn hit<'a>(&'a self, ray: &Ray, t_min: f32, rec: &mut HitRecord<'a>) -> bool {
        let denom = ray.direction().dot(self.normal);
        if denom.abs() < 1e-8 {
            return false;
        }

        let t = (self.d - ray.origin().dot(self.normal)) / denom;
        if !rec.accepts(t, t_min) {
            return false;
        }

        let front_face = denom < 0.0;
        let normal = if front_face { self.normal } else { -self.normal };
        rec.set(
            t,
            Surface::Material(&self.material),
            normal,
            self.material.base_color(),
            front_face,
            Vec3::ZERO,
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> Plane {
        Plane::new(Vec3::Y, -1.0, Arc::new(Material::mirror(0.5)))
    }

    #[test]
    fn test_plane_hit_from_above() {
        let plane = floor();
        let ray = Ray::new(Vec3::new(0.0, 2.0, 0.0), -Vec3::Y);
        let mut rec = HitRecord::new();

        assert!(plane.hit(&ray, 1e-4, &mut rec));
        assert!((rec.t - 3.0).abs() < 1e-5);
        assert_eq!(rec.normal, Vec3::Y);
        assert!(rec.front_face);
        assert_eq!(rec.color, Vec3::splat(0.5));
    }

    #[test]
    fn test_plane_hit_from_below_faces_ray() {
        let plane = floor();
        let ray = Ray::new(Vec3::new(0.0, -4.0, 0.0), Vec3::new(0.0, 1.0, 1.0));
        let mut rec = HitRecord::new();

        assert!(plane.hit(&ray, 1e-4, &mut rec));
        assert!(!rec.front_face);
        assert_eq!(rec.normal, -Vec3::Y);
        assert!(rec.normal.dot(ray.direction()) < 0.0);
    }

    #[test]
    fn test_plane_parallel_and_behind() {
        let plane = floor();
        let mut rec = HitRecord::new();

        let parallel = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(!plane.hit(&parallel, 1e-4, &mut rec));

        let away = Ray::new(Vec3::ZERO, Vec3::Y);
        assert!(!plane.hit(&away, 1e-4, &mut rec));
        assert!(!rec.is_hit());
    }

    #[test]
    fn test_plane_normalizes_equation() {
        let plane = Plane::new(Vec3::new(0.0, 2.0, 0.0), 2.0, Arc::new(Material::mirror(1.0)));
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y);
        let mut rec = HitRecord::new();

        assert!(plane.hit(&ray, 1e-4, &mut rec));
        assert!((rec.t - 4.0).abs() < 1e-5);
        assert_eq!(plane.normal(), Vec3::Y);
    }
}
