//! Sphere primitive for ray tracing.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable, Surface},
    Material,
};
use prism_math::{Ray, Vec3};
use std::f32::consts::PI;

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<Material>,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Texture coordinates of a surface point: longitude around +Z and
    /// height along Z.
    fn sphere_uv(&self, p: Vec3) -> (f32, f32) {
        let local = p - self.center;
        let u = local.y.atan2(local.x) / (2.0 * PI) + 0.5;
        let v = local.z / (2.0 * self.radius) + 0.5;
        (u, v)
    }
}

impl Hittable for Sphere {
    /// Geometric solution: project the center onto the ray from the first
    /// admissible point, then step back (outside) or forward (inside) by
    /// the half-chord.
    fn hit<'a>(&'a self, ray: &Ray, t_min: f32, rec: &mut HitRecord<'a>) -> bool {
        let r2 = self.radius * self.radius;
        let start = ray.at(t_min);
        let to_center = self.center - start;

        let b = to_center.dot(ray.direction());
        let dist2 = to_center.length_squared();
        let perp2 = dist2 - b * b;
        let outside = dist2 > r2;

        let offset = if outside {
            if b < 0.0 || perp2 > r2 {
                return false;
            }
            b - (r2 - perp2).sqrt()
        } else {
            b + (r2 - perp2).max(0.0).sqrt()
        };

        let t = t_min + offset;
        if !rec.accepts(t, t_min) {
            return false;
        }

        let p = ray.at(t);
        let outward = (p - self.center).normalize();
        let normal = if outside { outward } else { -outward };
        let color = if outside && self.material.has_texture() {
            let (u, v) = self.sphere_uv(p);
            self.material.color_at(u, v)
        } else {
            self.material.base_color()
        };

        rec.set(
            t,
            Surface::Material(&self.material),
            normal,
            color,
            outside,
            Vec3::ZERO,
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brdf::{BrdfModel, PhongBrdf};
    use crate::material::BrdfMaterial;
    use prism_core::Texture;

    fn gray() -> Arc<Material> {
        Arc::new(Material::phong(
            Vec3::ZERO,
            Vec3::splat(0.5),
            Vec3::ZERO,
            1.0,
        ))
    }

    #[test]
    fn test_sphere_hit_from_outside() {
        for r in [0.5_f32, 1.0, 3.0] {
            let sphere = Sphere::new(Vec3::ZERO, r, gray());
            let ray = Ray::new(Vec3::new(0.0, 0.0, -2.0 * r), Vec3::Z);
            let mut rec = HitRecord::new();

            assert!(sphere.hit(&ray, 1e-4, &mut rec));
            assert!((rec.t - r).abs() < 1e-4 * r.max(1.0));
            assert!((rec.normal - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
            assert!(rec.front_face);
        }
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, gray());
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let mut rec = HitRecord::new();

        assert!(sphere.hit(&ray, 1e-4, &mut rec));
        assert!((rec.t - 1.0).abs() < 1e-4);
        assert!(!rec.front_face);
        // Normal faces back toward the ray origin
        assert!((rec.normal + Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, gray());

        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let mut rec = HitRecord::new();
        assert!(!sphere.hit(&ray, 1e-4, &mut rec));

        // Ray passing beside it
        let ray = Ray::new(Vec3::new(2.0, 0.0, 0.0), -Vec3::Z);
        assert!(!sphere.hit(&ray, 1e-4, &mut rec));
        assert!(!rec.is_hit());
    }

    #[test]
    fn test_sphere_respects_current_best() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0, gray());
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);

        let mut rec = HitRecord::with_max(3.0);
        assert!(!sphere.hit(&ray, 1e-4, &mut rec));
        assert_eq!(rec.t, 3.0);

        let mut rec = HitRecord::with_max(10.0);
        assert!(sphere.hit(&ray, 1e-4, &mut rec));
        assert!((rec.t - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_sphere_textured_front_face() {
        let texture = Arc::new(Texture::checker(2, Vec3::ONE, Vec3::ZERO));
        let material = Arc::new(Material::Brdf(
            BrdfMaterial::new(BrdfModel::Phong(PhongBrdf::new(1.0, 0.0, 1.0)), Vec3::splat(0.3))
                .with_texture(texture),
        ));
        let sphere = Sphere::new(Vec3::ZERO, 1.0, material);

        // Hit at (-1, 0, 0): u = 1.0 (clamped), v = 0.5
        let ray = Ray::new(Vec3::new(-3.0, 0.0, 0.0), Vec3::X);
        let mut rec = HitRecord::new();
        assert!(sphere.hit(&ray, 1e-4, &mut rec));
        assert!(rec.color == Vec3::ONE || rec.color == Vec3::ZERO);

        // Back faces keep the base color
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let mut rec = HitRecord::new();
        assert!(sphere.hit(&ray, 1e-4, &mut rec));
        assert_eq!(rec.color, Vec3::splat(0.3));
    }
}
