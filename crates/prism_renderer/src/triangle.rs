//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable, Surface},
    Material,
};
use prism_math::{Aabb, Ray, Vec3};

/// Padding added around triangle bounds so flat triangles still have
/// volume in the BVH.
const BOUNDS_PAD: f32 = 1e-4;

/// Parametric result of a ray-triangle test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    pub t: f32,
    pub u: f32,
    pub v: f32,
}

impl TriangleHit {
    /// Barycentric weights `(1 - u - v, u, v)` of the three vertices.
    pub fn weights(&self) -> Vec3 {
        Vec3::new(1.0 - self.u - self.v, self.u, self.v)
    }
}

/// A triangle primitive.
#[derive(Debug, Clone)]
pub struct Triangle {
    /// First vertex
    a: Vec3,
    /// Edges from the first vertex
    edge1: Vec3,
    edge2: Vec3,
    /// Pre-computed face normal (unit length)
    normal: Vec3,
    /// Material
    material: Arc<Material>,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(a: Vec3, b: Vec3, c: Vec3, material: Arc<Material>) -> Self {
        let edge1 = b - a;
        let edge2 = c - a;
        let normal = edge1.cross(edge2).normalize_or_zero();

        Self {
            a,
            edge1,
            edge2,
            normal,
            material,
        }
    }

    /// Vertex 0, 1 or 2.
    pub fn vertex(&self, i: usize) -> Vec3 {
        match i {
            0 => self.a,
            1 => self.a + self.edge1,
            _ => self.a + self.edge2,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn centroid(&self) -> Vec3 {
        self.a + (self.edge1 + self.edge2) / 3.0
    }

    /// Smallest vertex coordinate along `axis`.
    pub fn min_coord(&self, axis: usize) -> f32 {
        self.a[axis] + self.edge1[axis].min(self.edge2[axis]).min(0.0)
    }

    /// Padded bounding box.
    pub fn bounds(&self) -> Aabb {
        let b = self.vertex(1);
        let c = self.vertex(2);
        let min = self.a.min(b).min(c) - Vec3::splat(BOUNDS_PAD);
        let max = self.a.max(b).max(c) + Vec3::splat(BOUNDS_PAD);
        Aabb::from_points(min, max)
    }

    /// Möller-Trumbore test against `t >= t_min`, ignoring any current
    /// best hit.
    pub fn intersect(&self, ray: &Ray, t_min: f32) -> Option<TriangleHit> {
        let p = ray.direction().cross(self.edge2);
        let det = self.edge1.dot(p);

        // Ray is parallel to triangle
        if det.abs() < 1e-8 {
            return None;
        }

        let f = 1.0 / det;
        let s = ray.origin() - self.a;
        let u = f * s.dot(p);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(self.edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * self.edge2.dot(q);
        (t >= t_min).then_some(TriangleHit { t, u, v })
    }

    /// Write an accepted hit into `rec` with this triangle's face normal.
    pub(crate) fn record<'a>(
        &self,
        hit: &TriangleHit,
        ray: &Ray,
        material: &'a Material,
        rec: &mut HitRecord<'a>,
    ) {
        let front_face = ray.direction().dot(self.normal) < 0.0;
        let normal = if front_face { self.normal } else { -self.normal };
        rec.set(
            hit.t,
            Surface::Material(material),
            normal,
            material.base_color(),
            front_face,
            Vec3::ZERO,
        );
    }
}

impl Hittable for Triangle {
    fn hit<'a>(&'a self, ray: &Ray, t_min: f32, rec: &mut HitRecord<'a>) -> bool {
        match self.intersect(ray, t_min) {
            Some(hit) if rec.accepts(hit.t, t_min) => {
                self.record(&hit, ray, &self.material, rec);
                true
            }
            _ => false,
        }
    }
}
