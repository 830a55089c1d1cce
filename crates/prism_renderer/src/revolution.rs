//! Surfaces of revolution: a planar profile curve rotated about +Y.
//!
//! The surface is always tessellated into a BVH-backed mesh. In `Newton`
//! mode the nearest facet only seeds a 1D root search on the exact
//! surface, so silhouettes and normals follow the curve rather than the
//! facets.

use std::f64::consts::PI;
use std::sync::Arc;

use crate::{
    bvh::IndexedHit,
    curve::Curve,
    error::SceneError,
    hittable::{HitRecord, Hittable, Surface},
    mesh::Mesh,
    Material,
};
use prism_math::{DVec3, Ray, Vec2, Vec3};

const NEWTON_STEPS: usize = 15;
const NEWTON_TOLERANCE: f64 = 1e-4;
/// How far the parameter bracket reaches past the facet's row.
const ROW_SLACK: f64 = 0.05;

/// How ray hits on the surface are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refinement {
    /// Use the tessellated facets as the surface.
    Facets,
    /// Refine each facet hit onto the exact curve surface.
    Newton,
}

#[derive(Debug, Clone)]
pub struct Revolution {
    curve: Curve,
    mesh: Mesh,
    steps_t: u32,
    steps_phi: u32,
    refinement: Refinement,
}

impl Revolution {
    /// Tessellate `curve` with `steps_t` rows and `steps_phi` columns.
    ///
    /// Every control point must lie in the xy-plane.
    pub fn new(
        curve: Curve,
        material: Arc<Material>,
        steps_t: u32,
        steps_phi: u32,
        refinement: Refinement,
    ) -> Result<Self, SceneError> {
        if let Some((index, p)) = curve
            .controls()
            .iter()
            .enumerate()
            .find(|(_, p)| p.z.abs() > 1e-6)
        {
            return Err(SceneError::ProfileNotPlanar { index, z: p.z });
        }
        if steps_t < 1 {
            return Err(SceneError::TooFewSteps {
                name: "profile",
                min: 1,
                actual: steps_t,
            });
        }
        if steps_phi < 3 {
            return Err(SceneError::TooFewSteps {
                name: "rotation",
                min: 3,
                actual: steps_phi,
            });
        }

        let mesh = Self::tessellate(&curve, material, steps_t as usize, steps_phi as usize)?;
        Ok(Self {
            curve,
            mesh,
            steps_t,
            steps_phi,
            refinement,
        })
    }

    fn tessellate(
        curve: &Curve,
        material: Arc<Material>,
        rows: usize,
        columns: usize,
    ) -> Result<Mesh, SceneError> {
        let textured = material.has_texture();

        let mut positions = Vec::with_capacity((rows + 1) * columns);
        let mut uvs = Vec::new();
        for ci in 0..=rows {
            let profile = curve.point(ci as f64 / rows as f64).position.as_vec3();
            for i in 0..columns {
                let theta = 2.0 * std::f32::consts::PI * i as f32 / columns as f32;
                positions.push(Vec3::new(
                    profile.x * theta.cos(),
                    profile.y,
                    -profile.x * theta.sin(),
                ));
                if textured {
                    uvs.push(Vec2::new(
                        i as f32 / columns as f32,
                        1.0 - ci as f32 / rows as f32,
                    ));
                }
            }
        }

        let mut faces = Vec::with_capacity(2 * rows * columns);
        for ci in 0..rows {
            for i in 0..columns {
                let i1 = (i + 1) % columns;
                faces.push([ci * columns + i, (ci + 1) * columns + i, ci * columns + i1]);
                faces.push([ci * columns + i1, (ci + 1) * columns + i, (ci + 1) * columns + i1]);
            }
        }

        let mut mesh = Mesh::new(positions, faces.clone(), material)?;
        if textured {
            mesh = mesh.with_uvs(uvs, faces)?;
        }
        Ok(mesh.with_bvh())
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn refinement(&self) -> Refinement {
        self.refinement
    }

    /// True when `p` could be the crossing facet `found` approximates: within
    /// a column and a half of it around the axis and within its longest edge
    /// of the facet hit.
    fn belongs_to_facet(&self, ray: &Ray, found: &IndexedHit, p: DVec3) -> bool {
        let triangle = &self.mesh.triangles()[found.index];
        let c = triangle.centroid().as_dvec3();
        let column = 2.0 * PI / self.steps_phi as f64;
        let diff = (p.z.atan2(p.x) - c.z.atan2(c.x) + PI).rem_euclid(2.0 * PI) - PI;

        let (v0, v1, v2) = (triangle.vertex(0), triangle.vertex(1), triangle.vertex(2));
        let edge = (v1 - v0).length().max((v2 - v1).length()).max((v0 - v2).length());
        let facet_point = ray.at(found.hit.t).as_dvec3();

        diff.abs() <= 1.5 * column && (p - facet_point).length() <= edge as f64
    }

    /// Solve for the exact surface near the facet in `found`.
    ///
    /// Eliminating the ray parameter through y turns the ray-surface test
    /// into `f(t) = (o_x d_y + (l_y - o_y) d_x)² + (o_z d_y + (l_y - o_y) d_z)²
    /// - d_y² l_x² = 0` over the curve parameter t.
    fn refine<'a>(
        &'a self,
        ray: &Ray,
        found: &IndexedHit,
        t_min: f32,
        rec: &mut HitRecord<'a>,
    ) -> bool {
        let o = ray.origin().as_dvec3();
        let d = ray.direction().as_dvec3();

        // Horizontal rays never change height, so y cannot be eliminated
        if d.y.abs() < 1e-8 {
            self.mesh.fill(ray, found, rec);
            return true;
        }

        let rows = self.steps_t as f64;
        let columns = self.steps_phi as usize;
        let face = self.mesh.face(found.index);
        let row = (face.iter().map(|&i| i / columns).min().unwrap_or(0)) as f64;
        let lower = (row / rows - ROW_SLACK).max(0.0);
        let upper = ((row + 1.0) / rows + ROW_SLACK).min(1.0);

        // Start from the facet hit's height in the row so Newton settles on
        // this crossing and not the one on the far side of the surface
        let w = found.hit.weights().as_dvec3();
        let seed = w.x * (face[0] / columns) as f64
            + w.y * (face[1] / columns) as f64
            + w.z * (face[2] / columns) as f64;
        let mut t = (seed / rows).clamp(lower, upper);

        let dy2 = d.y * d.y;
        let residual = |t: f64| {
            let point = self.curve.point(t);
            let (l, dl) = (point.position, point.tangent);
            let u = o.x * d.y + (l.y - o.y) * d.x;
            let v = o.z * d.y + (l.y - o.y) * d.z;
            let f = u * u + v * v - dy2 * l.x * l.x;
            let df = 2.0 * (dl.y * (u * d.x + v * d.z) - dy2 * l.x * dl.x);
            (f, df, l, dl)
        };

        for _ in 0..NEWTON_STEPS {
            let (f, df, _, _) = residual(t);
            if df.abs() < 1e-12 {
                break;
            }
            t = (t - f / df).clamp(lower, upper);
        }

        let (f, _, l, dl) = residual(t);
        if f.is_nan() || f.abs() >= NEWTON_TOLERANCE {
            return false;
        }

        let s = (l.y - o.y) / d.y;
        let p = o + d * s;
        let radial = (p.x * p.x + p.z * p.z).sqrt();
        let length = dl.truncate().length();
        if radial < 1e-12 || length < 1e-12 || !self.belongs_to_facet(ray, found, p) {
            // No azimuth to build a frame from (axis or cusp), or the root
            // belongs to another crossing of the same height band
            self.mesh.fill(ray, found, rec);
            return true;
        }
        if s < t_min as f64 || s > rec.t as f64 {
            return false;
        }

        let (nx, nz) = (p.x / radial, p.z / radial);
        let dlx = (if l.x < 0.0 { -dl.x } else { dl.x }) / length;
        let dly = dl.y / length;
        let profile_normal = DVec3::new(-dly * nx, dlx, -dly * nz);
        let tangent = DVec3::new(dlx * nx, dly, dlx * nz);

        let front_face = profile_normal.dot(d) < 0.0;
        let normal = if front_face { profile_normal } else { -profile_normal };

        let material: &Material = self.mesh.material();
        let color = if front_face && material.has_texture() {
            let mut around = p.x.atan2(p.z) / (2.0 * PI) + 1.25;
            if around > 1.0 {
                around -= 1.0;
            }
            material.color_at(around as f32, (1.0 - t) as f32)
        } else {
            material.base_color()
        };

        rec.set(
            s as f32,
            Surface::Material(material),
            normal.as_vec3(),
            color,
            front_face,
            tangent.as_vec3(),
        );
        true
    }
}

impl Hittable for Revolution {
    fn hit<'a>(&'a self, ray: &Ray, t_min: f32, rec: &mut HitRecord<'a>) -> bool {
        if self.refinement == Refinement::Facets {
            return self.mesh.hit(ray, t_min, rec);
        }

        let mut start = t_min;
        loop {
            let Some(found) = self.mesh.nearest(ray, start, rec.t) else {
                return false;
            };
            if self.refine(ray, &found, t_min, rec) {
                return true;
            }
            // Skip past this facet, always by a finite amount
            start = found.hit.t + t_min.max(found.hit.t.abs() * 1e-5 + 1e-6);
        }
    }
}
