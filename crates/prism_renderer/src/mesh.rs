//! Indexed triangle meshes with optional UVs and vertex normals.
//!
//! Each attribute (positions, UVs, normals) has its own index triple per
//! face, so seams can share positions while splitting texture coordinates.

use std::sync::Arc;

use crate::{
    bvh::{nearest_linear, Bvh, IndexedHit},
    error::SceneError,
    hittable::{HitRecord, Hittable},
    triangle::Triangle,
    Material,
};
use prism_math::{Aabb, Ray, Vec2, Vec3};

/// Per-vertex attribute values with their own face indices.
#[derive(Debug, Clone)]
struct Attribute<T> {
    values: Vec<T>,
    faces: Vec<[usize; 3]>,
}

impl<T: Copy> Attribute<T> {
    fn corners(&self, face: usize) -> [T; 3] {
        self.faces[face].map(|i| self.values[i])
    }
}

/// An indexed triangle mesh.
#[derive(Debug, Clone)]
pub struct Mesh {
    positions: Vec<Vec3>,
    faces: Vec<[usize; 3]>,
    uvs: Option<Attribute<Vec2>>,
    normals: Option<Attribute<Vec3>>,
    triangles: Vec<Triangle>,
    bvh: Option<Bvh>,
    bounds: Aabb,
    material: Arc<Material>,
}

/// Reject any face that references a missing value.
fn check_indices(
    kind: &'static str,
    faces: &[[usize; 3]],
    count: usize,
) -> Result<(), SceneError> {
    for (face, corners) in faces.iter().enumerate() {
        if let Some(&index) = corners.iter().find(|&&i| i >= count) {
            return Err(SceneError::IndexOutOfRange {
                kind,
                face,
                index,
                count,
            });
        }
    }
    Ok(())
}

impl Mesh {
    /// Create a mesh from positions and position faces.
    ///
    /// Fails if any face references a position that does not exist.
    pub fn new(
        positions: Vec<Vec3>,
        faces: Vec<[usize; 3]>,
        material: Arc<Material>,
    ) -> Result<Self, SceneError> {
        check_indices("position", &faces, positions.len())?;

        let triangles: Vec<Triangle> = faces
            .iter()
            .map(|&[a, b, c]| {
                Triangle::new(positions[a], positions[b], positions[c], material.clone())
            })
            .collect();
        let bounds = Self::compute_bounds(&positions);

        log::debug!(
            "Mesh: {} vertices, {} triangles",
            positions.len(),
            triangles.len()
        );

        Ok(Self {
            positions,
            faces,
            uvs: None,
            normals: None,
            triangles,
            bvh: None,
            bounds,
            material,
        })
    }

    /// Compute axis-aligned bounding box from positions.
    fn compute_bounds(positions: &[Vec3]) -> Aabb {
        if positions.is_empty() {
            return Aabb::EMPTY;
        }

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for pos in positions {
            min = min.min(*pos);
            max = max.max(*pos);
        }

        Aabb::from_points(min, max)
    }

    /// Attach texture coordinates with one index triple per face.
    pub fn with_uvs(mut self, uvs: Vec<Vec2>, faces: Vec<[usize; 3]>) -> Result<Self, SceneError> {
        self.check_attribute("uv", &faces, uvs.len())?;
        self.uvs = Some(Attribute { values: uvs, faces });
        Ok(self)
    }

    /// Attach vertex normals with one index triple per face.
    pub fn with_normals(
        mut self,
        normals: Vec<Vec3>,
        faces: Vec<[usize; 3]>,
    ) -> Result<Self, SceneError> {
        self.check_attribute("normal", &faces, normals.len())?;
        self.normals = Some(Attribute {
            values: normals,
            faces,
        });
        Ok(self)
    }

    fn check_attribute(
        &self,
        kind: &'static str,
        faces: &[[usize; 3]],
        count: usize,
    ) -> Result<(), SceneError> {
        if faces.len() != self.faces.len() {
            return Err(SceneError::AttributeFaceCount {
                kind,
                faces: self.faces.len(),
                attribute_faces: faces.len(),
            });
        }
        check_indices(kind, faces, count)
    }

    /// Build a BVH over the triangles. Without one, queries scan linearly.
    pub fn with_bvh(mut self) -> Self {
        self.bvh = Some(Bvh::build(&self.triangles));
        self
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Position indices of face `index`.
    pub fn face(&self, index: usize) -> [usize; 3] {
        self.faces[index]
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn bvh(&self) -> Option<&Bvh> {
        self.bvh.as_ref()
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    /// Nearest triangle with `t_min <= t <= limit`.
    pub fn nearest(&self, ray: &Ray, t_min: f32, limit: f32) -> Option<IndexedHit> {
        match &self.bvh {
            Some(bvh) => bvh.nearest(&self.triangles, ray, t_min, limit),
            None => nearest_linear(&self.triangles, ray, t_min, limit),
        }
    }

    /// Write a triangle hit into `rec`, interpolating UV color and vertex
    /// normals when present.
    pub fn fill<'a>(&'a self, ray: &Ray, found: &IndexedHit, rec: &mut HitRecord<'a>) {
        let triangle = &self.triangles[found.index];
        triangle.record(&found.hit, ray, &self.material, rec);

        let w = found.hit.weights();

        if let Some(uvs) = &self.uvs {
            if rec.front_face {
                let [a, b, c] = uvs.corners(found.index);
                let uv = a * w.x + b * w.y + c * w.z;
                rec.color = self.material.color_at(uv.x, uv.y);
            }
        }

        if let Some(normals) = &self.normals {
            let [a, b, c] = normals.corners(found.index);
            let n = (a * w.x + b * w.y + c * w.z).normalize_or_zero();
            if n != Vec3::ZERO {
                rec.normal = if n.dot(ray.direction()) > 0.0 { -n } else { n };
            }
        }
    }
}

impl Hittable for Mesh {
    fn hit<'a>(&'a self, ray: &Ray, t_min: f32, rec: &mut HitRecord<'a>) -> bool {
        match self.nearest(ray, t_min, rec.t) {
            Some(found) => {
                self.fill(ray, &found, rec);
                true
            }
            None => false,
        }
    }
}
