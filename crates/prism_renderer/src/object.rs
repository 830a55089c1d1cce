//! Scene graph nodes: primitives, groups and affine transforms.

use crate::{
    error::SceneError,
    hittable::{HitRecord, Hittable},
    mesh::Mesh,
    plane::Plane,
    revolution::Revolution,
    sphere::Sphere,
    triangle::Triangle,
};
use prism_math::{Mat4, Mat4Ext, Ray};

/// A node of the scene graph. Each node owns its subtree.
#[derive(Debug, Clone)]
pub enum Object {
    Sphere(Sphere),
    Plane(Plane),
    Triangle(Triangle),
    Mesh(Mesh),
    Revolution(Revolution),
    Group(Group),
    Transform(Transform),
}

impl Hittable for Object {
    fn hit<'a>(&'a self, ray: &Ray, t_min: f32, rec: &mut HitRecord<'a>) -> bool {
        match self {
            Object::Sphere(o) => o.hit(ray, t_min, rec),
            Object::Plane(o) => o.hit(ray, t_min, rec),
            Object::Triangle(o) => o.hit(ray, t_min, rec),
            Object::Mesh(o) => o.hit(ray, t_min, rec),
            Object::Revolution(o) => o.hit(ray, t_min, rec),
            Object::Group(o) => o.hit(ray, t_min, rec),
            Object::Transform(o) => o.hit(ray, t_min, rec),
        }
    }
}

macro_rules! impl_from_node {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Object {
                fn from(node: $variant) -> Self {
                    Object::$variant(node)
                }
            }
        )*
    };
}

impl_from_node!(Sphere, Plane, Triangle, Mesh, Revolution, Group, Transform);

/// An ordered collection of child nodes.
#[derive(Debug, Clone, Default)]
pub struct Group {
    children: Vec<Object>,
}

impl Group {
    pub fn new(children: Vec<Object>) -> Self {
        Self { children }
    }

    /// A group that must contain exactly `expected` children.
    pub fn with_expected(expected: usize, children: Vec<Object>) -> Result<Self, SceneError> {
        if children.len() != expected {
            return Err(SceneError::GroupSize {
                expected,
                actual: children.len(),
            });
        }
        Ok(Self::new(children))
    }

    pub fn push(&mut self, child: impl Into<Object>) {
        self.children.push(child.into());
    }

    pub fn children(&self) -> &[Object] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Hittable for Group {
    fn hit<'a>(&'a self, ray: &Ray, t_min: f32, rec: &mut HitRecord<'a>) -> bool {
        let mut hit_anything = false;
        for child in &self.children {
            if child.hit(ray, t_min, rec) {
                hit_anything = true;
            }
        }
        hit_anything
    }
}

/// An affine transform applied to one child node.
#[derive(Debug, Clone)]
pub struct Transform {
    matrix: Mat4,
    inverse: Mat4,
    child: Box<Object>,
}

impl Transform {
    /// Wrap `child` with the object-to-world `matrix`.
    pub fn new(matrix: Mat4, child: impl Into<Object>) -> Result<Self, SceneError> {
        let inverse = matrix.try_inverse().ok_or(SceneError::SingularTransform)?;
        Ok(Self {
            matrix,
            inverse,
            child: Box::new(child.into()),
        })
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    pub fn child(&self) -> &Object {
        &self.child
    }
}

impl Hittable for Transform {
    /// Object-space rays are renormalized, so object-space distances are
    /// world distances times the direction's length `scale`.
    fn hit<'a>(&'a self, ray: &Ray, t_min: f32, rec: &mut HitRecord<'a>) -> bool {
        let origin = self.inverse.transform_point3(ray.origin());
        let direction = self.inverse.transform_vector3(ray.direction());
        let scale = direction.length();
        if !scale.is_finite() || scale < 1e-12 {
            return false;
        }

        let local_ray = Ray::new(origin, direction);
        let mut local = *rec;
        local.t = rec.t * scale;
        if !self.child.hit(&local_ray, t_min * scale, &mut local) {
            return false;
        }

        let t = (local.t / scale).clamp(t_min, rec.t);
        let normal = self.inverse.transform_normal3(local.normal);
        let tangent = self.matrix.transform_vector3(local.tangent).normalize_or_zero();
        rec.set(
            t,
            local.surface,
            normal,
            local.color,
            local.front_face,
            tangent,
        );
        true
    }
}
