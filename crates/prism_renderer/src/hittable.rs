//! Hittable trait and HitRecord for ray-object intersection.

use crate::{Color, Material};
use prism_math::{Ray, Vec3};

/// What the nearest hit so far landed on.
#[derive(Debug, Clone, Copy, Default)]
pub enum Surface<'a> {
    /// Nothing hit yet.
    #[default]
    None,
    /// A scene-graph primitive with its material.
    Material(&'a Material),
    /// The surface of an area light, carrying its emitted radiance
    /// (black when seen from behind).
    Emissive(Color),
}

/// Record of the nearest ray-object intersection found so far.
///
/// `t` starts at infinity and only ever shrinks: every primitive rejects
/// candidates farther than the current `t`, so one record can be threaded
/// through a whole scene graph to find the nearest hit.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord<'a> {
    /// Ray parameter of the hit
    pub t: f32,
    /// Surface struck
    pub surface: Surface<'a>,
    /// Unit surface normal, facing the side the ray came from
    pub normal: Vec3,
    /// Shaded surface color (texture lookup or material base color)
    pub color: Color,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Surface tangent for anisotropic shading, zero when absent
    pub tangent: Vec3,
}

impl<'a> Default for HitRecord<'a> {
    fn default() -> Self {
        Self {
            t: f32::INFINITY,
            surface: Surface::None,
            normal: Vec3::ZERO,
            color: Color::ZERO,
            front_face: false,
            tangent: Vec3::ZERO,
        }
    }
}

impl<'a> HitRecord<'a> {
    /// An empty record that accepts any hit.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty record that only accepts hits up to `t_max`.
    pub fn with_max(t_max: f32) -> Self {
        Self {
            t: t_max,
            ..Self::default()
        }
    }

    /// True when a candidate at `t` may replace the current hit.
    #[inline]
    pub fn accepts(&self, t: f32, t_min: f32) -> bool {
        t >= t_min && t <= self.t
    }

    /// True once any surface has been recorded.
    pub fn is_hit(&self) -> bool {
        !matches!(self.surface, Surface::None)
    }

    /// Material of the hit, if it landed on scene geometry.
    pub fn material(&self) -> Option<&'a Material> {
        match self.surface {
            Surface::Material(material) => Some(material),
            _ => None,
        }
    }

    /// Overwrite the record. The normal is normalized here.
    pub fn set(
        &mut self,
        t: f32,
        surface: Surface<'a>,
        normal: Vec3,
        color: Color,
        front_face: bool,
        tangent: Vec3,
    ) {
        self.t = t;
        self.surface = surface;
        self.normal = normal.normalize();
        self.color = color;
        self.front_face = front_face;
        self.tangent = tangent;
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Test the ray against this object.
    ///
    /// A candidate is accepted only when `t_min <= t <= rec.t`. On
    /// acceptance `rec` is overwritten and `true` returned; otherwise `rec`
    /// is left untouched.
    fn hit<'a>(&'a self, ray: &Ray, t_min: f32, rec: &mut HitRecord<'a>) -> bool;
}
