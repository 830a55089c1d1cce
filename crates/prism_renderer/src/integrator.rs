//! The integrator seam and the direct-lighting pieces both integrators
//! share.

use crate::{
    camera::Camera,
    hittable::HitRecord,
    light::{Illumination, Light},
    material::{BrdfMaterial, Phong},
    scene::{Occluders, Scene},
    Color,
};
use prism_math::{Ray, Vec3};

/// Estimates the color of one pixel.
pub trait Integrator: Sync {
    fn pixel_color(&self, camera: &dyn Camera, x: u32, y: u32) -> Color;
}

/// Sum `contribution` over every light in `lights` that reaches `point`
/// unblocked.
pub(crate) fn sum_unoccluded<'l>(
    scene: &Scene,
    lights: impl Iterator<Item = &'l Light>,
    point: Vec3,
    t_min: f32,
    occluders: Occluders,
    mut contribution: impl FnMut(&Illumination) -> Color,
) -> Color {
    let mut total = Color::ZERO;
    for light in lights {
        let Some(lit) = light.illuminate(point) else {
            continue;
        };
        if scene.occluded(point, lit.direction, lit.distance, t_min, occluders) {
            continue;
        }
        total += contribution(&lit);
    }
    total
}

/// Ambient plus per-light Phong terms at a hit.
pub(crate) fn shade_phong(
    scene: &Scene,
    phong: &Phong,
    ray: &Ray,
    rec: &HitRecord<'_>,
    background: Color,
    t_min: f32,
    occluders: Occluders,
) -> Color {
    let point = ray.at(rec.t);
    let lit = sum_unoccluded(scene, scene.lights().iter(), point, t_min, occluders, |l| {
        phong.shade(ray.direction(), rec.normal, l.direction, l.color)
    });
    background * phong.ambient + lit
}

/// `Σ BRDF · L · cos θ` over `lights`, without the surface color.
pub(crate) fn brdf_direct<'l>(
    scene: &Scene,
    material: &BrdfMaterial,
    lights: impl Iterator<Item = &'l Light>,
    ray: &Ray,
    rec: &HitRecord<'_>,
    t_min: f32,
    occluders: Occluders,
) -> Color {
    let point = ray.at(rec.t);
    let view = -ray.direction();
    sum_unoccluded(scene, lights, point, t_min, occluders, |l| {
        let cos = rec.normal.dot(l.direction);
        if cos <= 0.0 {
            return Color::ZERO;
        }
        material.eval(-l.direction, rec.normal, view, rec.tangent) * l.color * cos
    })
}
