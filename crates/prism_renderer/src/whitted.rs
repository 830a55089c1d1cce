//! Recursive Whitted-style ray tracing.
//!
//! Specular materials spawn deterministic secondary rays; diffuse shading
//! comes from point-sampled lights. Area lights shade from their centers
//! here and show up as emitters when a ray hits them.

use crate::{
    camera::Camera,
    hittable::{HitRecord, Surface},
    integrator::{brdf_direct, shade_phong, Integrator},
    material::Material,
    sampling::{reflect, refract},
    scene::{Occluders, Scene},
    Color,
};
use prism_core::RenderSettings;
use prism_math::{Ray, Vec2};

/// Attenuation below which a path is treated as black.
const MIN_RATE_SQUARED: f32 = 1e-6;

pub struct Whitted<'s> {
    scene: &'s Scene,
    settings: &'s RenderSettings,
}

impl<'s> Whitted<'s> {
    pub fn new(scene: &'s Scene, settings: &'s RenderSettings) -> Self {
        Self { scene, settings }
    }

    /// Radiance along `ray` scaled by the path attenuation `rate`.
    pub fn trace(&self, ray: &Ray, rate: Color, depth: u32) -> Color {
        if rate.length_squared() < MIN_RATE_SQUARED {
            return Color::ZERO;
        }

        let rec = self.scene.intersect(ray, self.settings.t_min).rec;
        match rec.surface {
            Surface::None => self.settings.background * rate,
            Surface::Emissive(emitted) => emitted * rate,
            Surface::Material(_) if depth >= self.settings.max_depth => Color::ZERO,
            Surface::Material(material) => self.shade(ray, &rec, material, rate, depth),
        }
    }

    fn shade(
        &self,
        ray: &Ray,
        rec: &HitRecord<'_>,
        material: &Material,
        rate: Color,
        depth: u32,
    ) -> Color {
        let t_min = self.settings.t_min;
        let point = ray.at(rec.t);
        let mirrored = || Ray::new(point, reflect(ray.direction(), rec.normal));

        match material {
            Material::Phong(phong) => {
                shade_phong(
                    self.scene,
                    phong,
                    ray,
                    rec,
                    self.settings.background,
                    t_min,
                    Occluders::Geometry,
                ) * rate
            }
            Material::Mirror(_) => self.trace(&mirrored(), rate * rec.color, depth + 1),
            Material::Refractive(glass) => {
                match refract(ray.direction(), rec.normal, rec.front_face, glass.ior) {
                    Some(r) => self.trace(
                        &Ray::new(point, r.direction),
                        rate * rec.color / r.weight,
                        depth + 1,
                    ),
                    None => self.trace(&mirrored(), rate * rec.color, depth + 1),
                }
            }
            Material::Fresnel(fresnel) => {
                match refract(ray.direction(), rec.normal, rec.front_face, fresnel.ior) {
                    Some(r) => {
                        let incident = if rec.front_face { ray.direction() } else { r.direction };
                        let p = fresnel.reflect_prob(-rec.normal.dot(incident));
                        let reflected = self.trace(&mirrored(), rate * rec.color * p, depth + 1);
                        let refracted = self.trace(
                            &Ray::new(point, r.direction),
                            rate * rec.color * (1.0 - p) / r.weight,
                            depth + 1,
                        );
                        reflected + refracted
                    }
                    None => self.trace(&mirrored(), rate * rec.color, depth + 1),
                }
            }
            Material::Brdf(brdf) => {
                let direct = brdf_direct(
                    self.scene,
                    brdf,
                    self.scene.lights().iter(),
                    ray,
                    rec,
                    t_min,
                    Occluders::Geometry,
                );
                rec.color * direct * rate
            }
        }
    }
}

impl Integrator for Whitted<'_> {
    /// One ray through the pixel center.
    fn pixel_color(&self, camera: &dyn Camera, x: u32, y: u32) -> Color {
        let ray = camera.generate_ray(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
        self.trace(&ray, Color::ONE, 0)
    }
}
