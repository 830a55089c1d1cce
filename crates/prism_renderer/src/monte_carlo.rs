//! Monte Carlo path tracing with next-event estimation.
//!
//! Each call to [`MonteCarlo::trace`] follows one stochastic path. BRDF
//! surfaces draw one continuation direction by the configured
//! [`SamplingStrategy`] and, for the NEE strategies, also sample every area
//! light directly; the two estimates are combined with the balance
//! heuristic.

use crate::{
    camera::Camera,
    hittable::{HitRecord, Hittable, Surface},
    integrator::{brdf_direct, shade_phong, Integrator},
    material::{BrdfMaterial, Material},
    sampling::{cosine_hemisphere, gen_f32, hammersley, reflect, refract, to_world, uniform_hemisphere},
    scene::{Occluders, Scene},
    Color,
};
use prism_core::{RenderSettings, SamplingStrategy};
use prism_math::{Ray, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::f32::consts::PI;

pub struct MonteCarlo<'s> {
    scene: &'s Scene,
    settings: &'s RenderSettings,
}

/// Draw a continuation direction around `normal`.
fn sample_direction(
    strategy: SamplingStrategy,
    material: &BrdfMaterial,
    incident: Vec3,
    normal: Vec3,
    tangent: Vec3,
    rng: &mut dyn RngCore,
) -> Vec3 {
    match strategy {
        SamplingStrategy::Uniform | SamplingStrategy::NeeUniform => {
            to_world(uniform_hemisphere(rng), normal)
        }
        SamplingStrategy::NeeCosine => to_world(cosine_hemisphere(rng), normal),
        SamplingStrategy::NeeBrdf => material.sample(incident, normal, tangent, rng),
        SamplingStrategy::Mis => {
            if gen_f32(rng) < 0.5 {
                to_world(cosine_hemisphere(rng), normal)
            } else {
                material.sample(incident, normal, tangent, rng)
            }
        }
    }
}

/// Solid-angle density of [`sample_direction`] producing `outgoing`; zero
/// below the surface.
fn direction_pdf(
    strategy: SamplingStrategy,
    material: &BrdfMaterial,
    incident: Vec3,
    normal: Vec3,
    outgoing: Vec3,
    tangent: Vec3,
) -> f32 {
    let cos = normal.dot(outgoing);
    if cos < 0.0 {
        return 0.0;
    }
    match strategy {
        SamplingStrategy::Uniform | SamplingStrategy::NeeUniform => 1.0 / (2.0 * PI),
        SamplingStrategy::NeeCosine => cos / PI,
        SamplingStrategy::NeeBrdf => material.pdf(incident, normal, outgoing, tangent),
        SamplingStrategy::Mis => {
            (cos / PI + material.pdf(incident, normal, outgoing, tangent)) / 2.0
        }
    }
}

/// Solid-angle density of picking the point `rec` describes by uniform
/// area sampling.
fn light_pdf(rec: &HitRecord<'_>, direction: Vec3, area: f32) -> f32 {
    rec.t * rec.t / (rec.normal.dot(direction).abs() * area)
}

impl<'s> MonteCarlo<'s> {
    pub fn new(scene: &'s Scene, settings: &'s RenderSettings) -> Self {
        Self { scene, settings }
    }

    /// Radiance along `ray`, plus the index of the area light it hit from
    /// the front, if any.
    pub fn trace(&self, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> (Color, Option<usize>) {
        let found = self.scene.intersect(ray, self.settings.t_min);
        let rec = found.rec;
        let material = match rec.surface {
            Surface::None => return (Color::ZERO, None),
            Surface::Emissive(emitted) => return (emitted, found.light),
            Surface::Material(material) => material,
        };
        if depth >= self.settings.max_depth {
            return (Color::ZERO, None);
        }

        let rr = self.settings.rr_prob;
        if gen_f32(rng) < rr {
            return (Color::ZERO, None);
        }

        let color = self.shade(ray, &rec, material, depth, rng);
        (color / (1.0 - rr), None)
    }

    fn shade(
        &self,
        ray: &Ray,
        rec: &HitRecord<'_>,
        material: &Material,
        depth: u32,
        rng: &mut dyn RngCore,
    ) -> Color {
        let point = ray.at(rec.t);
        let mirrored = Ray::new(point, reflect(ray.direction(), rec.normal));

        match material {
            Material::Phong(phong) => shade_phong(
                self.scene,
                phong,
                ray,
                rec,
                self.settings.background,
                self.settings.t_min,
                Occluders::GeometryAndLights { except: None },
            ),
            Material::Mirror(_) => rec.color * self.trace(&mirrored, depth + 1, rng).0,
            Material::Refractive(glass) => {
                match refract(ray.direction(), rec.normal, rec.front_face, glass.ior) {
                    Some(r) => {
                        rec.color * self.trace(&Ray::new(point, r.direction), depth + 1, rng).0
                            / r.weight
                    }
                    None => rec.color * self.trace(&mirrored, depth + 1, rng).0,
                }
            }
            Material::Fresnel(fresnel) => {
                match refract(ray.direction(), rec.normal, rec.front_face, fresnel.ior) {
                    Some(r) => {
                        let incident = if rec.front_face { ray.direction() } else { r.direction };
                        if gen_f32(rng) < fresnel.reflect_prob(-rec.normal.dot(incident)) {
                            rec.color * self.trace(&mirrored, depth + 1, rng).0
                        } else {
                            rec.color * self.trace(&Ray::new(point, r.direction), depth + 1, rng).0
                                / r.weight
                        }
                    }
                    None => rec.color * self.trace(&mirrored, depth + 1, rng).0,
                }
            }
            Material::Brdf(brdf) => self.shade_brdf(ray, rec, brdf, depth, rng),
        }
    }

    fn shade_brdf(
        &self,
        ray: &Ray,
        rec: &HitRecord<'_>,
        material: &BrdfMaterial,
        depth: u32,
        rng: &mut dyn RngCore,
    ) -> Color {
        let strategy = self.settings.sampling;
        let t_min = self.settings.t_min;
        let (incident, normal, tangent) = (ray.direction(), rec.normal, rec.tangent);
        let view = -incident;
        let point = ray.at(rec.t);

        // Continuation ray
        let direction = sample_direction(strategy, material, incident, normal, tangent, rng);
        let pdf_brdf = direction_pdf(strategy, material, incident, normal, direction, tangent);
        let bounce = Ray::new(point, direction);

        let mut weight = 1.0;
        let mut indirect = Color::ZERO;
        let mut seen_light = None;
        if normal.dot(direction) >= 0.0 && pdf_brdf > 0.0 {
            let (incoming, light) = self.trace(&bounce, depth + 1, rng);
            indirect = material.eval(-direction, normal, view, tangent) * incoming * normal.dot(direction);
            weight = 1.0 / pdf_brdf;
            seen_light = light;
        }

        let mut direct = Color::ZERO;
        if strategy.uses_nee() {
            // The light-sampling density only enters when the continuation
            // ray actually landed on an area light
            if let Some(area) = seen_light.and_then(|i| self.scene.lights()[i].as_area()) {
                let mut on_light = HitRecord::new();
                if area.hit(&bounce, t_min, &mut on_light) {
                    weight = 1.0 / (pdf_brdf + light_pdf(&on_light, direction, area.area()));
                }
            }

            for (index, area) in self.scene.area_lights() {
                let target = area.sample_point(rng);
                let to_light = (target - point).normalize_or_zero();
                if to_light.dot(normal) < 0.0 {
                    continue;
                }

                let shadow = Ray::new(point, to_light);
                let mut on_light = HitRecord::new();
                if !area.hit(&shadow, t_min, &mut on_light) || !on_light.front_face {
                    continue;
                }
                if self.scene.occluded(
                    point,
                    to_light,
                    on_light.t,
                    t_min,
                    Occluders::GeometryAndLights { except: Some(index) },
                ) {
                    continue;
                }

                let pdf_brdf = direction_pdf(strategy, material, incident, normal, to_light, tangent);
                let pdf_light = light_pdf(&on_light, to_light, area.area());
                direct += material.eval(-to_light, normal, view, tangent)
                    * on_light.color
                    * normal.dot(to_light)
                    / (pdf_brdf + pdf_light);
            }
        }

        // Point and directional lights can only be reached by sampling them
        direct += brdf_direct(
            self.scene,
            material,
            self.scene.lights().iter().filter(|l| l.is_delta()),
            ray,
            rec,
            t_min,
            Occluders::GeometryAndLights { except: None },
        );

        rec.color * (weight * indirect + direct)
    }
}

impl Integrator for MonteCarlo<'_> {
    /// Average of `spp` paths from a generator seeded by the pixel index.
    fn pixel_color(&self, camera: &dyn Camera, x: u32, y: u32) -> Color {
        let spp = self.settings.spp.max(1);
        let mut rng = StdRng::seed_from_u64(u64::from(y) * u64::from(camera.width()) + u64::from(x));
        let origin = Vec2::new(x as f32, y as f32);

        let mut sum = Color::ZERO;
        for k in 0..spp {
            let offset = if self.settings.jitter {
                hammersley(k, spp)
            } else {
                Vec2::splat(0.5)
            };
            let ray = camera.generate_ray(origin + offset);
            sum += self.trace(&ray, 0, &mut rng).0;
        }
        sum / spp as f32
    }
}
