//! Physically based BRDF models with importance sampling.
//!
//! Conventions for every model:
//! - `eval(incident, normal, outgoing, tangent)`: `incident` travels toward
//!   the surface, `outgoing` leaves it. Returns the BRDF value (the caller
//!   multiplies by surface color, radiance and cosine).
//! - `sample(incident, normal, tangent, rng)`: draw an outgoing direction
//!   for a ray arriving along `incident`.
//! - `pdf(incident, normal, outgoing, tangent)`: solid-angle density of
//!   `sample` producing `outgoing`.
//!
//! Two-lobe models pick the diffuse lobe (uniform hemisphere) with
//! probability `rho_d / (rho_d + rho_s)` and the specular lobe otherwise.

use crate::sampling::{gen_f32, reflect, tangent_frame, to_world, uniform_hemisphere};
use crate::Color;
use prism_math::Vec3;
use rand::RngCore;
use std::f32::consts::PI;

/// Normalized Phong lobe around the half vector.
#[derive(Debug, Clone, PartialEq)]
pub struct PhongBrdf {
    rho_d: f32,
    rho_s: f32,
    shininess: f32,
    diffuse_norm: f32,
    specular_norm: f32,
}

impl PhongBrdf {
    pub fn new(rho_d: f32, rho_s: f32, shininess: f32) -> Self {
        let specular_norm = rho_s * ((shininess + 2.0) * (shininess + 4.0))
            / ((8.0 * PI) * (2f32.powf(-shininess / 2.0) + shininess));
        Self {
            rho_d,
            rho_s,
            shininess,
            diffuse_norm: rho_d / PI,
            specular_norm,
        }
    }

    fn eval(&self, incident: Vec3, normal: Vec3, outgoing: Vec3) -> Color {
        let h = (outgoing - incident).normalize_or_zero();
        let nh = normal.dot(h).max(0.0);
        Color::splat(self.diffuse_norm + self.specular_norm * nh.powf(self.shininess))
    }

    fn sample(&self, incident: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        if gen_f32(rng) * (self.rho_d + self.rho_s) < self.rho_d {
            return to_world(uniform_hemisphere(rng), normal);
        }

        let cos_theta = gen_f32(rng).powf(1.0 / (self.shininess + 1.0));
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let phi = 2.0 * PI * gen_f32(rng);
        let h = to_world(
            Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta),
            normal,
        );
        reflect(incident, h)
    }

    fn pdf(&self, incident: Vec3, normal: Vec3, outgoing: Vec3) -> f32 {
        let total = self.rho_d + self.rho_s;
        let diffuse = self.rho_d / total / (2.0 * PI);

        let Some((nh, ho)) = half_vector_terms(incident, normal, outgoing) else {
            return diffuse;
        };
        let specular = self.rho_s / total * (self.shininess + 1.0) / (2.0 * PI)
            * nh.powf(self.shininess)
            / (4.0 * ho);
        diffuse + specular
    }
}

/// Cook-Torrance microfacet model with a GGX distribution and Schlick
/// Fresnel.
#[derive(Debug, Clone, PartialEq)]
pub struct CookTorrance {
    diffuse_norm: f32,
    specular_norm: f32,
    alpha: f32,
    alpha2: f32,
    k: f32,
    f0: Color,
}

impl CookTorrance {
    pub fn new(rho_d: f32, rho_s: f32, alpha: f32, f0: Color) -> Self {
        Self {
            diffuse_norm: rho_d / PI,
            specular_norm: rho_s / (4.0 * PI),
            alpha,
            alpha2: alpha * alpha,
            k: (alpha + 1.0) * (alpha + 1.0) / 8.0,
            f0,
        }
    }

    fn eval(&self, incident: Vec3, normal: Vec3, outgoing: Vec3) -> Color {
        let h = (outgoing - incident).normalize_or_zero();
        let ni = -normal.dot(incident);
        let no = normal.dot(outgoing);
        let nh = normal.dot(h);

        let d = nh * nh * (self.alpha2 - 1.0) + 1.0;
        let distribution = self.alpha2 / (d * d);
        let fresnel = self.f0 + (Color::ONE - self.f0) * (1.0 - no).powi(5);
        let geometry = 1.0 / ((ni * (1.0 - self.k) + self.k) * (no * (1.0 - self.k) + self.k));

        Color::splat(self.diffuse_norm) + self.specular_norm * distribution * geometry * fresnel
    }

    fn sample(&self, incident: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let xi = gen_f32(rng);
        let theta = (self.alpha * (xi / (1.0 - xi)).sqrt()).atan();
        let phi = 2.0 * PI * gen_f32(rng);
        let h = to_world(
            Vec3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos()),
            normal,
        );
        reflect(incident, h)
    }

    fn pdf(&self, incident: Vec3, normal: Vec3, outgoing: Vec3) -> f32 {
        let Some((nh, ho)) = half_vector_terms(incident, normal, outgoing) else {
            return 0.0;
        };
        let d = nh * nh * (self.alpha2 - 1.0) + 1.0;
        let distribution = self.alpha2 / (PI * d * d);
        distribution * nh / (4.0 * ho)
    }
}

/// Ward anisotropic model. Roughness `alpha_x` runs along the tangent,
/// `alpha_y` along the bitangent.
#[derive(Debug, Clone, PartialEq)]
pub struct Ward {
    rho_d: f32,
    rho_s: f32,
    alpha_x: f32,
    alpha_y: f32,
    diffuse_norm: f32,
    specular_norm: f32,
    /// Overrides the surface tangent when set
    fixed_tangent: Option<Vec3>,
}

impl Ward {
    pub fn new(rho_d: f32, rho_s: f32, alpha_x: f32, alpha_y: f32) -> Self {
        Self {
            rho_d,
            rho_s,
            alpha_x,
            alpha_y,
            diffuse_norm: rho_d / PI,
            specular_norm: rho_s / (4.0 * PI * alpha_x * alpha_y),
            fixed_tangent: None,
        }
    }

    /// Use `tangent` everywhere instead of the surface tangent.
    pub fn with_tangent(mut self, tangent: Vec3) -> Self {
        self.fixed_tangent = (tangent != Vec3::ZERO).then(|| tangent.normalize());
        self
    }

    fn tangent(&self, surface_tangent: Vec3) -> Vec3 {
        self.fixed_tangent.unwrap_or(surface_tangent)
    }

    /// `tan²θ_h (cos²φ_h / αx² + sin²φ_h / αy²)` for a half vector.
    fn exponent(&self, normal: Vec3, h: Vec3, tangent: Vec3) -> f32 {
        let nh = normal.dot(h);
        let h_flat = (h - nh * normal).normalize_or_zero();
        let ht = h_flat.dot(tangent);
        let ht2 = (ht * ht).min(1.0);
        (1.0 / (nh * nh) - 1.0)
            * (ht2 / (self.alpha_x * self.alpha_x) + (1.0 - ht2) / (self.alpha_y * self.alpha_y))
    }

    fn eval(&self, incident: Vec3, normal: Vec3, outgoing: Vec3, tangent: Vec3) -> Color {
        let ni = -normal.dot(incident);
        let no = normal.dot(outgoing);
        if ni <= 0.0 || no <= 0.0 {
            return Color::splat(self.diffuse_norm);
        }

        let h = (outgoing - incident).normalize();
        let tangent = tangent_frame(normal, self.tangent(tangent)).0;
        let e = self.exponent(normal, h, tangent);
        Color::splat(self.diffuse_norm + self.specular_norm / (ni * no).sqrt() * (-e).exp())
    }

    fn sample(&self, incident: Vec3, normal: Vec3, tangent: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        if gen_f32(rng) * (self.rho_d + self.rho_s) < self.rho_d {
            return to_world(uniform_hemisphere(rng), normal);
        }

        let (t, b) = tangent_frame(normal, self.tangent(tangent));

        // atan2 keeps φ in the quadrant of the uniformly drawn angle
        let angle = 2.0 * PI * gen_f32(rng);
        let phi = (self.alpha_y * angle.sin()).atan2(self.alpha_x * angle.cos());
        let (sin_phi, cos_phi) = phi.sin_cos();

        // 1 - ξ keeps the logarithm finite
        let xi = 1.0 - gen_f32(rng);
        let tan2 = -xi.ln()
            / (cos_phi * cos_phi / (self.alpha_x * self.alpha_x)
                + sin_phi * sin_phi / (self.alpha_y * self.alpha_y));
        let cos_theta = 1.0 / (1.0 + tan2).sqrt();
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

        let h = t * (sin_theta * cos_phi) + b * (sin_theta * sin_phi) + normal * cos_theta;
        reflect(incident, h)
    }

    fn pdf(&self, incident: Vec3, normal: Vec3, outgoing: Vec3, tangent: Vec3) -> f32 {
        let total = self.rho_d + self.rho_s;
        let diffuse = self.rho_d / total / (2.0 * PI);

        let h = (outgoing - incident).normalize_or_zero();
        let nh = normal.dot(h);
        let h = if nh < 0.0 { -h } else { h };
        let nh = nh.abs();
        let ho = h.dot(outgoing);
        if nh <= 1e-6 || ho <= 1e-8 {
            return diffuse;
        }

        let tangent = tangent_frame(normal, self.tangent(tangent)).0;
        let e = self.exponent(normal, h, tangent);
        let half_pdf = (-e).exp() / (PI * self.alpha_x * self.alpha_y * nh * nh * nh);
        diffuse + self.rho_s / total * half_pdf / (4.0 * ho)
    }
}

/// `(n·h, h·o)` for the half vector of `-incident` and `outgoing`, with `h`
/// flipped into the normal's hemisphere. `None` when degenerate.
fn half_vector_terms(incident: Vec3, normal: Vec3, outgoing: Vec3) -> Option<(f32, f32)> {
    let h = (outgoing - incident).normalize_or_zero();
    if h == Vec3::ZERO {
        return None;
    }
    let nh = normal.dot(h);
    let (nh, h) = if nh < 0.0 { (-nh, -h) } else { (nh, h) };
    let ho = h.dot(outgoing);
    (ho > 1e-8).then_some((nh, ho))
}

/// The closed set of BRDF models.
#[derive(Debug, Clone, PartialEq)]
pub enum BrdfModel {
    Phong(PhongBrdf),
    CookTorrance(CookTorrance),
    Ward(Ward),
}

impl BrdfModel {
    pub fn eval(&self, incident: Vec3, normal: Vec3, outgoing: Vec3, tangent: Vec3) -> Color {
        match self {
            BrdfModel::Phong(m) => m.eval(incident, normal, outgoing),
            BrdfModel::CookTorrance(m) => m.eval(incident, normal, outgoing),
            BrdfModel::Ward(m) => m.eval(incident, normal, outgoing, tangent),
        }
    }

    pub fn sample(
        &self,
        incident: Vec3,
        normal: Vec3,
        tangent: Vec3,
        rng: &mut dyn RngCore,
    ) -> Vec3 {
        match self {
            BrdfModel::Phong(m) => m.sample(incident, normal, rng),
            BrdfModel::CookTorrance(m) => m.sample(incident, normal, rng),
            BrdfModel::Ward(m) => m.sample(incident, normal, tangent, rng),
        }
    }

    pub fn pdf(&self, incident: Vec3, normal: Vec3, outgoing: Vec3, tangent: Vec3) -> f32 {
        match self {
            BrdfModel::Phong(m) => m.pdf(incident, normal, outgoing),
            BrdfModel::CookTorrance(m) => m.pdf(incident, normal, outgoing),
            BrdfModel::Ward(m) => m.pdf(incident, normal, outgoing, tangent),
        }
    }
}
