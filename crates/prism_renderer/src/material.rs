//! Surface materials.
//!
//! Materials split into local-shading (`Phong`, evaluated per light) and
//! transport materials (`Mirror`, `Refractive`, `Fresnel`, `Brdf`), which the
//! integrators continue through by spawning new rays.

use std::sync::Arc;

use crate::brdf::BrdfModel;
use prism_core::Texture;
use prism_math::Vec3;
use rand::RngCore;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Classic Phong reflection with ambient, diffuse and specular terms.
#[derive(Debug, Clone, PartialEq)]
pub struct Phong {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub shininess: f32,
}

impl Phong {
    /// Light reflected toward the viewer from one light.
    ///
    /// `view` is the incoming ray direction, `to_light` the unit direction
    /// toward the light.
    pub fn shade(&self, view: Vec3, normal: Vec3, to_light: Vec3, light_color: Color) -> Color {
        let mut shaded = Color::ZERO;

        let ln = to_light.dot(normal);
        if ln > 0.0 {
            shaded += ln * self.diffuse;
        }

        let mirrored = 2.0 * ln * normal - to_light;
        let rv = (-view).dot(mirrored);
        if rv > 0.0 {
            shaded += rv.powf(self.shininess) * self.specular;
        }

        shaded * light_color
    }
}

/// Perfect mirror reflecting a fraction `rate` of incoming light.
#[derive(Debug, Clone, PartialEq)]
pub struct Mirror {
    pub rate: f32,
}

/// Dielectric that always refracts (reflecting only on total internal
/// reflection), transmitting a fraction `rate`.
#[derive(Debug, Clone, PartialEq)]
pub struct Refractive {
    pub ior: f32,
    pub rate: f32,
}

/// Dielectric that splits between reflection and refraction by Schlick's
/// approximation.
#[derive(Debug, Clone, PartialEq)]
pub struct Fresnel {
    pub ior: f32,
    pub rate: f32,
    f0: f32,
}

impl Fresnel {
    pub fn new(ior: f32, rate: f32) -> Self {
        let f0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        Self { ior, rate, f0 }
    }

    /// Probability of reflection for a ray making angle θ with the normal,
    /// where `cos_theta` is measured on the less dense side.
    pub fn reflect_prob(&self, cos_theta: f32) -> f32 {
        let x = (1.0 - cos_theta).clamp(0.0, 1.0);
        self.f0 + (1.0 - self.f0) * x.powi(5)
    }
}

/// A BRDF-driven material with an optional diffuse color texture.
#[derive(Debug, Clone)]
pub struct BrdfMaterial {
    pub model: BrdfModel,
    pub color: Color,
    pub texture: Option<Arc<Texture>>,
}

impl BrdfMaterial {
    pub fn new(model: BrdfModel, color: Color) -> Self {
        Self {
            model,
            color,
            texture: None,
        }
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    #[inline]
    pub fn eval(&self, incident: Vec3, normal: Vec3, outgoing: Vec3, tangent: Vec3) -> Color {
        self.model.eval(incident, normal, outgoing, tangent)
    }

    #[inline]
    pub fn sample(&self, incident: Vec3, normal: Vec3, tangent: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.model.sample(incident, normal, tangent, rng)
    }

    #[inline]
    pub fn pdf(&self, incident: Vec3, normal: Vec3, outgoing: Vec3, tangent: Vec3) -> f32 {
        self.model.pdf(incident, normal, outgoing, tangent)
    }
}

/// The closed set of surface materials.
#[derive(Debug, Clone)]
pub enum Material {
    Phong(Phong),
    Mirror(Mirror),
    Refractive(Refractive),
    Fresnel(Fresnel),
    Brdf(BrdfMaterial),
}

impl Material {
    pub fn phong(ambient: Color, diffuse: Color, specular: Color, shininess: f32) -> Self {
        Material::Phong(Phong {
            ambient,
            diffuse,
            specular,
            shininess,
        })
    }

    pub fn mirror(rate: f32) -> Self {
        Material::Mirror(Mirror { rate })
    }

    pub fn refractive(ior: f32, rate: f32) -> Self {
        Material::Refractive(Refractive { ior, rate })
    }

    pub fn fresnel(ior: f32, rate: f32) -> Self {
        Material::Fresnel(Fresnel::new(ior, rate))
    }

    pub fn brdf(model: BrdfModel, color: Color) -> Self {
        Material::Brdf(BrdfMaterial::new(model, color))
    }

    /// Untextured surface color.
    pub fn base_color(&self) -> Color {
        match self {
            Material::Phong(m) => m.diffuse,
            Material::Mirror(m) => Color::splat(m.rate),
            Material::Refractive(m) => Color::splat(m.rate),
            Material::Fresnel(m) => Color::splat(m.rate),
            Material::Brdf(m) => m.color,
        }
    }

    pub fn texture(&self) -> Option<&Texture> {
        match self {
            Material::Brdf(m) => m.texture.as_deref(),
            _ => None,
        }
    }

    pub fn has_texture(&self) -> bool {
        self.texture().is_some()
    }

    /// Surface color at texture coordinates `(u, v)`.
    pub fn color_at(&self, u: f32, v: f32) -> Color {
        match self.texture() {
            Some(texture) => texture.color_at(u, v),
            None => self.base_color(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brdf::PhongBrdf;

    #[test]
    fn test_phong_shade_diffuse_and_specular() {
        let phong = Phong {
            ambient: Color::ZERO,
            diffuse: Color::new(0.5, 0.5, 0.5),
            specular: Color::ONE,
            shininess: 10.0,
        };

        // Light straight above, viewer straight above: full diffuse + specular
        let c = phong.shade(-Vec3::Y, Vec3::Y, Vec3::Y, Color::ONE);
        assert!((c - Color::splat(1.5)).length() < 1e-5);

        // Grazing light gives nothing diffuse
        let c = phong.shade(-Vec3::Y, Vec3::Y, -Vec3::Y, Color::ONE);
        assert_eq!(c, Color::ZERO);
    }

    #[test]
    fn test_fresnel_reflect_prob() {
        let glass = Fresnel::new(1.5, 1.0);
        assert!((glass.reflect_prob(1.0) - 0.04).abs() < 1e-5);
        assert!((glass.reflect_prob(0.0) - 1.0).abs() < 1e-5);
        assert!(glass.reflect_prob(0.5) > glass.reflect_prob(0.9));
    }

    #[test]
    fn test_base_color_and_texture() {
        assert_eq!(Material::mirror(0.8).base_color(), Color::splat(0.8));
        assert_eq!(Material::refractive(1.5, 0.9).base_color(), Color::splat(0.9));

        let plain = Material::brdf(BrdfModel::Phong(PhongBrdf::new(1.0, 0.0, 1.0)), Color::X);
        assert!(!plain.has_texture());
        assert_eq!(plain.color_at(0.3, 0.3), Color::X);

        let texture = Arc::new(Texture::solid_color(Color::Y));
        let textured = match plain {
            Material::Brdf(m) => Material::Brdf(m.with_texture(texture)),
            _ => unreachable!(),
        };
        assert!(textured.has_texture());
        assert_eq!(textured.color_at(0.3, 0.3), Color::Y);
        assert_eq!(textured.base_color(), Color::X);
    }
}
