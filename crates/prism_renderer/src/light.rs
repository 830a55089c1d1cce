//! Light sources.
//!
//! Delta lights (directional, point) only illuminate. Area lights are
//! axis-aligned one-sided emitters that can also be hit by rays and sampled
//! by position for next-event estimation.

use std::f32::consts::PI;

use crate::{
    hittable::{HitRecord, Hittable, Surface},
    sampling::gen_f32,
    Color,
};
use prism_math::{Interval, Ray, Vec2, Vec3};
use rand::RngCore;

/// Light arriving at a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Illumination {
    /// Unit direction from the point toward the light
    pub direction: Vec3,
    pub color: Color,
    /// Distance to the light; infinite for directional lights
    pub distance: f32,
}

/// Light from infinitely far away, travelling along `direction`.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    direction: Vec3,
    color: Color,
}

impl DirectionalLight {
    pub fn new(direction: Vec3, color: Color) -> Self {
        Self {
            direction: direction.normalize(),
            color,
        }
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }
}

/// An isotropic point emitter without distance falloff.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
}

impl PointLight {
    pub fn new(position: Vec3, color: Color) -> Self {
        Self { position, color }
    }
}

/// Which way an axis-aligned emitter faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Facing {
    /// Index of the normal's axis.
    pub fn axis(self) -> usize {
        match self {
            Facing::PosX | Facing::NegX => 0,
            Facing::PosY | Facing::NegY => 1,
            Facing::PosZ | Facing::NegZ => 2,
        }
    }

    pub fn normal(self) -> Vec3 {
        let mut n = Vec3::ZERO;
        n[self.axis()] = match self {
            Facing::PosX | Facing::PosY | Facing::PosZ => 1.0,
            _ => -1.0,
        };
        n
    }
}

/// The plane `p[axis] = offset` with in-plane coordinates taken from the
/// next two axes in cyclic order.
#[derive(Debug, Clone, Copy, PartialEq)]
struct EmitterPlane {
    facing: Facing,
    offset: f32,
}

impl EmitterPlane {
    fn axes(&self) -> (usize, usize, usize) {
        let w = self.facing.axis();
        (w, (w + 1) % 3, (w + 2) % 3)
    }

    fn point(&self, uv: Vec2) -> Vec3 {
        let (w, u, v) = self.axes();
        let mut p = Vec3::ZERO;
        p[w] = self.offset;
        p[u] = uv.x;
        p[v] = uv.y;
        p
    }

    /// Ray parameter and in-plane coordinates where `ray` crosses the plane.
    fn cross(&self, ray: &Ray) -> Option<(f32, Vec2)> {
        let (w, u, v) = self.axes();
        let d = ray.direction();
        if d[w].abs() < 1e-8 {
            return None;
        }
        let o = ray.origin();
        let t = (self.offset - o[w]) / d[w];
        Some((t, Vec2::new(o[u] + t * d[u], o[v] + t * d[v])))
    }
}

/// Axis-aligned rectangle `u_range × v_range` in its plane.
#[derive(Debug, Clone, PartialEq)]
pub struct RectLight {
    plane: EmitterPlane,
    u_range: Interval,
    v_range: Interval,
    color: Color,
}

impl RectLight {
    /// A rectangle on `p[facing.axis()] = offset`, emitting toward
    /// `facing`.
    pub fn new(facing: Facing, offset: f32, u_range: Interval, v_range: Interval, color: Color) -> Self {
        if u_range.is_empty() || v_range.is_empty() {
            log::warn!("Rect light has an empty extent; it will never emit");
        }
        Self {
            plane: EmitterPlane { facing, offset },
            u_range,
            v_range,
            color,
        }
    }
}

/// Axis-aligned disc in its plane.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscLight {
    plane: EmitterPlane,
    center: Vec2,
    radius: f32,
    color: Color,
}

impl DiscLight {
    pub fn new(facing: Facing, offset: f32, center: Vec2, radius: f32, color: Color) -> Self {
        Self {
            plane: EmitterPlane { facing, offset },
            center,
            radius,
            color,
        }
    }
}

/// One-sided emitters with a finite surface.
#[derive(Debug, Clone, PartialEq)]
pub enum AreaLight {
    Rect(RectLight),
    Disc(DiscLight),
}

impl AreaLight {
    fn plane(&self) -> &EmitterPlane {
        match self {
            AreaLight::Rect(l) => &l.plane,
            AreaLight::Disc(l) => &l.plane,
        }
    }

    /// Emitted radiance on the front side.
    pub fn color(&self) -> Color {
        match self {
            AreaLight::Rect(l) => l.color,
            AreaLight::Disc(l) => l.color,
        }
    }

    /// Unit normal of the emitting side.
    pub fn normal(&self) -> Vec3 {
        self.plane().facing.normal()
    }

    pub fn area(&self) -> f32 {
        match self {
            AreaLight::Rect(l) => l.u_range.size() * l.v_range.size(),
            AreaLight::Disc(l) => PI * l.radius * l.radius,
        }
    }

    pub fn center(&self) -> Vec3 {
        let uv = match self {
            AreaLight::Rect(l) => Vec2::new(
                0.5 * (l.u_range.min + l.u_range.max),
                0.5 * (l.v_range.min + l.v_range.max),
            ),
            AreaLight::Disc(l) => l.center,
        };
        self.plane().point(uv)
    }

    /// A point drawn uniformly over the surface.
    pub fn sample_point(&self, rng: &mut dyn RngCore) -> Vec3 {
        let uv = match self {
            AreaLight::Rect(l) => Vec2::new(
                l.u_range.min + gen_f32(rng) * l.u_range.size(),
                l.v_range.min + gen_f32(rng) * l.v_range.size(),
            ),
            AreaLight::Disc(l) => {
                let r = gen_f32(rng).sqrt() * l.radius;
                let phi = gen_f32(rng) * (2.0 * PI);
                l.center + r * Vec2::new(phi.cos(), phi.sin())
            }
        };
        self.plane().point(uv)
    }

    fn contains(&self, uv: Vec2) -> bool {
        match self {
            AreaLight::Rect(l) => l.u_range.contains(uv.x) && l.v_range.contains(uv.y),
            AreaLight::Disc(l) => (uv - l.center).length_squared() <= l.radius * l.radius,
        }
    }

    /// Light from the center, if `p` is on the emitting side.
    pub fn illuminate(&self, p: Vec3) -> Option<Illumination> {
        let to_light = self.center() - p;
        let distance = to_light.length();
        if distance < 1e-12 || to_light.dot(self.normal()) >= 0.0 {
            return None;
        }
        Some(Illumination {
            direction: to_light / distance,
            color: self.color(),
            distance,
        })
    }
}

impl Hittable for AreaLight {
    /// Front hits carry the light's color, back hits carry black.
    fn hit<'a>(&'a self, ray: &Ray, t_min: f32, rec: &mut HitRecord<'a>) -> bool {
        let Some((t, uv)) = self.plane().cross(ray) else {
            return false;
        };
        if !rec.accepts(t, t_min) || !self.contains(uv) {
            return false;
        }

        let normal = self.normal();
        let front_face = ray.direction().dot(normal) < 0.0;
        let (emitted, facing) = if front_face {
            (self.color(), normal)
        } else {
            (Color::ZERO, -normal)
        };
        rec.set(
            t,
            Surface::Emissive(emitted),
            facing,
            emitted,
            front_face,
            Vec3::ZERO,
        );
        true
    }
}

/// The closed set of light sources.
#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    Directional(DirectionalLight),
    Point(PointLight),
    Area(AreaLight),
}

impl Light {
    /// Direction, color and distance of the light as seen from `p`.
    pub fn illuminate(&self, p: Vec3) -> Option<Illumination> {
        match self {
            Light::Directional(l) => Some(Illumination {
                direction: -l.direction,
                color: l.color,
                distance: f32::INFINITY,
            }),
            Light::Point(l) => {
                let to_light = l.position - p;
                let distance = to_light.length();
                if distance < 1e-12 {
                    return None;
                }
                Some(Illumination {
                    direction: to_light / distance,
                    color: l.color,
                    distance,
                })
            }
            Light::Area(l) => l.illuminate(p),
        }
    }

    pub fn as_area(&self) -> Option<&AreaLight> {
        match self {
            Light::Area(l) => Some(l),
            _ => None,
        }
    }

    pub fn is_delta(&self) -> bool {
        !matches!(self, Light::Area(_))
    }
}

impl From<DirectionalLight> for Light {
    fn from(light: DirectionalLight) -> Self {
        Light::Directional(light)
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}

impl From<AreaLight> for Light {
    fn from(light: AreaLight) -> Self {
        Light::Area(light)
    }
}

impl From<RectLight> for Light {
    fn from(light: RectLight) -> Self {
        Light::Area(AreaLight::Rect(light))
    }
}

impl From<DiscLight> for Light {
    fn from(light: DiscLight) -> Self {
        Light::Area(AreaLight::Disc(light))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// 2x2 ceiling panel at y = 3 shining down.
    fn ceiling() -> AreaLight {
        AreaLight::Rect(RectLight::new(
            Facing::NegY,
            3.0,
            Interval::new(-1.0, 1.0),
            Interval::new(-1.0, 1.0),
            Color::splat(4.0),
        ))
    }

    fn disc() -> AreaLight {
        AreaLight::Disc(DiscLight::new(
            Facing::PosX,
            -2.0,
            Vec2::new(1.0, 0.5),
            0.5,
            Color::ONE,
        ))
    }

    #[test]
    fn test_delta_lights() {
        let sun = Light::from(DirectionalLight::new(Vec3::new(0.0, -2.0, 0.0), Color::ONE));
        let lit = sun.illuminate(Vec3::new(5.0, 0.0, 5.0)).unwrap();
        assert_eq!(lit.direction, Vec3::Y);
        assert!(lit.distance.is_infinite());
        assert!(sun.is_delta());

        let bulb = Light::from(PointLight::new(Vec3::new(0.0, 4.0, 0.0), Color::X));
        let lit = bulb.illuminate(Vec3::new(0.0, 1.0, 0.0)).unwrap();
        assert_eq!(lit.direction, Vec3::Y);
        assert_eq!(lit.distance, 3.0);
        assert_eq!(lit.color, Color::X);
    }

    #[test]
    fn test_rect_light_geometry() {
        let light = ceiling();
        assert_eq!(light.normal(), -Vec3::Y);
        assert_eq!(light.area(), 4.0);
        assert_eq!(light.center(), Vec3::new(0.0, 3.0, 0.0));

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let p = light.sample_point(&mut rng);
            assert_eq!(p.y, 3.0);
            assert!(p.x.abs() <= 1.0 && p.z.abs() <= 1.0);
        }
    }

    #[test]
    fn test_disc_samples_stay_inside() {
        let light = disc();
        assert!((light.area() - PI * 0.25).abs() < 1e-6);
        // u-axis is y, v-axis is z for an x-facing emitter
        assert_eq!(light.center(), Vec3::new(-2.0, 1.0, 0.5));

        let mut rng = StdRng::seed_from_u64(12);
        let mut mean = Vec3::ZERO;
        for _ in 0..4000 {
            let p = light.sample_point(&mut rng);
            assert_eq!(p.x, -2.0);
            assert!((p - light.center()).length() <= 0.5 + 1e-5);
            mean += p / 4000.0;
        }
        assert!((mean - light.center()).length() < 0.02);
    }

    #[test]
    fn test_area_light_front_and_back_hits() {
        let light = ceiling();

        let down = Ray::new(Vec3::ZERO, Vec3::Y);
        let mut rec = HitRecord::new();
        assert!(light.hit(&down, 1e-4, &mut rec));
        assert_eq!(rec.t, 3.0);
        assert!(rec.front_face);
        assert!(matches!(rec.surface, Surface::Emissive(c) if c == Color::splat(4.0)));
        assert_eq!(rec.normal, -Vec3::Y);

        let from_above = Ray::new(Vec3::new(0.5, 5.0, 0.5), -Vec3::Y);
        let mut rec = HitRecord::new();
        assert!(light.hit(&from_above, 1e-4, &mut rec));
        assert!(!rec.front_face);
        assert!(matches!(rec.surface, Surface::Emissive(c) if c == Color::ZERO));
        assert_eq!(rec.normal, Vec3::Y);

        // Outside the panel, parallel, or beyond the current best
        let outside = Ray::new(Vec3::new(1.5, 0.0, 0.0), Vec3::Y);
        let mut rec = HitRecord::new();
        assert!(!light.hit(&outside, 1e-4, &mut rec));
        let parallel = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(!light.hit(&parallel, 1e-4, &mut rec));
        let mut rec = HitRecord::with_max(2.0);
        assert!(!light.hit(&down, 1e-4, &mut rec));
        assert!(!rec.is_hit());
    }

    #[test]
    fn test_area_illuminates_emitting_side_only() {
        let light = Light::from(AreaLight::Rect(RectLight::new(
            Facing::NegY,
            3.0,
            Interval::new(-1.0, 1.0),
            Interval::new(-1.0, 1.0),
            Color::ONE,
        )));
        let below = light.illuminate(Vec3::ZERO).unwrap();
        assert_eq!(below.direction, Vec3::Y);
        assert_eq!(below.distance, 3.0);
        assert!(light.illuminate(Vec3::new(0.0, 4.0, 0.0)).is_none());
        assert!(light.as_area().is_some());
    }
}
