//! Direction helpers and random sampling shared by materials and
//! integrators.
//!
//! Incident directions point toward the surface; normals face the incoming
//! ray (`dot(incident, normal) <= 0`).

use prism_math::{Vec2, Vec3};
use rand::{Rng, RngCore};
use std::f32::consts::PI;

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Mirror `incident` about `normal`.
#[inline]
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * incident.dot(normal) * normal
}

/// A refracted direction and its transport weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Refraction {
    pub direction: Vec3,
    /// `|cos θ_i| / cos θ_t`; radiance carried through the boundary is
    /// divided by this.
    pub weight: f32,
}

/// Refract through a boundary with index of refraction `ior`.
///
/// `front_face` tells whether the ray is entering the denser medium.
/// Returns `None` on total internal reflection.
pub fn refract(incident: Vec3, normal: Vec3, front_face: bool, ior: f32) -> Option<Refraction> {
    let dot = incident.dot(normal);
    let eta = if front_face { 1.0 / ior } else { ior };

    let sin_i = (1.0 - dot * dot).max(0.0).sqrt();
    let sin_t = sin_i * eta;
    if sin_t >= 1.0 {
        return None;
    }

    let cos_t = (1.0 - sin_t * sin_t).sqrt();
    let direction = if sin_i < 1e-8 {
        // Head-on: no tangential component to scale
        -normal
    } else {
        -cos_t * normal + sin_t * (incident - dot * normal) / sin_i
    };

    Some(Refraction {
        direction,
        weight: (dot / cos_t).abs(),
    })
}

/// Uniform direction on the +Z hemisphere (pdf `1 / 2π`).
pub fn uniform_hemisphere(rng: &mut dyn RngCore) -> Vec3 {
    let phi = gen_f32(rng) * (2.0 * PI);
    let z = gen_f32(rng);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Cosine-weighted direction on the +Z hemisphere (pdf `cos θ / π`).
pub fn cosine_hemisphere(rng: &mut dyn RngCore) -> Vec3 {
    let r = gen_f32(rng).sqrt();
    let phi = gen_f32(rng) * (2.0 * PI);
    Vec3::new(r * phi.cos(), r * phi.sin(), (1.0 - r * r).max(0.0).sqrt())
}

/// Map a +Z-hemisphere direction into the frame around `normal`.
pub fn to_world(local: Vec3, normal: Vec3) -> Vec3 {
    let helper = if normal.x.abs() > 0.5 { Vec3::Y } else { Vec3::X };
    let u = helper.cross(normal).normalize();
    let v = u.cross(normal);
    u * local.x + v * local.y + normal * local.z
}

/// Orthonormal frame `(tangent, bitangent)` around `normal`, keeping
/// `tangent` as close to the given hint as possible.
pub fn tangent_frame(normal: Vec3, hint: Vec3) -> (Vec3, Vec3) {
    let projected = hint - normal * hint.dot(normal);
    let tangent = if projected.length_squared() > 1e-12 {
        projected.normalize()
    } else {
        let helper = if normal.x.abs() > 0.5 { Vec3::Y } else { Vec3::X };
        helper.cross(normal).normalize()
    };
    (tangent, normal.cross(tangent))
}

/// Base-2 radical inverse of `k` (van der Corput sequence).
pub fn radical_inverse(mut k: u32) -> f32 {
    let mut result = 0.0_f32;
    let mut weight = 0.5_f32;
    while k != 0 {
        if k & 1 == 1 {
            result += weight;
        }
        weight *= 0.5;
        k >>= 1;
    }
    result
}

/// The k-th of n Hammersley points in the unit square.
pub fn hammersley(k: u32, n: u32) -> Vec2 {
    Vec2::new((k as f32 + 0.5) / n.max(1) as f32, radical_inverse(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_reflect() {
        let r = reflect(Vec3::new(1.0, -1.0, 0.0).normalize(), Vec3::Y);
        assert!((r - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-6);
    }

    #[test]
    fn test_refract_head_on() {
        let r = refract(-Vec3::Y, Vec3::Y, true, 1.5).unwrap();
        assert!((r.direction + Vec3::Y).length() < 1e-6);
        assert!((r.weight - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_refract_snell() {
        let incident = Vec3::new(0.5_f32.sqrt(), -0.5_f32.sqrt(), 0.0);
        let r = refract(incident, Vec3::Y, true, 1.5).unwrap();

        let sin_i = incident.x;
        let sin_t = r.direction.x;
        assert!((sin_i - 1.5 * sin_t).abs() < 1e-5);
        assert!((r.direction.length() - 1.0).abs() < 1e-5);
        assert!(r.direction.y < 0.0);
    }

    #[test]
    fn test_total_internal_reflection() {
        // Leaving glass at 60 degrees exceeds the ~41.8 degree critical angle
        let incident = Vec3::new(60f32.to_radians().sin(), -60f32.to_radians().cos(), 0.0);
        assert!(refract(incident, Vec3::Y, false, 1.5).is_none());
        assert!(refract(incident, Vec3::Y, true, 1.5).is_some());
    }

    #[test]
    fn test_hemisphere_samples_are_unit_and_upper() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let u = uniform_hemisphere(&mut rng);
            let c = cosine_hemisphere(&mut rng);
            assert!((u.length() - 1.0).abs() < 1e-4 && u.z >= 0.0);
            assert!((c.length() - 1.0).abs() < 1e-4 && c.z >= 0.0);
        }
    }

    #[test]
    fn test_cosine_hemisphere_mean() {
        // E[cos θ] is 2/3 under the cosine-weighted pdf, 1/2 under uniform
        let mut rng = StdRng::seed_from_u64(11);
        let n = 100_000;
        let cos_mean: f32 = (0..n).map(|_| cosine_hemisphere(&mut rng).z).sum::<f32>() / n as f32;
        let uni_mean: f32 = (0..n).map(|_| uniform_hemisphere(&mut rng).z).sum::<f32>() / n as f32;
        assert!((cos_mean - 2.0 / 3.0).abs() < 0.01);
        assert!((uni_mean - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_to_world_keeps_normal_axis() {
        for normal in [Vec3::X, -Vec3::Y, Vec3::new(1.0, 2.0, -3.0).normalize()] {
            let w = to_world(Vec3::Z, normal);
            assert!((w - normal).length() < 1e-5);

            let side = to_world(Vec3::X, normal);
            assert!(side.dot(normal).abs() < 1e-5);
            assert!((side.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_tangent_frame() {
        let (t, b) = tangent_frame(Vec3::Y, Vec3::new(1.0, 1.0, 0.0));
        assert!((t - Vec3::X).length() < 1e-6);
        assert!(b.dot(Vec3::Y).abs() < 1e-6 && b.dot(t).abs() < 1e-6);

        // Hint parallel to the normal still yields a valid frame
        let (t, b) = tangent_frame(Vec3::Z, Vec3::Z);
        assert!(t.dot(Vec3::Z).abs() < 1e-6 && (t.length() - 1.0).abs() < 1e-6);
        assert!((b.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_radical_inverse_and_hammersley() {
        assert_eq!(radical_inverse(0), 0.0);
        assert_eq!(radical_inverse(1), 0.5);
        assert_eq!(radical_inverse(2), 0.25);
        assert_eq!(radical_inverse(3), 0.75);
        assert_eq!(radical_inverse(6), 0.375);

        let p = hammersley(1, 4);
        assert!((p.x - 0.375).abs() < 1e-6);
        assert!((p.y - 0.5).abs() < 1e-6);
    }
}
