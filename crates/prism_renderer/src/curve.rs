//! Cubic profile curves for surfaces of revolution.
//!
//! Evaluation runs in double precision; Newton refinement of revolution
//! hits differentiates these values directly.

use crate::error::SceneError;
use prism_math::{DVec3, Vec3};

/// Position and derivative of a curve at one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub position: DVec3,
    /// d(position)/dt over the whole-curve parameter `t ∈ [0, 1]`
    pub tangent: DVec3,
}

/// A piecewise cubic curve.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    /// Piecewise cubic Bézier with 3n+1 control points; segments share
    /// their end points.
    Bezier(Vec<Vec3>),
    /// Uniform cubic B-spline with more than 3 control points.
    BSpline(Vec<Vec3>),
}

impl Curve {
    pub fn bezier(controls: Vec<Vec3>) -> Result<Self, SceneError> {
        if controls.len() < 4 || controls.len() % 3 != 1 {
            return Err(SceneError::BezierControlCount(controls.len()));
        }
        Ok(Curve::Bezier(controls))
    }

    pub fn bspline(controls: Vec<Vec3>) -> Result<Self, SceneError> {
        if controls.len() <= 3 {
            return Err(SceneError::BSplineControlCount(controls.len()));
        }
        Ok(Curve::BSpline(controls))
    }

    pub fn controls(&self) -> &[Vec3] {
        match self {
            Curve::Bezier(c) | Curve::BSpline(c) => c,
        }
    }

    pub fn segments(&self) -> usize {
        match self {
            Curve::Bezier(c) => c.len() / 3,
            Curve::BSpline(c) => c.len() - 3,
        }
    }

    /// Evaluate at `t ∈ [0, 1]`; values outside extrapolate the end
    /// segments.
    pub fn point(&self, t: f64) -> CurvePoint {
        let segments = self.segments();
        let scaled = t * segments as f64;
        let piece = (scaled.floor().max(0.0) as usize).min(segments - 1);
        let s = scaled - piece as f64;

        let (start, basis, derivative) = match self {
            Curve::Bezier(_) => (3 * piece, bernstein(s), bernstein_derivative(s)),
            Curve::BSpline(_) => (piece, bspline_basis(s), bspline_derivative(s)),
        };

        let controls = &self.controls()[start..start + 4];
        let mut position = DVec3::ZERO;
        let mut tangent = DVec3::ZERO;
        for (k, control) in controls.iter().enumerate() {
            let c = control.as_dvec3();
            position += c * basis[k];
            tangent += c * derivative[k];
        }

        CurvePoint {
            position,
            tangent: tangent * segments as f64,
        }
    }
}

fn bernstein(s: f64) -> [f64; 4] {
    let r = 1.0 - s;
    [r * r * r, 3.0 * s * r * r, 3.0 * s * s * r, s * s * s]
}

fn bernstein_derivative(s: f64) -> [f64; 4] {
    let r = 1.0 - s;
    [
        -3.0 * r * r,
        3.0 * (r * r - 2.0 * s * r),
        3.0 * (2.0 * s - 3.0 * s * s),
        3.0 * s * s,
    ]
}

fn bspline_basis(s: f64) -> [f64; 4] {
    let r = 1.0 - s;
    let (s2, s3) = (s * s, s * s * s);
    [
        r * r * r / 6.0,
        (3.0 * s3 - 6.0 * s2 + 4.0) / 6.0,
        (-3.0 * s3 + 3.0 * s2 + 3.0 * s + 1.0) / 6.0,
        s3 / 6.0,
    ]
}

fn bspline_derivative(s: f64) -> [f64; 4] {
    let r = 1.0 - s;
    [
        -r * r / 2.0,
        (3.0 * s * s - 4.0 * s) / 2.0,
        (-3.0 * s * s + 2.0 * s + 1.0) / 2.0,
        s * s / 2.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> Curve {
        Curve::bezier(vec![
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(1.0, 3.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_control_count_validation() {
        assert_eq!(
            Curve::bezier(vec![Vec3::ZERO; 5]),
            Err(SceneError::BezierControlCount(5))
        );
        assert_eq!(
            Curve::bezier(vec![Vec3::ZERO; 1]),
            Err(SceneError::BezierControlCount(1))
        );
        assert!(Curve::bezier(vec![Vec3::ZERO; 7]).is_ok());
        assert_eq!(
            Curve::bspline(vec![Vec3::ZERO; 3]),
            Err(SceneError::BSplineControlCount(3))
        );
        assert!(Curve::bspline(vec![Vec3::ZERO; 4]).is_ok());
    }

    #[test]
    fn test_bezier_interpolates_end_points() {
        let curve = Curve::bezier(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(2.0, 2.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(4.0, -2.0, 0.0),
            Vec3::new(5.0, -2.0, 0.0),
            Vec3::new(6.0, 0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(curve.segments(), 2);

        assert!((curve.point(0.0).position - DVec3::ZERO).length() < 1e-12);
        assert!((curve.point(0.5).position - DVec3::new(3.0, 0.0, 0.0)).length() < 1e-12);
        assert!((curve.point(1.0).position - DVec3::new(6.0, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_straight_bezier_tangent() {
        let curve = line();
        for t in [0.0, 0.25, 0.6, 1.0] {
            let p = curve.point(t);
            assert!((p.position.y - 3.0 * t).abs() < 1e-12);
            assert!((p.tangent - DVec3::new(0.0, 3.0, 0.0)).length() < 1e-12);
        }
    }

    #[test]
    fn test_tangent_matches_finite_difference() {
        let curves = [
            Curve::bezier(vec![
                Vec3::new(0.5, 0.0, 0.0),
                Vec3::new(1.5, 0.5, 0.0),
                Vec3::new(0.2, 1.0, 0.0),
                Vec3::new(0.8, 2.0, 0.0),
            ])
            .unwrap(),
            Curve::bspline(vec![
                Vec3::new(0.5, 0.0, 0.0),
                Vec3::new(1.5, 0.5, 0.0),
                Vec3::new(0.2, 1.0, 0.0),
                Vec3::new(0.8, 2.0, 0.0),
                Vec3::new(1.1, 2.5, 0.0),
                Vec3::new(0.4, 3.5, 0.0),
            ])
            .unwrap(),
        ];

        let h = 1e-6;
        for curve in &curves {
            for t in [0.1, 0.4, 0.55, 0.9] {
                let numeric = (curve.point(t + h).position - curve.point(t - h).position) / (2.0 * h);
                assert!((numeric - curve.point(t).tangent).length() < 1e-5);
            }
        }
    }

    #[test]
    fn test_bspline_basis_partition_of_unity() {
        for s in [0.0, 0.3, 0.7, 1.0] {
            let sum: f64 = bspline_basis(s).iter().sum();
            assert!((sum - 1.0).abs() < 1e-12);
            let dsum: f64 = bspline_derivative(s).iter().sum();
            assert!(dsum.abs() < 1e-12);
        }
    }
}
