//! Prism renderer - offline ray tracing and path tracing.
//!
//! Geometry (spheres, planes, triangle meshes, surfaces of revolution)
//! lives in a scene graph of groups and transforms. Materials cover Phong,
//! perfect mirrors, refraction, Fresnel glass and three microfacet-style
//! BRDFs. Two integrators render it: a deterministic Whitted ray tracer
//! and a Monte Carlo path tracer with next-event estimation and multiple
//! importance sampling.
//!
//! # Example
//!
//! ```ignore
//! use prism_renderer::{render, Material, PerspectiveCamera, PointLight, Scene, Sphere};
//!
//! let ball = Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, Arc::new(Material::mirror(0.9)));
//! let scene = Scene::new(ball, vec![PointLight::new(Vec3::Y * 4.0, Color::ONE).into()]);
//! let camera = PerspectiveCamera::new(Vec3::ZERO, -Vec3::Z, Vec3::Y, 45.0, 640, 480);
//! let image = render(&scene, &camera, &RenderSettings::default())?;
//! ```

mod brdf;
mod bucket;
mod bvh;
mod camera;
mod curve;
mod error;
mod hittable;
mod integrator;
mod light;
mod material;
mod mesh;
mod monte_carlo;
mod object;
mod plane;
mod renderer;
mod revolution;
pub mod sampling;
mod scene;
mod sphere;
mod triangle;
mod whitted;

pub use brdf::{BrdfModel, CookTorrance, PhongBrdf, Ward};
pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult};
pub use bvh::{nearest_linear, Bvh, BvhNode, IndexedHit, NodeKind};
pub use camera::{Camera, PerspectiveCamera};
pub use curve::{Curve, CurvePoint};
pub use error::{RenderError, SceneError};
pub use hittable::{HitRecord, Hittable, Surface};
pub use integrator::Integrator;
pub use light::{
    AreaLight, DirectionalLight, DiscLight, Facing, Illumination, Light, PointLight, RectLight,
};
pub use material::{BrdfMaterial, Color, Fresnel, Material, Mirror, Phong, Refractive};
pub use mesh::Mesh;
pub use monte_carlo::MonteCarlo;
pub use object::{Group, Object, Transform};
pub use plane::Plane;
pub use renderer::{
    color_to_rgba, integrator_for, render, render_pixel, render_with_progress, ImageBuffer,
};
pub use revolution::{Refinement, Revolution};
pub use scene::{Intersection, Occluders, Scene};
pub use sphere::Sphere;
pub use triangle::{Triangle, TriangleHit};
pub use whitted::Whitted;

/// Re-export the math and settings types scenes are built from
pub use prism_core::{IntegratorKind, RenderSettings, SamplingStrategy, Texture};
pub use prism_math::{Aabb, Interval, Mat4, Ray, Vec2, Vec3};
