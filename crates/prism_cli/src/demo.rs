//! The built-in demo scene: an open-fronted box holding one of every
//! primitive, material and light the renderer supports.

use std::sync::Arc;

use anyhow::Result;
use prism_core::Texture;
use prism_math::{Interval, Mat4, Vec2, Vec3};
use prism_renderer::{
    BrdfMaterial, BrdfModel, Color, CookTorrance, Curve, DirectionalLight, DiscLight, Facing,
    Group, Light, Material, Mesh, Object, PerspectiveCamera, PhongBrdf, Plane, PointLight, RectLight,
    Refinement, Revolution, Scene, Sphere, Transform, Ward,
};

pub const WIDTH: u32 = 480;
pub const HEIGHT: u32 = 360;

/// Children of the root group, checked at construction.
const OBJECT_COUNT: usize = 11;

fn lambert(color: Color) -> Arc<Material> {
    Arc::new(Material::brdf(BrdfModel::Phong(PhongBrdf::new(1.0, 0.0, 1.0)), color))
}

/// Back wall as a textured two-triangle mesh.
fn back_wall() -> Result<Mesh> {
    let checker = Arc::new(Texture::checker(8, Vec3::splat(0.75), Vec3::splat(0.2)));
    let material = Material::Brdf(
        BrdfMaterial::new(BrdfModel::Phong(PhongBrdf::new(0.9, 0.1, 20.0)), Color::ONE)
            .with_texture(checker),
    );

    let positions = vec![
        Vec3::new(-2.0, 0.0, -6.0),
        Vec3::new(2.0, 0.0, -6.0),
        Vec3::new(2.0, 4.0, -6.0),
        Vec3::new(-2.0, 4.0, -6.0),
    ];
    let uvs = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    let faces = vec![[0, 1, 2], [0, 2, 3]];

    Ok(Mesh::new(positions, faces.clone(), Arc::new(material))?
        .with_uvs(uvs, faces)?
        .with_bvh())
}

/// Brushed-metal vase: a Bézier profile revolved about its own axis.
fn vase() -> Result<Transform> {
    let profile = Curve::bezier(vec![
        Vec3::new(0.35, 0.0, 0.0),
        Vec3::new(0.65, 0.2, 0.0),
        Vec3::new(0.6, 0.6, 0.0),
        Vec3::new(0.3, 0.8, 0.0),
        Vec3::new(0.15, 0.95, 0.0),
        Vec3::new(0.25, 1.15, 0.0),
        Vec3::new(0.3, 1.3, 0.0),
    ])?;
    let metal = Arc::new(Material::brdf(
        BrdfModel::CookTorrance(CookTorrance::new(0.2, 0.8, 0.25, Color::new(0.95, 0.64, 0.54))),
        Color::new(0.9, 0.6, 0.4),
    ));
    let surface = Revolution::new(profile, metal, 24, 48, Refinement::Newton)?;

    let placement = Mat4::from_translation(Vec3::new(-1.1, 0.0, -4.6)) * Mat4::from_scale(Vec3::splat(1.2));
    Ok(Transform::new(placement, surface)?)
}

/// Root group and lights of the demo.
pub fn scene() -> Result<Scene> {
    let mut root: Vec<Object> = vec![
        // Floor, ceiling and side walls
        Plane::new(Vec3::Y, 0.0, lambert(Color::splat(0.75))).into(),
        Plane::new(-Vec3::Y, -4.0, lambert(Color::splat(0.75))).into(),
        Plane::new(Vec3::X, -2.0, lambert(Color::new(0.65, 0.1, 0.1))).into(),
        Plane::new(-Vec3::X, -2.0, lambert(Color::new(0.15, 0.5, 0.15))).into(),
        back_wall()?.into(),
        vase()?.into(),
    ];

    root.push(Sphere::new(Vec3::new(0.9, 0.7, -4.9), 0.7, Arc::new(Material::mirror(0.9))).into());
    root.push(Sphere::new(Vec3::new(0.2, 0.5, -3.4), 0.5, Arc::new(Material::fresnel(1.5, 1.0))).into());
    root.push(
        Sphere::new(Vec3::new(1.3, 0.3, -3.2), 0.3, Arc::new(Material::refractive(1.33, 0.95))).into(),
    );
    root.push(
        Sphere::new(
            Vec3::new(-0.6, 0.35, -3.0),
            0.35,
            Arc::new(Material::brdf(
                BrdfModel::Ward(Ward::new(0.3, 0.5, 0.1, 0.4)),
                Color::new(0.4, 0.5, 0.9),
            )),
        )
        .into(),
    );
    root.push(
        Sphere::new(
            Vec3::new(-1.4, 2.6, -5.4),
            0.3,
            Arc::new(Material::phong(
                Color::splat(0.05),
                Color::new(0.8, 0.7, 0.2),
                Color::splat(0.5),
                32.0,
            )),
        )
        .into(),
    );
    let root = Group::with_expected(OBJECT_COUNT, root)?;

    let lights: Vec<Light> = vec![
        RectLight::new(
            Facing::NegY,
            3.99,
            Interval::new(-4.6, -3.6),
            Interval::new(-0.5, 0.5),
            Color::splat(10.0),
        )
        .into(),
        DiscLight::new(Facing::NegX, 1.99, Vec2::new(2.8, -5.2), 0.3, Color::new(6.0, 5.0, 3.0)).into(),
        PointLight::new(Vec3::new(0.0, 3.5, -2.5), Color::splat(1.5)).into(),
        DirectionalLight::new(Vec3::new(-0.3, -1.0, -0.4), Color::splat(0.1)).into(),
    ];

    Ok(Scene::new(root, lights))
}

pub fn camera() -> PerspectiveCamera {
    PerspectiveCamera::looking_at(
        Vec3::new(0.0, 2.0, 3.0),
        Vec3::new(0.0, 1.4, -4.0),
        Vec3::Y,
        45.0,
        WIDTH,
        HEIGHT,
    )
}
