//! A renderable scene: one scene-graph root plus its lights.

use crate::{
    hittable::{HitRecord, Hittable},
    light::{AreaLight, Light},
    object::Object,
};
use prism_math::{Ray, Vec3};

/// Nearest hit of a ray against geometry and area lights.
#[derive(Debug, Clone, Copy)]
pub struct Intersection<'a> {
    pub rec: HitRecord<'a>,
    /// Index (into the scene's lights) of the area light hit from the
    /// front, if that is what the ray saw.
    pub light: Option<usize>,
}

/// Which surfaces can block a shadow ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occluders {
    Geometry,
    /// Geometry and every area light except the one being sampled.
    GeometryAndLights { except: Option<usize> },
}

#[derive(Debug, Clone)]
pub struct Scene {
    root: Object,
    lights: Vec<Light>,
}

impl Scene {
    pub fn new(root: impl Into<Object>, lights: Vec<Light>) -> Self {
        let scene = Self {
            root: root.into(),
            lights,
        };
        log::debug!(
            "Scene: {} lights ({} area)",
            scene.lights.len(),
            scene.area_lights().count()
        );
        scene
    }

    pub fn root(&self) -> &Object {
        &self.root
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Area lights with their indices into `lights()`.
    pub fn area_lights(&self) -> impl Iterator<Item = (usize, &AreaLight)> + '_ {
        self.lights
            .iter()
            .enumerate()
            .filter_map(|(i, light)| light.as_area().map(|area| (i, area)))
    }

    /// Intersect the scene graph, then every area light into the same
    /// record.
    pub fn intersect(&self, ray: &Ray, t_min: f32) -> Intersection<'_> {
        let mut rec = HitRecord::new();
        self.root.hit(ray, t_min, &mut rec);

        let mut light = None;
        for (index, area) in self.area_lights() {
            if area.hit(ray, t_min, &mut rec) {
                light = rec.front_face.then_some(index);
            }
        }
        Intersection { rec, light }
    }

    /// True when something blocks the segment from `origin` along unit
    /// `direction` closer than `distance`.
    pub fn occluded(
        &self,
        origin: Vec3,
        direction: Vec3,
        distance: f32,
        t_min: f32,
        occluders: Occluders,
    ) -> bool {
        let ray = Ray::new(origin, direction);
        let mut rec = HitRecord::with_max(distance);
        if self.root.hit(&ray, t_min, &mut rec) && rec.t < distance {
            return true;
        }

        match occluders {
            Occluders::Geometry => false,
            Occluders::GeometryAndLights { except } => self
                .area_lights()
                .filter(|(index, _)| Some(*index) != except)
                .any(|(_, area)| {
                    let mut rec = HitRecord::with_max(distance);
                    area.hit(&ray, t_min, &mut rec) && rec.t < distance
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::{Facing, PointLight, RectLight};
    use crate::{object::Group, sphere::Sphere, Color, Material};
    use prism_math::Interval;
    use std::sync::Arc;

    fn panel(y: f32, facing: Facing) -> Light {
        RectLight::new(
            facing,
            y,
            Interval::new(-1.0, 1.0),
            Interval::new(-1.0, 1.0),
            Color::ONE,
        )
        .into()
    }

    fn scene() -> Scene {
        let ball = Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, Arc::new(Material::mirror(1.0)));
        Scene::new(
            Group::new(vec![ball.into()]),
            vec![
                PointLight::new(Vec3::new(0.0, 10.0, 0.0), Color::ONE).into(),
                panel(3.0, Facing::NegY),
                panel(5.0, Facing::NegY),
            ],
        )
    }

    #[test]
    fn test_area_light_indices() {
        let scene = scene();
        let indices: Vec<usize> = scene.area_lights().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_intersect_reports_front_light() {
        let scene = scene();

        let up = Ray::new(Vec3::ZERO, Vec3::Y);
        let found = scene.intersect(&up, 1e-4);
        assert_eq!(found.light, Some(1));
        assert_eq!(found.rec.t, 3.0);

        // Geometry in front of the light wins
        let forward = Ray::new(Vec3::ZERO, -Vec3::Z);
        let found = scene.intersect(&forward, 1e-4);
        assert_eq!(found.light, None);
        assert!(found.rec.material().is_some());

        // Seen from above, the lower panel is a dark back face
        let down = Ray::new(Vec3::new(0.0, 4.0, 0.0), -Vec3::Y);
        let found = scene.intersect(&down, 1e-4);
        assert_eq!(found.light, None);
        assert!(found.rec.is_hit());
        assert!(!found.rec.front_face);
    }

    #[test]
    fn test_occlusion_modes() {
        let scene = scene();
        let origin = Vec3::ZERO;

        // Toward the upper panel, through the lower one
        assert!(!scene.occluded(origin, Vec3::Y, 5.0, 1e-4, Occluders::Geometry));
        assert!(scene.occluded(
            origin,
            Vec3::Y,
            5.0,
            1e-4,
            Occluders::GeometryAndLights { except: Some(2) }
        ));
        assert!(!scene.occluded(
            origin,
            Vec3::Y,
            3.0,
            1e-4,
            Occluders::GeometryAndLights { except: Some(1) }
        ));

        // The sphere blocks the way forward
        assert!(scene.occluded(origin, -Vec3::Z, 10.0, 1e-4, Occluders::Geometry));
        assert!(!scene.occluded(origin, -Vec3::Z, 3.0, 1e-4, Occluders::Geometry));
    }
}
