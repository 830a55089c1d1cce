use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create an AABB from two corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let x = Interval::new(a.x.min(b.x), a.x.max(b.x));
        let y = Interval::new(a.y.min(b.y), a.y.max(b.y));
        let z = Interval::new(a.z.min(b.z), a.z.max(b.z));

        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// True if `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &Aabb) -> bool {
        (0..3).all(|axis| {
            let outer = self.axis_interval(axis);
            let inner = other.axis_interval(axis);
            outer.min <= inner.min && inner.max <= outer.max
        })
    }

    /// Distance along the ray at which it enters this box.
    ///
    /// Slab method. Returns `Some(0.0)` when the origin is already inside,
    /// `None` when the ray misses the box or the box lies behind the origin.
    pub fn entry_distance(&self, ray: &Ray) -> Option<f32> {
        let origin = ray.origin();
        let direction = ray.direction();

        if (0..3).all(|axis| self.axis_interval(axis).contains(origin[axis])) {
            return Some(0.0);
        }

        let mut t_enter = 0.0_f32;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let o = origin[axis];
            let d = direction[axis];

            // Parallel to this slab: either always inside it or never
            if d.abs() < 1e-12 {
                if !slab.contains(o) {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (slab.min - o) * inv;
            let mut t1 = (slab.max - o) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_exit < t_enter {
                return None;
            }
        }

        Some(t_enter)
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        let delta = 0.0001;
        if self.x.size() < delta {
            self.x = self.x.expand(delta);
        }
        if self.y.size() < delta {
            self.y = self.y.expand(delta);
        }
        if self.z.size() < delta {
            self.z = self.z.expand(delta);
        }
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let x_size = self.x.size();
        let y_size = self.y.size();
        let z_size = self.z.size();

        if x_size >= y_size && x_size >= z_size {
            0
        } else if y_size >= z_size {
            1
        } else {
            2
        }
    }

    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_aabb_from_points_orders_corners() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 5.0), Vec3::new(0.0, 10.0, -5.0));

        assert_eq!(aabb.min(), Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(aabb.max(), Vec3::new(10.0, 10.0, 5.0));
    }

    #[test]
    fn test_aabb_surrounding_contains_both() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::splat(5.0));
        let box2 = Aabb::from_points(Vec3::splat(3.0), Vec3::splat(10.0));
        let surrounding = Aabb::surrounding(&box1, &box2);

        assert!(surrounding.contains_box(&box1));
        assert!(surrounding.contains_box(&box2));
        assert!(!box1.contains_box(&surrounding));
    }

    #[test]
    fn test_entry_distance_from_outside() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let t = unit_box().entry_distance(&ray).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_entry_distance_inside_is_zero() {
        let ray = Ray::new(Vec3::new(0.2, -0.3, 0.5), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(unit_box().entry_distance(&ray), Some(0.0));
    }

    #[test]
    fn test_entry_distance_misses() {
        // Pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z);
        assert!(unit_box().entry_distance(&ray).is_none());

        // Passing beside the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::Z);
        assert!(unit_box().entry_distance(&ray).is_none());

        // Axis-parallel ray outside one slab
        let ray = Ray::new(Vec3::new(0.0, 2.0, -5.0), Vec3::Z);
        assert!(unit_box().entry_distance(&ray).is_none());
    }

    #[test]
    fn test_entry_distance_diagonal() {
        let ray = Ray::new(Vec3::splat(-3.0), Vec3::ONE);
        let t = unit_box().entry_distance(&ray).unwrap();
        // Enters at the (-1,-1,-1) corner
        assert!((t - 2.0 * 3.0_f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_box_is_padded() {
        let flat = Aabb::from_points(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        assert!(flat.z.size() > 0.0);
    }

    #[test]
    fn test_aabb_longest_axis() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 10.0, 1.0));
        assert_eq!(aabb.longest_axis(), 1);
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(3.0, 1.0, 3.0));
        assert_eq!(aabb.longest_axis(), 0);
    }
}
