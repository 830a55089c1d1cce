//! Bounding Volume Hierarchy (BVH) over mesh triangles.
//!
//! Nodes live in one flat vector and refer to each other by index; leaves
//! hold a contiguous range of a reordered triangle-index array. The tree
//! never owns triangles, so the same `Bvh` answers queries for whatever
//! slice it was built from.

use crate::triangle::{Triangle, TriangleHit};
use prism_math::{Aabb, Ray};

/// Maximum triangles per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 3;

/// What a node holds besides its bounds.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Internal node; `children[0]` holds the lower half along `axis`.
    Branch { axis: usize, children: [usize; 2] },
    /// Triangle range `indices[start..end]`.
    Leaf { start: usize, end: usize },
}

#[derive(Debug, Clone)]
pub struct BvhNode {
    pub bounds: Aabb,
    pub kind: NodeKind,
}

/// Nearest triangle found so far, with its index in the triangle slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedHit {
    pub index: usize,
    pub hit: TriangleHit,
}

/// Offer a candidate to the running best.
///
/// Candidates farther than `limit` (or the best so far) lose; equal
/// distances go to the lower triangle index, so any visiting order yields
/// the same winner.
#[inline]
fn offer(best: &mut Option<IndexedHit>, limit: f32, index: usize, hit: TriangleHit) {
    let better = match best {
        None => hit.t <= limit,
        Some(b) => hit.t < b.hit.t || (hit.t == b.hit.t && index < b.index),
    };
    if better {
        *best = Some(IndexedHit { index, hit });
    }
}

/// Exhaustive nearest-hit scan over all triangles.
pub fn nearest_linear(
    triangles: &[Triangle],
    ray: &Ray,
    t_min: f32,
    limit: f32,
) -> Option<IndexedHit> {
    let mut best = None;
    for (index, triangle) in triangles.iter().enumerate() {
        if let Some(hit) = triangle.intersect(ray, t_min) {
            offer(&mut best, limit, index, hit);
        }
    }
    best
}

/// A median-split BVH.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    indices: Vec<usize>,
}

impl Bvh {
    /// Build a BVH over `triangles`.
    pub fn build(triangles: &[Triangle]) -> Self {
        let mut bvh = Self {
            nodes: Vec::new(),
            indices: (0..triangles.len()).collect(),
        };
        if !triangles.is_empty() {
            bvh.build_range(triangles, 0, triangles.len());
        }

        log::debug!(
            "BVH built: {} triangles, {} nodes, depth {}",
            triangles.len(),
            bvh.nodes.len(),
            bvh.depth()
        );
        bvh
    }

    /// Recursive construction over `indices[start..end]`. Returns the new
    /// node's index.
    fn build_range(&mut self, triangles: &[Triangle], start: usize, end: usize) -> usize {
        let bounds = self.indices[start..end]
            .iter()
            .map(|&i| triangles[i].bounds())
            .fold(Aabb::EMPTY, |acc, b| Aabb::surrounding(&acc, &b));

        let node = self.nodes.len();
        self.nodes.push(BvhNode {
            bounds,
            kind: NodeKind::Leaf { start, end },
        });

        if end - start <= LEAF_MAX_SIZE {
            return node;
        }

        // Partial selection puts the median in place with the lower half
        // before it
        let axis = bounds.longest_axis();
        let mid = (start + end) / 2;
        self.indices[start..end].select_nth_unstable_by(mid - start, |&a, &b| {
            triangles[a]
                .min_coord(axis)
                .total_cmp(&triangles[b].min_coord(axis))
        });

        let left = self.build_range(triangles, start, mid);
        let right = self.build_range(triangles, mid, end);
        self.nodes[node].kind = NodeKind::Branch {
            axis,
            children: [left, right],
        };
        node
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[BvhNode], node: usize) -> usize {
            match nodes[node].kind {
                NodeKind::Leaf { .. } => 1,
                NodeKind::Branch { children, .. } => {
                    1 + walk(nodes, children[0]).max(walk(nodes, children[1]))
                }
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Triangle indices stored under `node`'s leaves.
    pub fn leaf_indices(&self, node: usize) -> Vec<usize> {
        match self.nodes[node].kind {
            NodeKind::Leaf { start, end } => self.indices[start..end].to_vec(),
            NodeKind::Branch { children, .. } => {
                let mut all = self.leaf_indices(children[0]);
                all.extend(self.leaf_indices(children[1]));
                all
            }
        }
    }

    /// Nearest triangle with `t_min <= t <= limit`.
    ///
    /// `triangles` must be the slice the tree was built from.
    pub fn nearest(
        &self,
        triangles: &[Triangle],
        ray: &Ray,
        t_min: f32,
        limit: f32,
    ) -> Option<IndexedHit> {
        let mut best = None;
        if !self.nodes.is_empty() {
            self.visit(0, triangles, ray, t_min, limit, &mut best);
        }
        best
    }

    fn visit(
        &self,
        node: usize,
        triangles: &[Triangle],
        ray: &Ray,
        t_min: f32,
        limit: f32,
        best: &mut Option<IndexedHit>,
    ) {
        let bound = best.map_or(limit, |b| b.hit.t);
        match self.nodes[node].bounds.entry_distance(ray) {
            Some(entry) if entry <= bound => {}
            _ => return,
        }

        match self.nodes[node].kind {
            NodeKind::Leaf { start, end } => {
                for &index in &self.indices[start..end] {
                    if let Some(hit) = triangles[index].intersect(ray, t_min) {
                        offer(best, limit, index, hit);
                    }
                }
            }
            NodeKind::Branch { axis, children } => {
                let first = usize::from(ray.direction()[axis] < 0.0);
                self.visit(children[first], triangles, ray, t_min, limit, best);
                self.visit(children[first ^ 1], triangles, ray, t_min, limit, best);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Material;
    use prism_math::Vec3;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    fn random_soup(seed: u64, count: usize) -> Vec<Triangle> {
        let material = Arc::new(Material::mirror(1.0));
        let mut rng = StdRng::seed_from_u64(seed);
        let point = |rng: &mut StdRng| {
            Vec3::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            )
        };
        (0..count)
            .map(|_| {
                let a = point(&mut rng);
                let b = a + point(&mut rng) * 0.2;
                let c = a + point(&mut rng) * 0.2;
                Triangle::new(a, b, c, material.clone())
            })
            .collect()
    }

    /// A stack of coincident unit squares, two triangles each.
    fn coincident_quads(copies: usize) -> Vec<Triangle> {
        let material = Arc::new(Material::mirror(1.0));
        let (a, b, c, d) = (
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        );
        (0..copies)
            .flat_map(|_| {
                [
                    Triangle::new(a, b, c, material.clone()),
                    Triangle::new(a, c, d, material.clone()),
                ]
            })
            .collect()
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = Bvh::build(&[]);
        assert!(bvh.is_empty());
        assert_eq!(bvh.depth(), 0);
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(bvh.nearest(&[], &ray, 0.0, f32::INFINITY).is_none());
    }

    #[test]
    fn test_small_mesh_is_single_leaf() {
        let triangles = random_soup(1, 3);
        let bvh = Bvh::build(&triangles);
        assert_eq!(bvh.nodes().len(), 1);
        assert!(matches!(bvh.nodes()[0].kind, NodeKind::Leaf { start: 0, end: 3 }));
    }

    #[test]
    fn test_bounds_nest() {
        let triangles = random_soup(2, 200);
        let bvh = Bvh::build(&triangles);

        for (i, node) in bvh.nodes().iter().enumerate() {
            for index in bvh.leaf_indices(i) {
                assert!(node.bounds.contains_box(&triangles[index].bounds()));
            }
            if let NodeKind::Branch { children, .. } = node.kind {
                for child in children {
                    assert!(node.bounds.contains_box(&bvh.nodes()[child].bounds));
                }
            }
            if let NodeKind::Leaf { start, end } = node.kind {
                assert!(end - start <= LEAF_MAX_SIZE);
            }
        }

        let mut all = bvh.leaf_indices(0);
        all.sort_unstable();
        assert_eq!(all, (0..200).collect::<Vec<_>>());
    }

    #[test]
    fn test_bvh_matches_linear_scan() {
        let triangles = random_soup(3, 300);
        let bvh = Bvh::build(&triangles);
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..2000 {
            let origin = Vec3::new(
                rng.gen_range(-8.0..8.0),
                rng.gen_range(-8.0..8.0),
                rng.gen_range(-8.0..8.0),
            );
            let target = Vec3::new(
                rng.gen_range(-4.0..4.0),
                rng.gen_range(-4.0..4.0),
                rng.gen_range(-4.0..4.0),
            );
            let ray = Ray::new(origin, target - origin);
            assert_eq!(
                bvh.nearest(&triangles, &ray, 1e-4, f32::INFINITY),
                nearest_linear(&triangles, &ray, 1e-4, f32::INFINITY)
            );
        }
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        let triangles = coincident_quads(8);
        let bvh = Bvh::build(&triangles);

        // Lower-left half belongs to triangles 0, 2, 4, ...
        let ray = Ray::new(Vec3::new(0.5, -0.5, -3.0), Vec3::Z);
        let linear = nearest_linear(&triangles, &ray, 1e-4, f32::INFINITY).unwrap();
        assert_eq!(linear.index, 0);
        assert_eq!(bvh.nearest(&triangles, &ray, 1e-4, f32::INFINITY), Some(linear));

        let ray = Ray::new(Vec3::new(-0.5, 0.5, 3.0), -Vec3::Z);
        let linear = nearest_linear(&triangles, &ray, 1e-4, f32::INFINITY).unwrap();
        assert_eq!(linear.index, 1);
        assert_eq!(bvh.nearest(&triangles, &ray, 1e-4, f32::INFINITY), Some(linear));
    }

    #[test]
    fn test_limit_rejects_farther_hits() {
        let triangles = coincident_quads(1);
        let bvh = Bvh::build(&triangles);
        let ray = Ray::new(Vec3::new(0.5, -0.5, -3.0), Vec3::Z);

        assert!(bvh.nearest(&triangles, &ray, 1e-4, 2.0).is_none());
        assert!(bvh.nearest(&triangles, &ray, 1e-4, 3.0).is_some());
        assert!(nearest_linear(&triangles, &ray, 1e-4, 2.0).is_none());
    }

    proptest! {
        #[test]
        fn prop_bvh_equals_linear_scan(
            seed in 0u64..1000,
            count in 1usize..120,
            ox in -8.0f32..8.0, oy in -8.0f32..8.0, oz in -8.0f32..8.0,
            dx in -1.0f32..1.0, dy in -1.0f32..1.0, dz in -1.0f32..1.0,
        ) {
            let dir = Vec3::new(dx, dy, dz);
            prop_assume!(dir.length() > 1e-3);

            let triangles = random_soup(seed, count);
            let bvh = Bvh::build(&triangles);
            let ray = Ray::new(Vec3::new(ox, oy, oz), dir);

            prop_assert_eq!(
                bvh.nearest(&triangles, &ray, 1e-4, f32::INFINITY),
                nearest_linear(&triangles, &ray, 1e-4, f32::INFINITY)
            );
        }
    }
}
