//! # Point Index
//!
//! kd-tree over local vertex positions for nearest-vertex and radius
//! queries, mapping tree items back to [`VertId`].
//!
//! Keys are stored under a fixed generic rotation: the kd-tree cannot split
//! a full bucket whose points share a coordinate, which flat axis-aligned
//! meshes produce. Distances are rotation invariant.
//!
//! Coincident vertices share one tree item, so any number of unwelded
//! duplicates fit in a bucket.

use crate::element::VertId;
use glam::DQuat;
use kiddo::{KdTree, SquaredEuclidean};
use mesh_math::Point;
use std::collections::HashMap;

fn key_rotation() -> DQuat {
    DQuat::from_xyzw(0.1, 0.2, 0.3, 0.927_361_849_549_570_4).normalize()
}

/// Nearest-neighbour index over vertex positions.
pub struct PointIndex {
    tree: KdTree<f64, 3>,
    /// Vertices per distinct position, indexed by tree item.
    groups: Vec<Vec<VertId>>,
    len: usize,
    rotation: DQuat,
}

impl std::fmt::Debug for PointIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointIndex")
            .field("len", &self.len)
            .field("positions", &self.groups.len())
            .finish()
    }
}

impl PointIndex {
    /// Builds the index from `(handle, local position)` pairs.
    pub fn build(points: impl IntoIterator<Item = (VertId, Point)>) -> Self {
        let rotation = key_rotation();
        let mut tree: KdTree<f64, 3> = KdTree::new();
        let mut groups: Vec<Vec<VertId>> = Vec::new();
        let mut slots: HashMap<[u64; 3], usize> = HashMap::new();
        let mut len = 0;
        for (id, p) in points {
            len += 1;
            let bits = p.to_array().map(f64::to_bits);
            if let Some(&slot) = slots.get(&bits) {
                groups[slot].push(id);
                continue;
            }
            let key = rotation * p.as_dvec3();
            tree.add(&key.to_array(), groups.len() as u64);
            slots.insert(bits, groups.len());
            groups.push(vec![id]);
        }
        Self {
            tree,
            groups,
            len,
            rotation,
        }
    }

    fn key(&self, p: Point) -> [f64; 3] {
        (self.rotation * p.as_dvec3()).to_array()
    }

    /// Number of indexed vertices.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no vertex is indexed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Closest vertex and its local distance. Among coincident vertices the
    /// first indexed wins.
    pub fn nearest(&self, p: Point) -> Option<(VertId, f64)> {
        if self.groups.is_empty() {
            return None;
        }
        let found = self.tree.nearest_one::<SquaredEuclidean>(&self.key(p));
        let id = *self.groups.get(found.item as usize)?.first()?;
        Some((id, found.distance.sqrt()))
    }

    /// Vertices within local distance `radius`, nearest first.
    pub fn within(&self, p: Point, radius: f64) -> Vec<(VertId, f64)> {
        if self.groups.is_empty() || !(radius >= 0.0) {
            return Vec::new();
        }
        self.tree
            .within::<SquaredEuclidean>(&self.key(p), radius * radius)
            .into_iter()
            .flat_map(|n| {
                let d = n.distance.sqrt();
                self.groups
                    .get(n.item as usize)
                    .into_iter()
                    .flatten()
                    .map(move |&id| (id, d))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec3;

    fn flat_grid(n: u32) -> Vec<(VertId, Point)> {
        (0..n * n)
            .map(|i| (VertId(i), Point::new(f64::from(i % n), f64::from(i / n), 0.0)))
            .collect()
    }

    #[test]
    fn test_empty_index() {
        let index = PointIndex::build(Vec::new());
        assert!(index.is_empty());
        assert!(index.nearest(Point::ORIGIN).is_none());
        assert!(index.within(Point::ORIGIN, 10.0).is_empty());
    }

    #[test]
    fn test_flat_grid_builds_and_finds_nearest() {
        // 400 coplanar points sharing z, more than one kd-tree bucket
        let index = PointIndex::build(flat_grid(20));
        assert_eq!(index.len(), 400);
        let (id, d) = index.nearest(Point::new(3.2, 5.1, 0.0)).unwrap();
        assert_eq!(id, VertId(5 * 20 + 3));
        assert_relative_eq!(d, (0.2f64 * 0.2 + 0.1 * 0.1).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_within_radius() {
        let index = PointIndex::build(flat_grid(5));
        let mut found: Vec<VertId> = index
            .within(Point::new(2.0, 2.0, 0.0), 1.01)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        found.sort();
        assert_eq!(found, vec![VertId(7), VertId(11), VertId(12), VertId(13), VertId(17)]);
    }

    #[test]
    fn test_coincident_vertices_share_a_key() {
        let mut points: Vec<(VertId, Point)> =
            (0..40).map(|i| (VertId(i), Point::new(0.5, 0.5, 0.5))).collect();
        points.push((VertId(40), Point::new(3.0, 0.0, 0.0)));
        let index = PointIndex::build(points);
        assert_eq!(index.len(), 41);

        let (id, d) = index.nearest(Point::ORIGIN).unwrap();
        assert_eq!(id, VertId(0));
        assert_relative_eq!(d, 0.75f64.sqrt(), epsilon = 1e-9);
        assert_eq!(index.within(Point::new(0.5, 0.5, 0.5), 0.1).len(), 40);
        assert_eq!(index.within(Point::ORIGIN, 10.0).len(), 41);
    }

    #[test]
    fn test_rotation_preserves_distance() {
        let r = key_rotation();
        let (a, b) = (DVec3::new(1.0, 2.0, 3.0), DVec3::new(-4.0, 0.5, 2.0));
        assert_relative_eq!((r * a).distance(r * b), a.distance(b), epsilon = 1e-12);
    }
}
