//! # Bounding Volume Hierarchy
//!
//! Binary tree over the document's triangles (polygons fan-triangulated),
//! split at the median centroid along the longest axis until a node holds
//! at most `max_leaf_size` triangles.
//!
//! All coordinates are local to the document.
//!
//! ## Queries
//!
//! - [`Bvh::ray_cast`]: nearest two-sided Möller–Trumbore hit
//! - [`Bvh::find_nearest`]: closest surface point within a distance

use crate::element::FaceId;
use config::constants::RAY_EPSILON;
use glam::DVec3;
use mesh_math::{BBox, Normal, Point, Ray};

/// A triangle tagged with the face it was cut from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhTriangle {
    /// Owning face.
    pub face: FaceId,
    /// Corner positions.
    pub corners: [DVec3; 3],
    /// Normal reported for hits on this triangle.
    pub normal: DVec3,
}

impl BvhTriangle {
    fn bbox(&self) -> BBox {
        let [a, b, c] = self.corners.map(Point);
        BBox::new(a, b).including(c)
    }

    fn centroid(&self) -> DVec3 {
        (self.corners[0] + self.corners[1] + self.corners[2]) / 3.0
    }

    /// Ray parameter of a hit, two-sided.
    fn intersect(&self, o: DVec3, d: DVec3) -> Option<f64> {
        let [v0, v1, v2] = self.corners;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = d.cross(edge2);
        let a = edge1.dot(h);
        if a.abs() < RAY_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = o - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * d.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        (t > RAY_EPSILON).then_some(t)
    }

    /// Closest point on the triangle to `p`.
    fn closest_point(&self, p: DVec3) -> DVec3 {
        let [a, b, c] = self.corners;
        let ab = b - a;
        let ac = c - a;
        let ap = p - a;
        let d1 = ab.dot(ap);
        let d2 = ac.dot(ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = p - b;
        let d3 = ab.dot(bp);
        let d4 = ac.dot(bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            return a + ab * (d1 / (d1 - d3));
        }

        let cp = p - c;
        let d5 = ab.dot(cp);
        let d6 = ac.dot(cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            return a + ac * (d2 / (d2 - d6));
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            return b + (c - b) * ((d4 - d3) / ((d4 - d3) + (d5 - d6)));
        }

        let denom = va + vb + vc;
        if denom.abs() < RAY_EPSILON {
            // degenerate sliver: fall back to the nearest corner
            return [a, b, c]
                .into_iter()
                .min_by(|x, y| x.distance_squared(p).total_cmp(&y.distance_squared(p)))
                .unwrap_or(a);
        }
        let v = vb / denom;
        let w = vc / denom;
        a + ab * v + ac * w
    }
}

/// Nearest ray hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhHit {
    /// Hit position.
    pub point: Point,
    /// Normal of the hit triangle.
    pub normal: Normal,
    /// Face that was hit.
    pub face: FaceId,
    /// Ray parameter of the hit.
    pub distance: f64,
}

/// Closest surface point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhNearest {
    /// Closest position.
    pub point: Point,
    /// Normal of the nearest triangle.
    pub normal: Normal,
    /// Face owning the nearest triangle.
    pub face: FaceId,
    /// Distance from the query point.
    pub distance: f64,
}

#[derive(Debug)]
enum BvhNode {
    Leaf {
        bbox: BBox,
        triangles: Vec<usize>,
    },
    Internal {
        bbox: BBox,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    fn bbox(&self) -> &BBox {
        match self {
            BvhNode::Leaf { bbox, .. } | BvhNode::Internal { bbox, .. } => bbox,
        }
    }
}

/// Bounding volume hierarchy over triangles.
#[derive(Debug)]
pub struct Bvh {
    triangles: Vec<BvhTriangle>,
    root: Option<BvhNode>,
}

impl Bvh {
    /// Builds the hierarchy. An empty triangle list yields an empty tree
    /// that never reports hits.
    pub fn build(triangles: Vec<BvhTriangle>, max_leaf_size: usize) -> Self {
        if triangles.is_empty() {
            return Self {
                triangles,
                root: None,
            };
        }

        let boxes: Vec<BBox> = triangles.iter().map(BvhTriangle::bbox).collect();
        let centroids: Vec<DVec3> = triangles.iter().map(BvhTriangle::centroid).collect();
        let indices: Vec<usize> = (0..triangles.len()).collect();
        let root = Self::build_recursive(&boxes, &centroids, indices, max_leaf_size.max(1));

        Self {
            triangles,
            root: Some(root),
        }
    }

    fn build_recursive(
        boxes: &[BBox],
        centroids: &[DVec3],
        mut indices: Vec<usize>,
        max_leaf_size: usize,
    ) -> BvhNode {
        let bbox = indices
            .iter()
            .map(|&i| boxes[i])
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or_else(|| boxes[0]);

        if indices.len() <= max_leaf_size {
            return BvhNode::Leaf {
                bbox,
                triangles: indices,
            };
        }

        let axis = bbox.longest_axis();
        indices.sort_by(|&a, &b| centroids[a][axis].total_cmp(&centroids[b][axis]));

        let right_indices = indices.split_off(indices.len() / 2);
        let left = Self::build_recursive(boxes, centroids, indices, max_leaf_size);
        let right = Self::build_recursive(boxes, centroids, right_indices, max_leaf_size);

        BvhNode::Internal {
            bbox,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Number of triangles indexed.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// True if there is nothing to hit.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Nearest hit along the ray within `[0, ray.max]`.
    pub fn ray_cast(&self, ray: &Ray) -> Option<BvhHit> {
        let root = self.root.as_ref()?;
        let (o, d) = (ray.o.as_dvec3(), ray.d.as_dvec3());
        let mut best: Option<(f64, usize)> = None;
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            let limit = best.map_or(ray.max, |(t, _)| t);
            let bounded = Ray { max: limit, ..*ray };
            if node.bbox().ray_entry(&bounded).is_none() {
                continue;
            }
            match node {
                BvhNode::Leaf { triangles, .. } => {
                    for &i in triangles {
                        if let Some(t) = self.triangles[i].intersect(o, d) {
                            if t <= limit && best.map_or(true, |(bt, _)| t < bt) {
                                best = Some((t, i));
                            }
                        }
                    }
                }
                BvhNode::Internal { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }

        best.map(|(t, i)| {
            let tri = &self.triangles[i];
            BvhHit {
                point: Point(o + d * t),
                normal: Normal::from_dvec3(tri.normal),
                face: tri.face,
                distance: t,
            }
        })
    }

    /// Closest surface point within `max_dist` of `p`.
    pub fn find_nearest(&self, p: Point, max_dist: f64) -> Option<BvhNearest> {
        let root = self.root.as_ref()?;
        let q = p.as_dvec3();
        let max_sq = if max_dist.is_finite() {
            max_dist * max_dist
        } else {
            f64::INFINITY
        };
        let mut best: Option<(f64, usize, DVec3)> = None;
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            let limit = best.map_or(max_sq, |(d, _, _)| d);
            if node.bbox().distance_squared_to(p) > limit {
                continue;
            }
            match node {
                BvhNode::Leaf { triangles, .. } => {
                    for &i in triangles {
                        let c = self.triangles[i].closest_point(q);
                        let d = c.distance_squared(q);
                        if d <= max_sq && best.map_or(true, |(bd, _, _)| d < bd) {
                            best = Some((d, i, c));
                        }
                    }
                }
                BvhNode::Internal { left, right, .. } => {
                    // visit the nearer child first
                    let (dl, dr) = (left.bbox().distance_squared_to(p), right.bbox().distance_squared_to(p));
                    if dl <= dr {
                        stack.push(right);
                        stack.push(left);
                    } else {
                        stack.push(left);
                        stack.push(right);
                    }
                }
            }
        }

        best.map(|(d, i, c)| {
            let tri = &self.triangles[i];
            BvhNearest {
                point: Point(c),
                normal: Normal::from_dvec3(tri.normal),
                face: tri.face,
                distance: d.sqrt(),
            }
        })
    }
}
