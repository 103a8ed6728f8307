//! # 2D Triangle and Segment Helpers
//!
//! Screen-space predicates used by the projected nearest-face and
//! nearest-edge queries.

use crate::vector2d::Point2D;
use config::constants::{clamp_denominator, PARALLEL_EPSILON};

/// Twice the signed area of `(a, b, c)`; positive for counter-clockwise.
#[inline]
pub fn triangle2d_det(a: Point2D, b: Point2D, c: Point2D) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Unsigned area.
#[inline]
pub fn triangle2d_area(a: Point2D, b: Point2D, c: Point2D) -> f64 {
    triangle2d_det(a, b, c).abs() * 0.5
}

/// True if `p` is inside or on the boundary of the triangle, either winding.
pub fn point_in_triangle2d(p: Point2D, a: Point2D, b: Point2D, c: Point2D) -> bool {
    let d0 = triangle2d_det(a, b, p);
    let d1 = triangle2d_det(b, c, p);
    let d2 = triangle2d_det(c, a, p);
    let has_neg = d0 < 0.0 || d1 < 0.0 || d2 < 0.0;
    let has_pos = d0 > 0.0 || d1 > 0.0 || d2 > 0.0;
    !(has_neg && has_pos)
}

/// True if the two triangles overlap (touching counts).
///
/// Separating-axis test over the edges of both triangles.
pub fn triangle2d_overlap(t0: [Point2D; 3], t1: [Point2D; 3]) -> bool {
    fn separated(a: [Point2D; 3], b: [Point2D; 3]) -> bool {
        let orient = triangle2d_det(a[0], a[1], a[2]).signum();
        (0..3).any(|i| {
            let (p, q) = (a[i], a[(i + 1) % 3]);
            b.iter().all(|&r| triangle2d_det(p, q, r) * orient < 0.0)
        })
    }
    !(separated(t0, t1) || separated(t1, t0))
}

/// Intersection point of segments `(a0, a1)` and `(b0, b1)`.
///
/// Returns `None` for near-parallel segments or when the crossing of the
/// supporting lines falls outside either segment.
///
/// # Example
///
/// ```rust
/// use mesh_math::{triangle2d::segment2d_intersection, Point2D};
///
/// let p = segment2d_intersection(
///     Point2D::new(0.0, 0.0), Point2D::new(2.0, 2.0),
///     Point2D::new(0.0, 2.0), Point2D::new(2.0, 0.0),
/// ).unwrap();
/// assert_eq!(p, Point2D::new(1.0, 1.0));
/// ```
pub fn segment2d_intersection(a0: Point2D, a1: Point2D, b0: Point2D, b1: Point2D) -> Option<Point2D> {
    let da = a1 - a0;
    let db = b1 - b0;
    let cross = da.perp_dot(db.0);
    let scale = (da.length() * db.length()).max(f64::MIN_POSITIVE);
    if (cross / scale).abs() < PARALLEL_EPSILON {
        return None;
    }
    let denom = clamp_denominator(cross);
    let w = b0 - a0;
    let t = w.perp_dot(db.0) / denom;
    let u = w.perp_dot(da.0) / denom;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }
    Some(a0 + da * t)
}
