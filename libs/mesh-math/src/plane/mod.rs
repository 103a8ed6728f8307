//! # Plane
//!
//! Plane given by an origin and a unit normal, with on-plane classification
//! and the edge/triangle crossing routines used by contour extraction.
//!
//! ## Classification
//!
//! Every point falls on one [`Side`] of the plane. Points whose signed
//! distance is within [`PLANE_EPSILON`] are [`Side::On`].
//!
//! ## Crossings
//!
//! - [`Plane::edge_intersection`] returns the crossing pair of a segment
//! - [`Plane::triangle_intersection`] is an exhaustive table over the 27
//!   side combinations of a triangle's vertices
//!
//! A crossing that degenerates to a single coincident vertex is reported as
//! the pair `(p, p)`.

use crate::vector::{Normal, Point};
use config::constants::{clamp_denominator, PLANE_EPSILON};
use serde::{Deserialize, Serialize};

// =============================================================================
// SIDE
// =============================================================================

/// Classification of a point relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Negative signed distance beyond tolerance.
    Below,
    /// Within [`PLANE_EPSILON`] of the plane.
    On,
    /// Positive signed distance beyond tolerance.
    Above,
}

impl Side {
    /// Numeric form: -1, 0 or +1.
    #[inline]
    pub fn as_i8(self) -> i8 {
        match self {
            Side::Below => -1,
            Side::On => 0,
            Side::Above => 1,
        }
    }
}

// =============================================================================
// PLANE
// =============================================================================

/// A plane in 3D space defined by a point on it and a unit normal.
///
/// # Example
///
/// ```rust
/// use mesh_math::{Normal, Plane, Point};
///
/// let plane = Plane::new(Point::new(0.0, 0.0, 1.0), Normal::new(0.0, 0.0, 2.0));
/// assert_eq!(plane.signed_distance_to(Point::new(5.0, 5.0, 3.0)), 2.0);
/// assert_eq!(plane.side(Point::new(0.0, 0.0, 0.0)), -1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// A point on the plane.
    pub o: Point,
    /// Unit normal.
    pub n: Normal,
}

impl Plane {
    /// Creates a plane from a point and normal.
    pub fn new(o: Point, n: Normal) -> Self {
        Self { o, n }
    }

    /// Creates a plane through three points.
    ///
    /// The origin is the centroid and the normal follows
    /// `(p1 - p0) × (p2 - p0)`.
    pub fn from_points(p0: Point, p1: Point, p2: Point) -> Self {
        let o = Point::average([p0, p1, p2]);
        let n = Normal::from((p1 - p0).cross(p2 - p0));
        Self { o, n }
    }

    /// Signed distance from the plane, positive on the normal side.
    #[inline]
    pub fn signed_distance_to(&self, p: Point) -> f64 {
        (p - self.o).dot(self.n.as_dvec3())
    }

    /// Unsigned distance from the plane.
    #[inline]
    pub fn distance_to(&self, p: Point) -> f64 {
        self.signed_distance_to(p).abs()
    }

    /// Classifies a point against the plane.
    #[inline]
    pub fn classify(&self, p: Point) -> Side {
        let d = self.signed_distance_to(p);
        if d.abs() < PLANE_EPSILON {
            Side::On
        } else if d < 0.0 {
            Side::Below
        } else {
            Side::Above
        }
    }

    /// Numeric side of a point: 0 within tolerance, else the sign of
    /// [`Plane::signed_distance_to`].
    #[inline]
    pub fn side(&self, p: Point) -> i8 {
        self.classify(p).as_i8()
    }

    /// Orthogonal projection of a point onto the plane.
    pub fn project(&self, p: Point) -> Point {
        p - self.n * self.signed_distance_to(p)
    }

    /// True unless every point lies strictly on the same side.
    pub fn polygon_intersects(&self, points: &[Point]) -> bool {
        let sum: i32 = points.iter().map(|&p| i32::from(self.side(p))).sum();
        sum.unsigned_abs() as usize != points.len()
    }

    /// True unless all three vertices lie strictly on the same side.
    pub fn triangle_intersect(&self, points: [Point; 3]) -> bool {
        self.polygon_intersects(&points)
    }

    /// True unless both endpoints lie strictly on the same side.
    pub fn edge_intersect(&self, points: (Point, Point)) -> bool {
        self.polygon_intersects(&[points.0, points.1])
    }

    /// True if the endpoints classify differently.
    pub fn edge_crosses(&self, points: (Point, Point)) -> bool {
        self.classify(points.0) != self.classify(points.1)
    }

    /// True if both endpoints are on the plane.
    pub fn edge_coplanar(&self, points: (Point, Point)) -> bool {
        self.classify(points.0) == Side::On && self.classify(points.1) == Side::On
    }

    /// Point where the line through `p0` and `p1` meets the plane.
    ///
    /// A line parallel to the plane clamps its denominator instead of
    /// dividing by zero, so the result is always finite.
    pub fn line_intersection(&self, p0: Point, p1: Point) -> Point {
        let n = self.n.as_dvec3();
        let denom = clamp_denominator(n.dot((p1 - p0).as_dvec3()));
        let t = n.dot((self.o - p0).as_dvec3()) / denom;
        p0 + (p1 - p0) * t
    }

    /// Crossing of a segment with the plane.
    ///
    /// - both endpoints on the plane: `(p0, p1)`
    /// - one endpoint on the plane: that endpoint twice
    /// - endpoints on opposite sides: the crossing point twice
    /// - both strictly on one side: `None`
    pub fn edge_intersection(&self, points: (Point, Point)) -> Option<(Point, Point)> {
        let (p0, p1) = points;
        match (self.classify(p0), self.classify(p1)) {
            (Side::On, Side::On) => Some((p0, p1)),
            (Side::On, _) => Some((p0, p0)),
            (_, Side::On) => Some((p1, p1)),
            (Side::Above, Side::Above) | (Side::Below, Side::Below) => None,
            (Side::Above, Side::Below) | (Side::Below, Side::Above) => {
                let p = self.line_intersection(p0, p1);
                Some((p, p))
            }
        }
    }

    /// Crossing segments of a triangle with the plane.
    ///
    /// | vertices on plane | other vertices | result |
    /// |---|---|---|
    /// | 3 | - | all three edges |
    /// | 2 | - | the shared edge |
    /// | 1 | same side | `(v, v)` |
    /// | 1 | straddling | `(v, crossing of opposite edge)` |
    /// | 0 | all one side | nothing |
    /// | 0 | one vertex alone | crossings of the two edges at the lone vertex |
    pub fn triangle_intersection(&self, points: [Point; 3]) -> Vec<(Point, Point)> {
        use Side::{Above, Below, On};

        let [p0, p1, p2] = points;
        let sides = (
            self.classify(p0),
            self.classify(p1),
            self.classify(p2),
        );
        let cross = |a: Point, b: Point| self.line_intersection(a, b);

        match sides {
            (On, On, On) => vec![(p0, p1), (p1, p2), (p2, p0)],

            (On, On, _) => vec![(p0, p1)],
            (_, On, On) => vec![(p1, p2)],
            (On, _, On) => vec![(p2, p0)],

            (On, Above, Above) | (On, Below, Below) => vec![(p0, p0)],
            (Above, On, Above) | (Below, On, Below) => vec![(p1, p1)],
            (Above, Above, On) | (Below, Below, On) => vec![(p2, p2)],

            (On, _, _) => vec![(p0, cross(p1, p2))],
            (_, On, _) => vec![(p1, cross(p2, p0))],
            (_, _, On) => vec![(p2, cross(p0, p1))],

            (Above, Above, Above) | (Below, Below, Below) => Vec::new(),

            (Below, Above, Above) | (Above, Below, Below) => {
                vec![(cross(p0, p1), cross(p2, p0))]
            }
            (Above, Below, Above) | (Below, Above, Below) => {
                vec![(cross(p0, p1), cross(p1, p2))]
            }
            (Above, Above, Below) | (Below, Below, Above) => {
                vec![(cross(p1, p2), cross(p2, p0))]
            }
        }
    }
}
