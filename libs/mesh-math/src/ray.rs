//! # Ray
//!
//! Half-line with a bounded parametric extent.
//!
//! The extent is given as world lengths: `min_dist` advances the origin and
//! `max_dist` is measured from the original origin. Internally only the
//! remaining length after the advance is stored in `max`.

use crate::vector::{Direction, Point};
use serde::{Deserialize, Serialize};

/// A ray with origin, unit direction and maximum length.
///
/// # Example
///
/// ```rust
/// use mesh_math::{Direction, Point, Ray};
///
/// let ray = Ray::new(Point::ORIGIN, Direction::new(1.0, 0.0, 0.0), 1.0, 5.0);
/// assert_eq!(ray.o, Point::new(1.0, 0.0, 0.0));
/// assert_eq!(ray.max, 4.0);
/// assert_eq!(ray.eval(10.0), Point::new(5.0, 0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// Origin, already advanced by the minimum distance.
    pub o: Point,
    /// Unit direction.
    pub d: Direction,
    /// Remaining length from `o`; may be infinite.
    pub max: f64,
}

impl Ray {
    /// Creates a ray spanning `[min_dist, max_dist]` along `d` from `o`.
    pub fn new(o: Point, d: Direction, min_dist: f64, max_dist: f64) -> Self {
        let max = if max_dist.is_infinite() {
            f64::INFINITY
        } else {
            (max_dist - min_dist).max(0.0)
        };
        Self {
            o: o + d * min_dist,
            d,
            max,
        }
    }

    /// Creates an unbounded ray.
    pub fn infinite(o: Point, d: Direction) -> Self {
        Self::new(o, d, 0.0, f64::INFINITY)
    }

    /// Point at parameter `t`, clamped to the ray's extent.
    pub fn eval(&self, t: f64) -> Point {
        self.o + self.d * t.clamp(0.0, self.max)
    }

    /// Far endpoint, or `None` for an unbounded ray.
    pub fn end(&self) -> Option<Point> {
        self.max.is_finite().then(|| self.o + self.d * self.max)
    }
}
