//! # Bounding Box
//!
//! Axis-aligned box over a point set, used to reject ray hits far from the
//! mesh and as the coarse bounds of spatial queries.

use crate::ray::Ray;
use crate::vector::{Point, Vector};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
///
/// # Example
///
/// ```rust
/// use mesh_math::{BBox, Point};
///
/// let bbox = BBox::from_points([Point::new(0.0, 0.0, 0.0), Point::new(2.0, 2.0, 2.0)]).unwrap();
/// assert_eq!(bbox.center(), Point::new(1.0, 1.0, 1.0));
/// assert!(bbox.point_within(Point::new(2.5, 1.0, 1.0), 1.0));
/// assert!(!bbox.point_within(Point::new(2.5, 1.0, 1.0), 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    min: DVec3,
    max: DVec3,
}

impl BBox {
    /// Box spanned by two opposite corners, in any order.
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: a.as_dvec3().min(b.as_dvec3()),
            max: a.as_dvec3().max(b.as_dvec3()),
        }
    }

    /// Box grown to contain `p`.
    pub fn including(&self, p: Point) -> BBox {
        BBox {
            min: self.min.min(p.as_dvec3()),
            max: self.max.max(p.as_dvec3()),
        }
    }

    /// Bounds of the given points, or `None` for an empty set.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?.as_dvec3();
        let (min, max) = iter.fold((first, first), |(min, max), p| {
            (min.min(p.as_dvec3()), max.max(p.as_dvec3()))
        });
        Some(Self { min, max })
    }

    /// Minimum corner.
    #[inline]
    pub fn min(&self) -> Point {
        Point(self.min)
    }

    /// Maximum corner.
    #[inline]
    pub fn max(&self) -> Point {
        Point(self.max)
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point {
        Point((self.min + self.max) * 0.5)
    }

    /// Vector from the minimum to the maximum corner.
    #[inline]
    pub fn diagonal(&self) -> Vector {
        Vector(self.max - self.min)
    }

    /// True if `p` lies inside the box grown by `margin` on every side.
    pub fn point_within(&self, p: Point, margin: f64) -> bool {
        let p = p.as_dvec3();
        p.cmpge(self.min - DVec3::splat(margin)).all() && p.cmple(self.max + DVec3::splat(margin)).all()
    }

    /// Box grown by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> BBox {
        BBox {
            min: self.min - DVec3::splat(margin),
            max: self.max + DVec3::splat(margin),
        }
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Index (0, 1, 2) of the longest side.
    pub fn longest_axis(&self) -> usize {
        let d = self.max - self.min;
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    /// Squared distance from `p` to the box; zero inside.
    pub fn distance_squared_to(&self, p: Point) -> f64 {
        let p = p.as_dvec3();
        (p.clamp(self.min, self.max) - p).length_squared()
    }

    /// Parameter at which the ray enters the box, or `None` if it misses
    /// within `[0, ray.max]`. Slab test.
    pub fn ray_entry(&self, ray: &Ray) -> Option<f64> {
        let o = ray.o.as_dvec3();
        let inv = ray.d.as_dvec3().recip();
        let t0 = (self.min - o) * inv;
        let t1 = (self.max - o) * inv;
        // NaN from 0 * inf on a slab boundary is dropped by min/max
        let near = t0.min(t1).max_element().max(0.0);
        let far = t0.max(t1).min_element().min(ray.max);
        (near <= far).then_some(near)
    }
}
