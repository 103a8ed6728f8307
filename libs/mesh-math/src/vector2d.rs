//! # 2D Vector Types
//!
//! Screen-space counterparts of the 3D types. Projected vertices and
//! cursor positions are `Point2D`; differences between them are `Vec2D`.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Deref, Mul, Sub};

/// A position in screen space.
///
/// # Example
///
/// ```rust
/// use mesh_math::Point2D;
///
/// let a = Point2D::new(0.0, 0.0);
/// let b = Point2D::new(3.0, 4.0);
/// assert_eq!(a.distance_to(b), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D(pub DVec2);

/// A displacement in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2D(pub DVec2);

/// A unit-length screen-space direction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Direction2D(DVec2);

impl Point2D {
    /// Creates a point from coordinates.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance_to(&self, other: Point2D) -> f64 {
        self.0.distance(other.0)
    }

    /// Squared Euclidean distance to another point.
    #[inline]
    pub fn distance_squared_to(&self, other: Point2D) -> f64 {
        self.0.distance_squared(other.0)
    }
}

impl Vec2D {
    /// Creates a vector from components.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }
}

impl Direction2D {
    /// Creates a direction, normalizing the components (zero stays zero).
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y).try_normalize().unwrap_or(DVec2::ZERO))
    }
}

impl From<Vec2D> for Direction2D {
    fn from(value: Vec2D) -> Self {
        Direction2D::new(value.x, value.y)
    }
}

impl Deref for Point2D {
    type Target = DVec2;

    fn deref(&self) -> &DVec2 {
        &self.0
    }
}

impl Deref for Vec2D {
    type Target = DVec2;

    fn deref(&self) -> &DVec2 {
        &self.0
    }
}

impl Deref for Direction2D {
    type Target = DVec2;

    fn deref(&self) -> &DVec2 {
        &self.0
    }
}

impl Sub for Point2D {
    type Output = Vec2D;

    #[inline]
    fn sub(self, rhs: Point2D) -> Vec2D {
        Vec2D(self.0 - rhs.0)
    }
}

impl Add<Vec2D> for Point2D {
    type Output = Point2D;

    #[inline]
    fn add(self, rhs: Vec2D) -> Point2D {
        Point2D(self.0 + rhs.0)
    }
}

impl Sub<Vec2D> for Point2D {
    type Output = Point2D;

    #[inline]
    fn sub(self, rhs: Vec2D) -> Point2D {
        Point2D(self.0 - rhs.0)
    }
}

impl Mul<f64> for Vec2D {
    type Output = Vec2D;

    #[inline]
    fn mul(self, rhs: f64) -> Vec2D {
        Vec2D(self.0 * rhs)
    }
}

impl Mul<f64> for Direction2D {
    type Output = Vec2D;

    #[inline]
    fn mul(self, rhs: f64) -> Vec2D {
        Vec2D(self.0 * rhs)
    }
}
