//! # 3D Vector Types
//!
//! `Point`, `Vector`, `Direction` and `Normal` all wrap `glam::DVec3`.
//! The distinction matters under affine transforms: points translate,
//! vectors and directions only rotate/scale, and normals use the
//! inverse-transpose of the linear part.
//!
//! `Direction` and `Normal` are normalized on construction. A zero input
//! stays zero instead of producing NaNs.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Deref, Div, Mul, Neg, Sub};

// =============================================================================
// SHARED BOILERPLATE
// =============================================================================

macro_rules! impl_vec3_common {
    ($name:ident) => {
        impl $name {
            /// Returns the underlying `glam` vector.
            #[inline]
            pub fn as_dvec3(&self) -> DVec3 {
                self.0
            }

            /// Returns the components as an array.
            #[inline]
            pub fn to_array(&self) -> [f64; 3] {
                self.0.to_array()
            }
        }

        impl Deref for $name {
            type Target = DVec3;

            #[inline]
            fn deref(&self) -> &DVec3 {
                &self.0
            }
        }

        impl From<$name> for DVec3 {
            #[inline]
            fn from(value: $name) -> DVec3 {
                value.0
            }
        }
    };
}

/// Normalizes `v`, leaving degenerate (zero or non-finite length) input as zero.
#[inline]
fn normalize_or_zero(v: DVec3) -> DVec3 {
    v.try_normalize().unwrap_or(DVec3::ZERO)
}

// =============================================================================
// POINT
// =============================================================================

/// A position in space.
///
/// # Example
///
/// ```rust
/// use mesh_math::{Point, Vector};
///
/// let a = Point::new(1.0, 2.0, 3.0);
/// let b = a + Vector::new(1.0, 0.0, 0.0);
/// assert_eq!(b - a, Vector::new(1.0, 0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point(pub DVec3);

impl_vec3_common!(Point);

impl Point {
    /// The origin.
    pub const ORIGIN: Point = Point(DVec3::ZERO);

    /// Creates a point from coordinates.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(DVec3::new(x, y, z))
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance_to(&self, other: Point) -> f64 {
        self.0.distance(other.0)
    }

    /// Squared Euclidean distance to another point.
    #[inline]
    pub fn distance_squared_to(&self, other: Point) -> f64 {
        self.0.distance_squared(other.0)
    }

    /// Linear interpolation toward `other`.
    #[inline]
    pub fn lerp(&self, other: Point, t: f64) -> Point {
        Point(self.0.lerp(other.0, t))
    }

    /// Average of a set of points. Returns the origin for empty input.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mesh_math::Point;
    ///
    /// let c = Point::average([Point::new(0.0, 0.0, 0.0), Point::new(2.0, 4.0, 6.0)]);
    /// assert_eq!(c, Point::new(1.0, 2.0, 3.0));
    /// assert_eq!(Point::average(std::iter::empty()), Point::ORIGIN);
    /// ```
    pub fn average(points: impl IntoIterator<Item = Point>) -> Point {
        let (sum, count) = points
            .into_iter()
            .fold((DVec3::ZERO, 0usize), |(sum, count), p| (sum + p.0, count + 1));
        if count == 0 {
            return Point::ORIGIN;
        }
        Point(sum / count as f64)
    }
}

impl From<[f64; 3]> for Point {
    fn from(value: [f64; 3]) -> Self {
        Point(DVec3::from_array(value))
    }
}

impl Sub for Point {
    type Output = Vector;

    #[inline]
    fn sub(self, rhs: Point) -> Vector {
        Vector(self.0 - rhs.0)
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    #[inline]
    fn add(self, rhs: Vector) -> Point {
        Point(self.0 + rhs.0)
    }
}

impl Sub<Vector> for Point {
    type Output = Point;

    #[inline]
    fn sub(self, rhs: Vector) -> Point {
        Point(self.0 - rhs.0)
    }
}

impl AddAssign<Vector> for Point {
    #[inline]
    fn add_assign(&mut self, rhs: Vector) {
        self.0 += rhs.0;
    }
}

// =============================================================================
// VECTOR
// =============================================================================

/// A free displacement with magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector(pub DVec3);

impl_vec3_common!(Vector);

impl Vector {
    /// The zero vector.
    pub const ZERO: Vector = Vector(DVec3::ZERO);

    /// Creates a vector from components.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(DVec3::new(x, y, z))
    }

    /// Cross product.
    #[inline]
    pub fn cross(&self, other: Vector) -> Vector {
        Vector(self.0.cross(other.0))
    }

    /// Unit direction of this vector (zero stays zero).
    #[inline]
    pub fn direction(&self) -> Direction {
        Direction::from_dvec3(self.0)
    }
}

impl Add for Vector {
    type Output = Vector;

    #[inline]
    fn add(self, rhs: Vector) -> Vector {
        Vector(self.0 + rhs.0)
    }
}

impl AddAssign for Vector {
    #[inline]
    fn add_assign(&mut self, rhs: Vector) {
        self.0 += rhs.0;
    }
}

impl Sub for Vector {
    type Output = Vector;

    #[inline]
    fn sub(self, rhs: Vector) -> Vector {
        Vector(self.0 - rhs.0)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    #[inline]
    fn mul(self, rhs: f64) -> Vector {
        Vector(self.0 * rhs)
    }
}

impl Div<f64> for Vector {
    type Output = Vector;

    #[inline]
    fn div(self, rhs: f64) -> Vector {
        Vector(self.0 / rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;

    #[inline]
    fn neg(self) -> Vector {
        Vector(-self.0)
    }
}

// =============================================================================
// DIRECTION
// =============================================================================

/// A unit-length direction.
///
/// # Example
///
/// ```rust
/// use mesh_math::Direction;
///
/// let d = Direction::new(3.0, 0.0, 4.0);
/// assert!((d.length() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Direction(DVec3);

impl_vec3_common!(Direction);

impl Direction {
    /// Creates a direction, normalizing the components.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self::from_dvec3(DVec3::new(x, y, z))
    }

    /// Creates a direction from a raw vector, normalizing it.
    #[inline]
    pub fn from_dvec3(v: DVec3) -> Self {
        Self(normalize_or_zero(v))
    }

    /// Cross product as a free vector.
    #[inline]
    pub fn cross(&self, other: Direction) -> Vector {
        Vector(self.0.cross(other.0))
    }

    /// The opposite direction.
    #[inline]
    pub fn reversed(&self) -> Direction {
        Direction(-self.0)
    }
}

impl From<Vector> for Direction {
    #[inline]
    fn from(value: Vector) -> Self {
        Direction::from_dvec3(value.0)
    }
}

impl Mul<f64> for Direction {
    type Output = Vector;

    #[inline]
    fn mul(self, rhs: f64) -> Vector {
        Vector(self.0 * rhs)
    }
}

// =============================================================================
// NORMAL
// =============================================================================

/// A unit-length surface normal.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Normal(DVec3);

impl_vec3_common!(Normal);

impl Normal {
    /// Creates a normal, normalizing the components.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self::from_dvec3(DVec3::new(x, y, z))
    }

    /// Creates a normal from a raw vector, normalizing it.
    #[inline]
    pub fn from_dvec3(v: DVec3) -> Self {
        Self(normalize_or_zero(v))
    }

    /// The flipped normal.
    #[inline]
    pub fn flipped(&self) -> Normal {
        Normal(-self.0)
    }
}

impl From<Vector> for Normal {
    #[inline]
    fn from(value: Vector) -> Self {
        Normal::from_dvec3(value.0)
    }
}

impl From<Direction> for Normal {
    #[inline]
    fn from(value: Direction) -> Self {
        Normal(value.0)
    }
}

impl From<Normal> for Direction {
    #[inline]
    fn from(value: Normal) -> Self {
        Direction(value.0)
    }
}

impl Mul<f64> for Normal {
    type Output = Vector;

    #[inline]
    fn mul(self, rhs: f64) -> Vector {
        Vector(self.0 * rhs)
    }
}

// =============================================================================
// TESTS
// =============================================================================
