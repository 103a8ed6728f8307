//! # Mesh Math
//!
//! Typed geometric primitives for the mesh document core.
//!
//! ## Architecture
//!
//! ```text
//! glam (DVec3/DMat4) → mesh-math (Point, Plane, Ray, XForm, ...) → mesh-document
//! ```
//!
//! Points, vectors, directions and normals share a storage type but not a
//! meaning: they transform differently between local and world space, so
//! each gets its own type and [`XForm`] offers one conversion per kind.
//!
//! ## Usage
//!
//! ```rust
//! use mesh_math::{Normal, Plane, Point};
//!
//! let plane = Plane::new(Point::new(0.0, 0.0, 0.5), Normal::new(0.0, 0.0, 1.0));
//! assert_eq!(plane.side(Point::new(0.0, 0.0, 0.5)), 0);
//! assert_eq!(plane.side(Point::new(0.0, 0.0, 1.0)), 1);
//! ```

pub mod bbox;
pub mod frame;
pub mod plane;
pub mod ray;
pub mod triangle2d;
pub mod vector;
pub mod vector2d;
pub mod xform;

pub use bbox::BBox;
pub use frame::Frame;
pub use plane::{Plane, Side};
pub use ray::Ray;
pub use vector::{Direction, Normal, Point, Vector};
pub use vector2d::{Direction2D, Point2D, Vec2D};
pub use xform::XForm;
