//! # Config Crate
//!
//! Centralized configuration constants for the mesh document workspace.
//! Every tolerance and tunable used by the geometry primitives, spatial
//! caches, queries and contour crawls is defined here so that the kernels
//! never carry their own magic numbers.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{PLANE_EPSILON, approx_zero};
//!
//! // A signed distance below PLANE_EPSILON counts as "on the plane"
//! let distance: f64 = 5e-7;
//! assert!(distance.abs() < PLANE_EPSILON);
//!
//! // approx_zero uses the tighter EPSILON
//! assert!(approx_zero(1e-11));
//! ```
//!
//! ## Categories
//!
//! - **Precision**: floating-point comparison tolerances
//! - **Queries**: ray advance, bounding box margin, hit limits
//! - **Traversal**: walk bounds and quad valence
//! - **Runtime**: [`constants::DocumentConfig`] for per-document overrides

pub mod constants;
