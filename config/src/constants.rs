//! # Configuration Constants
//!
//! Centralized constants for the mesh document core. Plane classification,
//! ray casting, spatial cache construction and contour crawling all read
//! their tolerances from here.

use thiserror::Error;

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for general floating-point comparisons.
///
/// # Example
///
/// ```rust
/// use config::constants::EPSILON;
///
/// fn approximately_equal(a: f64, b: f64) -> bool {
///     (a - b).abs() < EPSILON
/// }
///
/// assert!(approximately_equal(1.0, 1.0 + 1e-11));
/// ```
pub const EPSILON: f64 = 1e-10;

/// Tolerance for classifying a point as lying on a plane.
///
/// `Plane::side` returns 0 for any point whose signed distance magnitude
/// is below this value.
///
/// # Example
///
/// ```rust
/// use config::constants::PLANE_EPSILON;
///
/// let signed_distance = 2e-7;
/// assert!(signed_distance < PLANE_EPSILON);
/// ```
pub const PLANE_EPSILON: f64 = 1e-6;

/// Smallest magnitude allowed for a denominator.
///
/// Zero-length edges and segments clamp their lengths (or plane dot
/// products) to this value instead of dividing by zero.
pub const DENOMINATOR_EPSILON: f64 = 1e-8;

/// Threshold below which two 2D segments are treated as parallel.
pub const PARALLEL_EPSILON: f64 = 1e-7;

/// Tolerance for the Möller–Trumbore determinant.
pub const RAY_EPSILON: f64 = 1e-12;

// =============================================================================
// QUERY CONSTANTS
// =============================================================================

/// Distance a multi-hit ray cast advances past each hit before re-casting.
///
/// Guarantees forward progress on self-intersecting geometry.
///
/// # Example
///
/// ```rust
/// use config::constants::RAYCAST_ADVANCE;
///
/// let hit_distance = 2.0;
/// let next_origin = hit_distance + RAYCAST_ADVANCE;
/// assert!(next_origin > hit_distance);
/// ```
pub const RAYCAST_ADVANCE: f64 = 1e-5;

/// Margin (local units) applied to the document bounding box when
/// rejecting ray hits that leaked past the geometry.
pub const BBOX_HIT_MARGIN: f64 = 1.0;

/// Hard upper bound on the number of hits a multi-hit cast collects.
pub const RAYCAST_ALL_MAX_HITS: usize = 4096;

/// Default fraction trimmed from projected edges in 2D edge queries.
///
/// Half is removed at each end so that picks near a shared vertex prefer
/// the vertex over the edge.
pub const EDGE_SHORTEN_DEFAULT: f64 = 0.01;

// =============================================================================
// SPATIAL INDEX CONSTANTS
// =============================================================================

/// Maximum triangles stored in a BVH leaf.
///
/// # Example
///
/// ```rust
/// use config::constants::BVH_MAX_LEAF_SIZE;
///
/// assert!(BVH_MAX_LEAF_SIZE >= 1);
/// ```
pub const BVH_MAX_LEAF_SIZE: usize = 4;

// =============================================================================
// TRAVERSAL CONSTANTS
// =============================================================================

/// Upper bound on vertex steps taken by the gradient walk toward a plane.
pub const WALK_MAX_STEPS: usize = 100_000;

/// Valence of a regular quad vertex (and side count of a quad face).
pub const QUAD_VALENCE: usize = 4;

// =============================================================================
// RUNTIME CONFIGURATION
// =============================================================================

/// Per-document tunables for queries and spatial caches.
///
/// # Example
///
/// ```rust
/// use config::constants::DocumentConfig;
///
/// let config = DocumentConfig::default();
/// assert!(config.raycast_advance > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentConfig {
    /// Distance advanced past each hit in multi-hit casts.
    pub raycast_advance: f64,
    /// Margin applied to the bounding box when validating ray hits.
    pub bbox_hit_margin: f64,
    /// Maximum triangles per BVH leaf.
    pub bvh_max_leaf_size: usize,
}

impl DocumentConfig {
    /// Builds a configuration, rejecting values that would stall queries.
    ///
    /// # Example
    ///
    /// ```rust
    /// use config::constants::DocumentConfig;
    ///
    /// let cfg = DocumentConfig::new(1e-4, 0.5, 8).expect("valid config");
    /// assert_eq!(cfg.bvh_max_leaf_size, 8);
    /// assert!(DocumentConfig::new(0.0, 0.5, 8).is_err());
    /// ```
    pub fn new(
        raycast_advance: f64,
        bbox_hit_margin: f64,
        bvh_max_leaf_size: usize,
    ) -> Result<Self, ConfigError> {
        if !(raycast_advance > 0.0) {
            return Err(ConfigError::InvalidAdvance(raycast_advance));
        }
        if !(bbox_hit_margin >= 0.0) {
            return Err(ConfigError::InvalidMargin(bbox_hit_margin));
        }
        if bvh_max_leaf_size == 0 {
            return Err(ConfigError::InvalidLeafSize(bvh_max_leaf_size));
        }
        Ok(Self {
            raycast_advance,
            bbox_hit_margin,
            bvh_max_leaf_size,
        })
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            raycast_advance: RAYCAST_ADVANCE,
            bbox_hit_margin: BBOX_HIT_MARGIN,
            bvh_max_leaf_size: BVH_MAX_LEAF_SIZE,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Ray advance must be strictly positive to guarantee progress.
    #[error("raycast advance must be positive: {0}")]
    InvalidAdvance(f64),
    /// Bounding box margin must be non-negative.
    #[error("bbox hit margin must be >= 0: {0}")]
    InvalidMargin(f64),
    /// BVH leaves must hold at least one triangle.
    #[error("bvh leaf size must be >= 1: {0}")]
    InvalidLeafSize(usize),
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Checks if two f64 values are approximately equal within EPSILON.
///
/// # Example
///
/// ```rust
/// use config::constants::approx_equal;
///
/// assert!(approx_equal(1.0, 1.0 + 1e-11));
/// assert!(!approx_equal(1.0, 1.1));
/// ```
#[inline]
pub fn approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Checks if a f64 value is approximately zero within EPSILON.
///
/// # Example
///
/// ```rust
/// use config::constants::approx_zero;
///
/// assert!(approx_zero(1e-11));
/// assert!(!approx_zero(0.1));
/// ```
#[inline]
pub fn approx_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// Clamps a denominator away from zero, keeping its sign.
///
/// # Example
///
/// ```rust
/// use config::constants::{clamp_denominator, DENOMINATOR_EPSILON};
///
/// assert_eq!(clamp_denominator(0.0), DENOMINATOR_EPSILON);
/// assert_eq!(clamp_denominator(-1e-12), -DENOMINATOR_EPSILON);
/// assert_eq!(clamp_denominator(2.0), 2.0);
/// ```
#[inline]
pub fn clamp_denominator(value: f64) -> f64 {
    if value.abs() >= DENOMINATOR_EPSILON {
        value
    } else if value < 0.0 {
        -DENOMINATOR_EPSILON
    } else {
        DENOMINATOR_EPSILON
    }
}
