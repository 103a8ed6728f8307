//! # Mesh Document
//!
//! Topology-aware editable polygon mesh with cached spatial acceleration
//! structures, local↔world transforms and plane-crossing contour crawls.
//!
//! ## Architecture
//!
//! ```text
//! MeshSnapshot (host) → SourceDocument (read-only, triangulated)
//!                     → TargetDocument (mutable session) → MeshHost (commit)
//! ```
//!
//! ## Components
//!
//! - **Document**: slot-array storage with stable handles and a version stamp
//! - **Spatial caches**: bounding box, BVH and point index, rebuilt lazily
//! - **Queries**: ray casts, 3D/2D nearest element, visibility filters
//! - **Crawl**: ordered cross-section contours against a plane
//! - **Mutation**: element creation, deletion, normal fixing, cleanup
//! - **Selection and walks**: selection edits, edge loops, face loops
//!
//! ## Usage
//!
//! ```rust
//! use glam::DVec3;
//! use mesh_document::{MeshSnapshot, SourceDocument};
//! use mesh_math::{Direction, Point, Ray};
//!
//! let snapshot = MeshSnapshot::from_polygons(
//!     "quad",
//!     &[DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0), DVec3::Y],
//!     &[vec![0, 1, 2, 3]],
//! );
//! let source = SourceDocument::build(&snapshot).expect("valid snapshot");
//! assert_eq!(source.face_count(), 2);
//!
//! let ray = Ray::infinite(Point::new(0.25, 0.5, 1.0), Direction::new(0.0, 0.0, -1.0));
//! let hit = source.raycast(&ray).expect("ray hits the quad");
//! assert!((hit.distance - 1.0).abs() < 1e-9);
//! ```

pub mod crawl;
pub mod document;
pub mod element;
pub mod error;
pub mod export;
pub mod host;
pub mod mutation;
pub mod query;
pub mod selection;
pub mod spatial;
pub mod walk;

#[cfg(test)]
pub(crate) mod fixtures;

pub use crawl::{CancelSignal, Contour, Crossing, NeverCancel};
pub use document::{content_hash, CacheStats, MeshDocument, SourceCache, SourceDocument, TargetDocument};
pub use element::{Edge, EdgeId, Face, FaceId, MeshElement, VertId, Vertex};
pub use error::{MeshDocError, MeshDocResult};
pub use export::MeshExport;
pub use host::{Axis, HostState, MeshHost, MeshSnapshot, SnapshotEdge, SnapshotFace, SnapshotVertex};
pub use query::RayHit;
pub use spatial::RebuildCounts;
