//! # Host Interface
//!
//! Plain data exchanged with the application that owns the mesh. The host
//! supplies a [`MeshSnapshot`] to build documents and receives one back on
//! commit through [`MeshHost`].

use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cardinal mirror axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Mirror across the local YZ plane.
    X,
    /// Mirror across the local XZ plane.
    Y,
    /// Mirror across the local XY plane.
    Z,
}

impl Axis {
    /// Lowercase axis name.
    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Vertex record of a snapshot, in local space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotVertex {
    /// Local position.
    pub position: DVec3,
    /// Local normal.
    pub normal: DVec3,
    /// Selection flag.
    pub selected: bool,
}

impl SnapshotVertex {
    /// Unselected vertex with the given position and normal.
    pub fn new(position: DVec3, normal: DVec3) -> Self {
        Self {
            position,
            normal,
            selected: false,
        }
    }
}

/// Edge record of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEdge {
    /// Indices into the snapshot vertex list.
    pub verts: [usize; 2],
    /// Selection flag.
    pub selected: bool,
}

/// Face record of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFace {
    /// Vertex loop, indices into the snapshot vertex list.
    pub verts: Vec<usize>,
    /// Selection flag.
    pub selected: bool,
    /// Smooth shading flag.
    pub smooth: bool,
}

impl SnapshotFace {
    /// Unselected flat face over the given loop.
    pub fn new(verts: Vec<usize>) -> Self {
        Self {
            verts,
            selected: false,
            smooth: false,
        }
    }
}

/// Host mesh state consumed on build and produced on commit.
///
/// Edges needed by faces but absent from `edges` are created on import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshSnapshot {
    /// Mesh name; the source cache key.
    pub name: String,
    /// Vertices.
    pub vertices: Vec<SnapshotVertex>,
    /// Explicit edges.
    pub edges: Vec<SnapshotEdge>,
    /// Faces.
    pub faces: Vec<SnapshotFace>,
    /// Local-to-world matrix.
    pub matrix_world: DMat4,
    /// Mirror axes configured on the host object.
    pub mirror_axes: Vec<Axis>,
}

impl MeshSnapshot {
    /// Snapshot with an identity transform and no mirror axes.
    ///
    /// # Example
    ///
    /// ```rust
    /// use glam::DVec3;
    /// use mesh_document::MeshSnapshot;
    ///
    /// let snapshot = MeshSnapshot::from_polygons(
    ///     "tri",
    ///     &[DVec3::ZERO, DVec3::X, DVec3::Y],
    ///     &[vec![0, 1, 2]],
    /// );
    /// assert_eq!(snapshot.faces.len(), 1);
    /// assert!(snapshot.edges.is_empty());
    /// ```
    pub fn from_polygons(name: impl Into<String>, positions: &[DVec3], faces: &[Vec<usize>]) -> Self {
        Self {
            name: name.into(),
            vertices: positions
                .iter()
                .map(|&p| SnapshotVertex::new(p, DVec3::ZERO))
                .collect(),
            edges: Vec::new(),
            faces: faces.iter().cloned().map(SnapshotFace::new).collect(),
            matrix_world: DMat4::IDENTITY,
            mirror_axes: Vec::new(),
        }
    }
}

/// Non-mesh host state saved when a session opens and restored when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HostState {
    /// Whether the host object is hidden.
    pub hidden: bool,
}

/// Application side of a target document session.
pub trait MeshHost {
    /// Replaces the host mesh with the given state in one pass.
    fn write_mesh(&mut self, snapshot: &MeshSnapshot);

    /// Current non-mesh state.
    fn host_state(&self) -> HostState;

    /// Restores previously captured state.
    fn restore_state(&mut self, state: &HostState);
}
