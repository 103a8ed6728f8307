//! # Mesh Elements
//!
//! Vertices, edges and faces stored in slot arrays and addressed by stable
//! handles. Adjacency is kept as handle lists on both sides:
//!
//! ```text
//! Vertex.edges ──► Edge.verts
//! Edge.faces   ──► Face.edges
//! Face.verts   ──► Vertex
//! ```
//!
//! A face's edge `i` joins loop vertex `i` and `i + 1` (cyclically).

use glam::DVec3;
use mesh_math::{Normal, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// HANDLES
// =============================================================================

macro_rules! handle {
    ($name:ident, $prefix:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl $name {
            /// Slot index of this handle.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

handle!(VertId, "v", "Stable handle to a vertex slot.");
handle!(EdgeId, "e", "Stable handle to an edge slot.");
handle!(FaceId, "f", "Stable handle to a face slot.");

// =============================================================================
// ELEMENTS
// =============================================================================

/// A vertex in local space.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub(crate) position: DVec3,
    pub(crate) normal: DVec3,
    pub(crate) selected: bool,
    pub(crate) edges: Vec<EdgeId>,
}

impl Vertex {
    pub(crate) fn new(position: DVec3, normal: DVec3) -> Self {
        Self {
            position,
            normal,
            selected: false,
            edges: Vec::new(),
        }
    }

    /// Local position.
    #[inline]
    pub fn position(&self) -> Point {
        Point(self.position)
    }

    /// Local normal.
    #[inline]
    pub fn normal(&self) -> Normal {
        Normal::from_dvec3(self.normal)
    }

    /// Selection flag.
    #[inline]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Incident edges.
    #[inline]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }
}

/// An edge between two distinct vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub(crate) verts: [VertId; 2],
    pub(crate) selected: bool,
    pub(crate) faces: Vec<FaceId>,
}

impl Edge {
    pub(crate) fn new(verts: [VertId; 2]) -> Self {
        Self {
            verts,
            selected: false,
            faces: Vec::new(),
        }
    }

    /// Endpoints.
    #[inline]
    pub fn verts(&self) -> [VertId; 2] {
        self.verts
    }

    /// Incident faces; a manifold edge has exactly two.
    #[inline]
    pub fn faces(&self) -> &[FaceId] {
        &self.faces
    }

    /// Selection flag.
    #[inline]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// The endpoint opposite `v`, or `None` if `v` is not an endpoint.
    pub fn other_vert(&self, v: VertId) -> Option<VertId> {
        match self.verts {
            [a, b] if a == v => Some(b),
            [a, b] if b == v => Some(a),
            _ => None,
        }
    }

    /// True if the edge joins `a` and `b` in either order.
    pub fn joins(&self, a: VertId, b: VertId) -> bool {
        self.verts == [a, b] || self.verts == [b, a]
    }

    /// True if exactly two faces use this edge.
    pub fn is_manifold(&self) -> bool {
        self.faces.len() == 2
    }
}

/// A polygon over a cyclic vertex loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub(crate) verts: Vec<VertId>,
    pub(crate) edges: Vec<EdgeId>,
    pub(crate) normal: DVec3,
    pub(crate) smooth: bool,
    pub(crate) selected: bool,
}

impl Face {
    /// Vertex loop.
    #[inline]
    pub fn verts(&self) -> &[VertId] {
        &self.verts
    }

    /// Edge loop; edge `i` joins vertex `i` and `i + 1`.
    #[inline]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Local face normal.
    #[inline]
    pub fn normal(&self) -> Normal {
        Normal::from_dvec3(self.normal)
    }

    /// Smooth shading flag.
    #[inline]
    pub fn is_smooth(&self) -> bool {
        self.smooth
    }

    /// Selection flag.
    #[inline]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Number of sides.
    #[inline]
    pub fn len(&self) -> usize {
        self.verts.len()
    }

    /// Faces always have at least three sides.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }

    /// Reverses the winding, keeping edge `i` between vertex `i` and `i + 1`.
    pub(crate) fn reverse(&mut self) {
        self.verts.reverse();
        // old edge k joined old v[k], v[k+1]; after reversal the pair sits at
        // new positions n-2-k and n-1-k
        self.edges.reverse();
        self.edges.rotate_left(1);
    }
}

// =============================================================================
// TAGGED ELEMENT
// =============================================================================

/// Any mesh element, for operations that accept mixed selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshElement {
    /// A vertex.
    Vert(VertId),
    /// An edge.
    Edge(EdgeId),
    /// A face.
    Face(FaceId),
}

impl From<VertId> for MeshElement {
    fn from(value: VertId) -> Self {
        MeshElement::Vert(value)
    }
}

impl From<EdgeId> for MeshElement {
    fn from(value: EdgeId) -> Self {
        MeshElement::Edge(value)
    }
}

impl From<FaceId> for MeshElement {
    fn from(value: FaceId) -> Self {
        MeshElement::Face(value)
    }
}

impl fmt::Display for MeshElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshElement::Vert(v) => v.fmt(f),
            MeshElement::Edge(e) => e.fmt(f),
            MeshElement::Face(face) => face.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_vert() {
        let e = Edge::new([VertId(1), VertId(4)]);
        assert_eq!(e.other_vert(VertId(1)), Some(VertId(4)));
        assert_eq!(e.other_vert(VertId(4)), Some(VertId(1)));
        assert_eq!(e.other_vert(VertId(2)), None);
        assert!(e.joins(VertId(4), VertId(1)));
    }

    #[test]
    fn test_reverse_keeps_edge_alignment() {
        // quad v0..v3 with e_i joining v_i, v_i+1
        let mut face = Face {
            verts: vec![VertId(0), VertId(1), VertId(2), VertId(3)],
            edges: vec![EdgeId(10), EdgeId(11), EdgeId(12), EdgeId(13)],
            normal: DVec3::Z,
            smooth: false,
            selected: false,
        };
        face.reverse();
        assert_eq!(face.verts, vec![VertId(3), VertId(2), VertId(1), VertId(0)]);
        // v3-v2 is e12, v2-v1 is e11, v1-v0 is e10, v0-v3 is e13
        assert_eq!(face.edges, vec![EdgeId(12), EdgeId(11), EdgeId(10), EdgeId(13)]);
    }

    #[test]
    fn test_display() {
        assert_eq!(MeshElement::from(FaceId(7)).to_string(), "f7");
        assert_eq!(EdgeId(3).to_string(), "e3");
    }
}
