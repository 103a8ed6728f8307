//! # Quad Walks
//!
//! Edge loops and face loops over quad-dominant topology.
//!
//! - **Edge loop**: at each vertex continue along the edge that shares no
//!   face with the current one. Stops at a vertex with more than four
//!   edges or faces, at a vertex with no such edge, or when the loop
//!   closes.
//! - **Face loop**: cross each quad to the edge opposite the one entered
//!   through. Stops at a non-quad, a boundary edge, or when the loop closes.
//!
//! Open walks run both ways from the start edge, so the returned sequence
//! is contiguous with the start edge somewhere inside it.

use crate::document::MeshDocument;
use crate::element::{EdgeId, FaceId, VertId};
use config::constants::QUAD_VALENCE;
use std::collections::BTreeSet;

impl MeshDocument {
    /// Edge loop through `edge`, and whether it closes on itself.
    pub fn get_edge_loop(&self, edge: EdgeId) -> (Vec<EdgeId>, bool) {
        let Some(start) = self.edge(edge) else {
            return (Vec::new(), false);
        };
        let [a, b] = start.verts;
        let mut touched = BTreeSet::new();
        let mut edges = vec![edge];
        if self.crawl_edge_loop(edge, a, &mut touched, &mut edges) {
            return (edges, true);
        }
        edges.reverse();
        self.crawl_edge_loop(edge, b, &mut touched, &mut edges);
        (edges, false)
    }

    /// Edges crossed by the face loop through `edge`, and whether it closes.
    /// A wire edge has no face loop.
    pub fn get_face_loop(&self, edge: EdgeId) -> (Vec<EdgeId>, bool) {
        let faces = match self.edge(edge) {
            Some(e) if !e.faces.is_empty() => e.faces.clone(),
            _ => return (Vec::new(), false),
        };
        let mut edges = vec![edge];
        if self.crawl_face_loop(edge, faces[0], &mut edges) {
            return (edges, true);
        }
        if let Some(&other) = faces.get(1) {
            edges.reverse();
            self.crawl_face_loop(edge, other, &mut edges);
        }
        (edges, false)
    }

    /// Edge sequence walked from `edge` for loop-based tools.
    pub fn get_quadwalk_edge_sequence(&self, edge: EdgeId) -> Vec<EdgeId> {
        self.get_edge_loop(edge).0
    }

    /// Walks from `start` through `toward`, appending edges. Returns `true`
    /// when the walk comes back around.
    fn crawl_edge_loop(
        &self,
        start: EdgeId,
        toward: VertId,
        touched: &mut BTreeSet<VertId>,
        edges: &mut Vec<EdgeId>,
    ) -> bool {
        let mut current = start;
        let mut v = toward;
        loop {
            if !touched.insert(v) {
                return true;
            }
            let (Some(vert), Some(cur)) = (self.vert(v), self.edge(current)) else {
                return false;
            };
            if vert.edges.len() > QUAD_VALENCE || self.vert_faces(v).len() > QUAD_VALENCE {
                return false;
            }
            let next = vert.edges.iter().copied().find(|&e| {
                e != current
                    && self
                        .edge(e)
                        .is_some_and(|edge| edge.faces.iter().all(|f| !cur.faces.contains(f)))
            });
            let Some(next) = next else {
                return false;
            };
            if next == start {
                return true;
            }
            let Some(other) = self.edge(next).and_then(|e| e.other_vert(v)) else {
                return false;
            };
            edges.push(next);
            current = next;
            v = other;
        }
    }

    /// Crosses quads starting with `face`, appending each opposite edge.
    fn crawl_face_loop(&self, start: EdgeId, face: FaceId, edges: &mut Vec<EdgeId>) -> bool {
        let mut touched = BTreeSet::new();
        let mut current = start;
        let mut face = face;
        loop {
            if !touched.insert(face) {
                return false;
            }
            let Some(f) = self.face(face) else {
                return false;
            };
            if f.len() != QUAD_VALENCE {
                return false;
            }
            let Some(i) = f.edges.iter().position(|&e| e == current) else {
                return false;
            };
            let opposite = f.edges[(i + 2) % QUAD_VALENCE];
            if opposite == start {
                return true;
            }
            edges.push(opposite);
            let next = self
                .edge(opposite)
                .and_then(|e| e.faces.iter().copied().find(|&g| g != face));
            let Some(next) = next else {
                return false;
            };
            current = opposite;
            face = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{cube_snapshot, document, grid_snapshot, tube_snapshot};
    use crate::host::{MeshSnapshot, SnapshotEdge};
    use glam::DVec3;

    fn edge(doc: &MeshDocument, a: u32, b: u32) -> EdgeId {
        doc.find_edge(VertId(a), VertId(b)).unwrap()
    }

    fn as_set(edges: &[EdgeId]) -> BTreeSet<EdgeId> {
        edges.iter().copied().collect()
    }

    fn is_contiguous(doc: &MeshDocument, edges: &[EdgeId]) -> bool {
        edges.windows(2).all(|w| {
            let [a, b] = doc.edge(w[0]).unwrap().verts();
            let other = doc.edge(w[1]).unwrap();
            other.verts().contains(&a) || other.verts().contains(&b)
        })
    }

    #[test]
    fn test_edge_loop_around_tube_closes() {
        let doc = document(&tube_snapshot(3));
        let (edges, closed) = doc.get_edge_loop(edge(&doc, 4, 5));
        assert!(closed);
        assert_eq!(
            as_set(&edges),
            as_set(&[edge(&doc, 4, 5), edge(&doc, 5, 6), edge(&doc, 6, 7), edge(&doc, 7, 4)])
        );
        assert_eq!(edges.len(), 4);
        assert!(is_contiguous(&doc, &edges));
    }

    #[test]
    fn test_edge_loop_along_tube_is_open() {
        let doc = document(&tube_snapshot(3));
        let (edges, closed) = doc.get_edge_loop(edge(&doc, 0, 4));
        assert!(!closed);
        assert_eq!(as_set(&edges), as_set(&[edge(&doc, 0, 4), edge(&doc, 4, 8)]));
    }

    #[test]
    fn test_edge_loop_across_grid_stops_at_boundary() {
        let doc = document(&grid_snapshot(3));
        let (edges, closed) = doc.get_edge_loop(edge(&doc, 5, 6));
        assert!(!closed);
        assert_eq!(edges.len(), 3);
        assert_eq!(
            as_set(&edges),
            as_set(&[edge(&doc, 4, 5), edge(&doc, 5, 6), edge(&doc, 6, 7)])
        );
        assert!(is_contiguous(&doc, &edges));
        assert_eq!(doc.get_quadwalk_edge_sequence(edge(&doc, 5, 6)), edges);
    }

    #[test]
    fn test_edge_loop_follows_grid_boundary() {
        let doc = document(&grid_snapshot(3));
        let (edges, closed) = doc.get_edge_loop(edge(&doc, 0, 1));
        assert!(!closed);
        assert_eq!(
            as_set(&edges),
            as_set(&[edge(&doc, 0, 1), edge(&doc, 1, 2), edge(&doc, 2, 3)])
        );
    }

    #[test]
    fn test_edge_loop_on_cube_corner_stops() {
        // every pair of edges at a cube corner shares a face
        let doc = document(&cube_snapshot());
        let e = edge(&doc, 0, 1);
        assert_eq!(doc.get_edge_loop(e), (vec![e], false));
        assert_eq!(doc.get_edge_loop(EdgeId(99)), (Vec::new(), false));
    }

    #[test]
    fn test_face_loop_around_tube_closes() {
        let doc = document(&tube_snapshot(2));
        let (edges, closed) = doc.get_face_loop(edge(&doc, 0, 4));
        assert!(closed);
        assert_eq!(
            as_set(&edges),
            as_set(&[edge(&doc, 0, 4), edge(&doc, 1, 5), edge(&doc, 2, 6), edge(&doc, 3, 7)])
        );
        assert_eq!(edges.len(), 4);
    }

    #[test]
    fn test_face_loop_up_tube_is_open() {
        let doc = document(&tube_snapshot(3));
        let (edges, closed) = doc.get_face_loop(edge(&doc, 4, 5));
        assert!(!closed);
        assert_eq!(edges, vec![edge(&doc, 0, 1), edge(&doc, 4, 5), edge(&doc, 8, 9)]);
    }

    #[test]
    fn test_face_loop_across_grid_row() {
        let doc = document(&grid_snapshot(3));
        let (edges, closed) = doc.get_face_loop(edge(&doc, 0, 4));
        assert!(!closed);
        assert_eq!(
            edges,
            vec![edge(&doc, 0, 4), edge(&doc, 1, 5), edge(&doc, 2, 6), edge(&doc, 3, 7)]
        );
    }

    #[test]
    fn test_face_loop_stops_at_triangle_and_wire() {
        let mut snapshot = MeshSnapshot::from_polygons(
            "tri",
            &[DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::ONE],
            &[vec![0, 1, 2]],
        );
        snapshot.edges.push(SnapshotEdge {
            verts: [2, 3],
            selected: false,
        });
        let doc = document(&snapshot);
        let side = edge(&doc, 0, 1);
        assert_eq!(doc.get_face_loop(side), (vec![side], false));
        assert_eq!(doc.get_face_loop(edge(&doc, 2, 3)), (Vec::new(), false));
    }
}
