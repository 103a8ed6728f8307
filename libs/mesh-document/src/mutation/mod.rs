//! # Mutation Engine
//!
//! Creation, deletion and cleanup of mesh elements on a target document.
//! Positions and normals cross this API in world space and are stored in
//! local space. Every successful mutation bumps the document version.
//!
//! ## Deletion cascade
//!
//! | operation | removes | then, if flagged |
//! |---|---|---|
//! | `delete_faces` | the faces | edges left with no face, then vertices left with no edge |
//! | `delete_edges` | the edges and every face using them | same |
//! | `delete_verts` | the vertices, their edges and faces | same |

use crate::document::{newell_normal, MeshDocument};
use crate::element::{EdgeId, FaceId, VertId};
use crate::error::{MeshDocError, MeshDocResult};
use glam::DVec3;
use mesh_math::{Normal, Plane, Point, Side};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

impl MeshDocument {
    // =========================================================================
    // CREATION
    // =========================================================================

    /// Adds a vertex at a world position with a world normal.
    pub fn new_vert(&mut self, point: Point, normal: Normal) -> VertId {
        let local = self.xform().w2l_point(point);
        let n = self.xform().w2l_normal(normal);
        let v = self.alloc_vert(local.as_dvec3(), n.as_dvec3());
        self.dirty();
        v
    }

    /// Returns the edge joining two vertices, creating it if needed.
    pub fn new_edge(&mut self, verts: [VertId; 2]) -> MeshDocResult<EdgeId> {
        let [a, b] = verts;
        self.try_vert(a)?;
        self.try_vert(b)?;
        if a == b {
            return Err(MeshDocError::DegenerateEdge(a));
        }
        if let Some(e) = self.find_edge(a, b) {
            return Ok(e);
        }
        let e = self.alloc_edge(a, b);
        self.dirty();
        Ok(e)
    }

    /// Adds a face over a loop of at least three distinct vertices, reusing
    /// existing edges. The winding is flipped if it disagrees with the
    /// vertex normals.
    ///
    /// # Example
    ///
    /// ```rust
    /// use glam::DVec3;
    /// use mesh_document::{HostState, MeshHost, MeshSnapshot, TargetDocument};
    /// use mesh_math::{Normal, Plane, Point, Side};
    ///
    /// struct Host;
    /// impl MeshHost for Host {
    ///     fn write_mesh(&mut self, _: &MeshSnapshot) {}
    ///     fn host_state(&self) -> HostState { HostState::default() }
    ///     fn restore_state(&mut self, _: &HostState) {}
    /// }
    ///
    /// let empty = MeshSnapshot::from_polygons("target", &[], &[]);
    /// let mut target = TargetDocument::open(&empty, &Host).unwrap();
    /// let up = Normal::new(0.0, 0.0, 1.0);
    /// let a = target.new_vert(Point::new(0.0, 0.0, 0.0), up);
    /// let b = target.new_vert(Point::new(1.0, 0.0, 0.0), up);
    /// let c = target.new_vert(Point::new(0.0, 1.0, 0.0), up);
    /// let f = target.new_face(&[a, b, c]).unwrap();
    /// assert_eq!(target.face(f).unwrap().edges().len(), 3);
    /// assert!(target.new_face(&[a, b]).is_err());
    /// ```
    pub fn new_face(&mut self, verts: &[VertId]) -> MeshDocResult<FaceId> {
        Self::validate_loop(verts)?;
        for &v in verts {
            self.try_vert(v)?;
        }
        if let Some(existing) = self.find_face(verts) {
            return Err(MeshDocError::FaceExists(existing));
        }
        let f = self.alloc_face(verts);
        self.update_face_normal(f)?;
        Ok(f)
    }

    /// Face whose vertex set equals `verts`.
    fn find_face(&self, verts: &[VertId]) -> Option<FaceId> {
        let wanted: BTreeSet<VertId> = verts.iter().copied().collect();
        self.vert_faces(*verts.first()?).into_iter().find(|&f| {
            self.face(f)
                .is_some_and(|face| face.verts().iter().copied().collect::<BTreeSet<_>>() == wanted)
        })
    }

    // =========================================================================
    // NORMALS
    // =========================================================================

    /// Recomputes a face normal, reversing the winding first if the Newell
    /// normal points against the summed vertex normals.
    pub fn update_face_normal(&mut self, f: FaceId) -> MeshDocResult<()> {
        let face = self.try_face(f)?;
        let newell = newell_normal(&self.loop_positions(face.verts()));
        let vertex_sum: DVec3 = face
            .verts()
            .iter()
            .filter_map(|&v| self.vert(v))
            .map(|v| v.normal)
            .sum();
        let flip = newell.dot(vertex_sum) < 0.0;

        if let Some(face) = self.face_mut(f) {
            if flip {
                face.reverse();
            }
            let n = if flip { -newell } else { newell };
            face.normal = n.try_normalize().unwrap_or(DVec3::ZERO);
        }
        self.dirty();
        Ok(())
    }

    /// Re-orients every face around the given vertices.
    pub fn update_verts_faces(&mut self, verts: &[VertId]) -> MeshDocResult<()> {
        let mut faces = BTreeSet::new();
        for &v in verts {
            self.try_vert(v)?;
            faces.extend(self.vert_faces(v));
        }
        for f in faces {
            self.update_face_normal(f)?;
        }
        Ok(())
    }

    /// Recomputes stored normals around a vertex without touching winding.
    fn refresh_face_normals(&mut self, v: VertId) {
        for f in self.vert_faces(v) {
            let Some(face) = self.face(f) else {
                continue;
            };
            let n = newell_normal(&self.loop_positions(face.verts()));
            if let Some(face) = self.face_mut(f) {
                face.normal = n.try_normalize().unwrap_or(DVec3::ZERO);
            }
        }
    }

    // =========================================================================
    // DELETION
    // =========================================================================

    fn delete_orphans(
        &mut self,
        edges: BTreeSet<EdgeId>,
        mut verts: BTreeSet<VertId>,
        del_empty_edges: bool,
        del_empty_verts: bool,
    ) {
        if del_empty_edges {
            for e in edges {
                if self.edge(e).is_some_and(|edge| edge.faces().is_empty()) {
                    if let Some(edge) = self.remove_edge(e) {
                        verts.extend(edge.verts());
                    }
                }
            }
        }
        if del_empty_verts {
            for v in verts {
                if self.vert(v).is_some_and(|vert| vert.edges().is_empty()) {
                    self.remove_vert(v);
                }
            }
        }
    }

    /// Edges and vertices of the faces around an edge, which lose a face
    /// when the edge goes.
    fn faces_boundary(&self, faces: &[FaceId], edges: &mut BTreeSet<EdgeId>, verts: &mut BTreeSet<VertId>) {
        for face in faces.iter().filter_map(|&f| self.face(f)) {
            edges.extend(face.edges().iter().copied());
            verts.extend(face.verts().iter().copied());
        }
    }

    /// Deletes faces, optionally followed by the edges and vertices they
    /// leave unused. Dead handles are skipped.
    pub fn delete_faces(&mut self, faces: &[FaceId], del_empty_edges: bool, del_empty_verts: bool) {
        let mut edges = BTreeSet::new();
        let mut verts = BTreeSet::new();
        for &f in faces {
            if let Some(face) = self.remove_face(f) {
                edges.extend(face.edges().iter().copied());
                verts.extend(face.verts().iter().copied());
            }
        }
        self.delete_orphans(edges, verts, del_empty_edges, del_empty_verts);
        debug!(faces = faces.len(), "Deleted faces");
        self.dirty();
    }

    /// Deletes edges and the faces using them.
    pub fn delete_edges(&mut self, edges: &[EdgeId], del_empty_edges: bool, del_empty_verts: bool) {
        let mut touched_edges = BTreeSet::new();
        let mut verts = BTreeSet::new();
        for &e in edges {
            let Some(edge) = self.edge(e) else {
                continue;
            };
            let faces = edge.faces().to_vec();
            self.faces_boundary(&faces, &mut touched_edges, &mut verts);
            if let Some(edge) = self.remove_edge(e) {
                verts.extend(edge.verts());
            }
        }
        self.delete_orphans(touched_edges, verts, del_empty_edges, del_empty_verts);
        debug!(edges = edges.len(), "Deleted edges");
        self.dirty();
    }

    /// Deletes vertices with their edges and faces.
    pub fn delete_verts(&mut self, verts: &[VertId], del_empty_edges: bool, del_empty_verts: bool) {
        let mut touched_edges = BTreeSet::new();
        let mut touched_verts = BTreeSet::new();
        for &v in verts {
            if self.vert(v).is_none() {
                continue;
            }
            let faces = self.vert_faces(v);
            self.faces_boundary(&faces, &mut touched_edges, &mut touched_verts);
            touched_verts.extend(self.vert_neighbors(v));
            self.remove_vert(v);
        }
        self.delete_orphans(touched_edges, touched_verts, del_empty_edges, del_empty_verts);
        debug!(verts = verts.len(), "Deleted vertices");
        self.dirty();
    }

    /// Deletes the selected faces, then the selected edges, then the
    /// selected vertices.
    pub fn delete_selection(&mut self, del_empty_edges: bool, del_empty_verts: bool) {
        let faces = self.get_selected_faces();
        self.delete_faces(&faces, del_empty_edges, del_empty_verts);
        let edges = self.get_selected_edges();
        self.delete_edges(&edges, del_empty_edges, del_empty_verts);
        let verts = self.get_selected_verts();
        self.delete_verts(&verts, del_empty_edges, del_empty_verts);
    }

    // =========================================================================
    // CLEANUP
    // =========================================================================

    /// Merges edges around `v` that join the same pair of vertices.
    ///
    /// Selection flags of a duplicate pair are OR-ed. A side without faces
    /// is deleted. Otherwise a side with exactly one face (the second edge
    /// when both qualify) is deleted and its face rebuilt over the same
    /// loop on the surviving edge. Pairs where both sides carry more than
    /// one face are logged and left alone.
    ///
    /// Returns the rebuilt faces as `old → new`.
    pub fn clean_duplicate_edges(&mut self, v: VertId) -> MeshDocResult<HashMap<FaceId, FaceId>> {
        let mut by_other: BTreeMap<VertId, Vec<EdgeId>> = BTreeMap::new();
        for &e in self.try_vert(v)?.edges() {
            if let Some(other) = self.edge(e).and_then(|edge| edge.other_vert(v)) {
                by_other.entry(other).or_default().push(e);
            }
        }

        let mut rebuilt = HashMap::new();
        for (other, group) in by_other.into_iter().filter(|(_, g)| g.len() > 1) {
            let mut keep = group[0];
            for &dup in &group[1..] {
                let (Some(kept), Some(duplicate)) = (self.edge(keep), self.edge(dup)) else {
                    continue;
                };
                let selected = kept.selected || duplicate.selected;
                let (kept_faces, dup_faces) = (kept.faces().to_vec(), duplicate.faces().to_vec());
                for e in [keep, dup] {
                    if let Some(edge) = self.edge_mut(e) {
                        edge.selected = selected;
                    }
                }

                match (kept_faces.len(), dup_faces.len()) {
                    (_, 0) => {
                        self.remove_edge(dup);
                    }
                    (0, _) => {
                        self.remove_edge(keep);
                        keep = dup;
                    }
                    (_, 1) => {
                        if let Some((old, new)) = self.drop_edge_and_rebuild(dup, dup_faces[0]) {
                            rebuilt.insert(old, new);
                        }
                    }
                    (1, _) => {
                        if let Some((old, new)) = self.drop_edge_and_rebuild(keep, kept_faces[0]) {
                            rebuilt.insert(old, new);
                        }
                        keep = dup;
                    }
                    (k, d) => {
                        warn!(
                            vert = %v,
                            other = %other,
                            kept_faces = k,
                            duplicate_faces = d,
                            "Unhandled duplicate edge configuration"
                        );
                    }
                }
            }
        }
        self.dirty();
        Ok(rebuilt)
    }

    /// Removes `edge` and recreates `face` over the same vertex loop,
    /// keeping its normal, smoothing and selection.
    fn drop_edge_and_rebuild(&mut self, edge: EdgeId, face: FaceId) -> Option<(FaceId, FaceId)> {
        let old = self.face(face)?;
        let (verts, normal, smooth, selected) = (old.verts().to_vec(), old.normal, old.smooth, old.selected);
        self.remove_edge(edge);
        let new = self.alloc_face(&verts);
        if let Some(rebuilt) = self.face_mut(new) {
            rebuilt.normal = normal;
            rebuilt.smooth = smooth;
            rebuilt.selected = selected;
        }
        Some((face, new))
    }

    // =========================================================================
    // GEOMETRY EDITS
    // =========================================================================

    /// Moves a vertex to a world position.
    pub fn set_vert_position(&mut self, v: VertId, point: Point) -> MeshDocResult<()> {
        let local = self.xform().w2l_point(point);
        let vert = self.vert_mut(v).ok_or(MeshDocError::InvalidVert(v))?;
        vert.position = local.as_dvec3();
        self.refresh_face_normals(v);
        self.dirty();
        Ok(())
    }

    /// Sets a vertex normal from a world normal.
    pub fn set_vert_normal(&mut self, v: VertId, normal: Normal) -> MeshDocResult<()> {
        let local = self.xform().w2l_normal(normal);
        let vert = self.vert_mut(v).ok_or(MeshDocError::InvalidVert(v))?;
        vert.normal = local.as_dvec3();
        self.dirty();
        Ok(())
    }

    /// Moves every vertex onto the surface returned by `nearest` for its
    /// world position, taking the surface normal too. Vertices for which
    /// `nearest` returns `None` stay put. Returns the number moved.
    pub fn snap_all_verts(&mut self, nearest: impl Fn(Point) -> Option<(Point, Normal)>) -> usize {
        let targets: Vec<(VertId, Point, Normal)> = self
            .verts()
            .filter_map(|(v, vert)| {
                let (p, n) = nearest(self.xform().l2w_point(vert.position()))?;
                Some((v, p, n))
            })
            .collect();
        let moved = targets.len();
        for (v, p, n) in targets {
            let (local_p, local_n) = (self.xform().w2l_point(p), self.xform().w2l_normal(n));
            if let Some(vert) = self.vert_mut(v) {
                vert.position = local_p.as_dvec3();
                vert.normal = local_n.as_dvec3();
            }
        }
        let verts: Vec<VertId> = self.verts().map(|(v, _)| v).collect();
        for v in verts {
            self.refresh_face_normals(v);
        }
        debug!(moved, "Snapped vertices");
        self.dirty();
        moved
    }

    // =========================================================================
    // SPLITTING
    // =========================================================================

    /// Inserts a vertex at a world position on edge `e`. The edge becomes
    /// two edges and the vertex joins the loop of every face around it.
    pub fn split_edge(&mut self, e: EdgeId, point: Point) -> MeshDocResult<VertId> {
        let local = self.xform().w2l_point(point);
        let v = self.split_edge_local(e, local.as_dvec3())?;
        self.dirty();
        Ok(v)
    }

    fn split_edge_local(&mut self, e: EdgeId, position: DVec3) -> MeshDocResult<VertId> {
        let edge = self.try_edge(e)?;
        let [a, b] = edge.verts();
        let (edge_selected, faces) = (edge.selected, edge.faces().to_vec());
        let (va, vb) = (self.try_vert(a)?, self.try_vert(b)?);
        let normal = (va.normal + vb.normal).try_normalize().unwrap_or(DVec3::ZERO);
        let vert_selected = va.selected && vb.selected;
        let saved: Vec<(Vec<VertId>, DVec3, bool, bool)> = faces
            .iter()
            .filter_map(|&f| self.face(f))
            .map(|face| (face.verts().to_vec(), face.normal, face.smooth, face.selected))
            .collect();

        let m = self.alloc_vert(position, normal);
        if let Some(vert) = self.vert_mut(m) {
            vert.selected = vert_selected;
        }
        self.remove_edge(e);
        for (from, to) in [(a, m), (m, b)] {
            let half = self.alloc_edge(from, to);
            if let Some(edge) = self.edge_mut(half) {
                edge.selected = edge_selected;
            }
        }
        for (verts, normal, smooth, selected) in saved {
            let f = self.alloc_face(&insert_between(&verts, a, b, m));
            if let Some(face) = self.face_mut(f) {
                face.normal = normal;
                face.smooth = smooth;
                face.selected = selected;
            }
        }
        Ok(m)
    }

    /// Divides a face along a new edge between two of its non-adjacent
    /// vertices. Returns that edge.
    fn split_face_local(&mut self, f: FaceId, a: VertId, b: VertId) -> Option<EdgeId> {
        let face = self.face(f)?;
        let verts = face.verts();
        let n = verts.len();
        let ia = verts.iter().position(|&v| v == a)?;
        let ib = verts.iter().position(|&v| v == b)?;
        let (lo, hi) = (ia.min(ib), ia.max(ib));
        if hi - lo < 2 || lo + n - hi < 2 {
            return None;
        }
        let halves = [
            verts[lo..=hi].to_vec(),
            verts[hi..].iter().chain(&verts[..=lo]).copied().collect::<Vec<_>>(),
        ];
        let (smooth, selected) = (face.smooth, face.selected);

        self.remove_face(f);
        for half in halves {
            let new = self.alloc_face(&half);
            if let Some(face) = self.face_mut(new) {
                face.smooth = smooth;
                face.selected = selected;
            }
        }
        self.find_edge(a, b)
    }

    /// Bisects the mesh with a world plane. Edges crossing the plane are
    /// split at the crossing, then every face with vertices strictly on
    /// both sides is divided between its two on-plane vertices. Nothing is
    /// removed on either side.
    ///
    /// Faces meeting the plane at more than two vertices are left whole.
    /// Returns the edges added across divided faces.
    pub fn plane_split(&mut self, plane: &Plane) -> Vec<EdgeId> {
        let local = self.xform().w2l_plane(plane);
        let crossings: Vec<(EdgeId, Point)> = self
            .edges()
            .filter_map(|(e, edge)| {
                let [a, b] = edge.verts();
                let ends = (self.vert(a)?.position(), self.vert(b)?.position());
                match (local.classify(ends.0), local.classify(ends.1)) {
                    (Side::Above, Side::Below) | (Side::Below, Side::Above) => {
                        let (p, _) = local.edge_intersection(ends)?;
                        Some((e, p))
                    }
                    _ => None,
                }
            })
            .collect();
        for &(e, p) in &crossings {
            if let Err(err) = self.split_edge_local(e, p.as_dvec3()) {
                warn!(edge = %e, %err, "Plane split skipped an edge");
            }
        }

        let faces: Vec<FaceId> = self.faces().map(|(f, _)| f).collect();
        let mut cut = Vec::new();
        for f in faces {
            let Some(face) = self.face(f) else {
                continue;
            };
            let mut on = Vec::new();
            let (mut above, mut below) = (false, false);
            for &v in face.verts() {
                let Some(vert) = self.vert(v) else {
                    continue;
                };
                match local.classify(vert.position()) {
                    Side::On => on.push(v),
                    Side::Above => above = true,
                    Side::Below => below = true,
                }
            }
            if !(above && below) {
                continue;
            }
            match *on.as_slice() {
                [a, b] => cut.extend(self.split_face_local(f, a, b)),
                _ => debug!(face = %f, on_plane = on.len(), "Plane split left a face whole"),
            }
        }

        debug!(split_edges = crossings.len(), cut_edges = cut.len(), "Split mesh along plane");
        self.dirty();
        cut
    }
}

/// Face loop with `m` inserted wherever `a` and `b` are consecutive.
fn insert_between(verts: &[VertId], a: VertId, b: VertId, m: VertId) -> Vec<VertId> {
    let n = verts.len();
    let mut out = Vec::with_capacity(n + 1);
    for (i, &v) in verts.iter().enumerate() {
        out.push(v);
        let next = verts[(i + 1) % n];
        if (v == a && next == b) || (v == b && next == a) {
            out.push(m);
        }
    }
    out
}
