//! # Mesh Document
//!
//! Owns vertex/edge/face storage, selection flags, the symmetry set, the
//! local↔world transform and the version counter.
//!
//! ## Storage
//!
//! Elements live in slot arrays (`Vec<Option<T>>`). Deleting an element
//! tombstones its slot, so the handles of surviving elements never change.
//!
//! ## Versioning
//!
//! Every topology, geometry or selection mutation draws a fresh version from
//! a process-wide counter. The spatial caches compare their stamp with the
//! current version and rebuild on mismatch.
//!
//! ## Construction
//!
//! Documents are only produced by [`SourceDocument::build`] and
//! [`TargetDocument::open`].

pub mod source;
pub mod target;

use crate::element::{Edge, EdgeId, Face, FaceId, MeshElement, VertId, Vertex};
use crate::error::{MeshDocError, MeshDocResult};
use crate::host::{Axis, MeshSnapshot, SnapshotEdge, SnapshotFace, SnapshotVertex};
use crate::spatial::{Bvh, BvhTriangle, PointIndex, RebuildCounts, VersionedCache};
use config::constants::DocumentConfig;
use glam::DVec3;
use mesh_math::{BBox, Frame, Normal, Point, XForm};
use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

pub use source::{content_hash, CacheStats, SourceCache, SourceDocument};
pub use target::TargetDocument;

static VERSION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Draws a version no other document has seen.
fn next_version() -> u64 {
    VERSION_COUNTER.fetch_add(1, Ordering::Relaxed) + 1
}

/// Unnormalized Newell normal of a polygon; its length is twice the area.
pub(crate) fn newell_normal(points: &[DVec3]) -> DVec3 {
    let n = points.len();
    (0..n).fold(DVec3::ZERO, |acc, i| {
        let (a, b) = (points[i], points[(i + 1) % n]);
        acc + DVec3::new(
            (a.y - b.y) * (a.z + b.z),
            (a.z - b.z) * (a.x + b.x),
            (a.x - b.x) * (a.y + b.y),
        )
    })
}

#[derive(Debug, Default)]
struct SpatialCaches {
    bbox: VersionedCache<Option<BBox>>,
    bvh: VersionedCache<Bvh>,
    points: VersionedCache<PointIndex>,
}

/// Editable polygon mesh with adjacency, selection and spatial caches.
#[derive(Debug)]
pub struct MeshDocument {
    name: String,
    pub(crate) verts: Vec<Option<Vertex>>,
    pub(crate) edges: Vec<Option<Edge>>,
    pub(crate) faces: Vec<Option<Face>>,
    xform: XForm,
    pub(crate) symmetry: BTreeSet<Axis>,
    version: u64,
    config: DocumentConfig,
    selection_center: Cell<Point>,
    caches: SpatialCaches,
}

impl MeshDocument {
    // =========================================================================
    // CONSTRUCTION
    // =========================================================================

    /// Builds a document from a host snapshot.
    ///
    /// Faces referencing vertex pairs without an explicit edge get one.
    /// Vertices with a zero normal receive the area-weighted average of
    /// their faces' normals.
    pub(crate) fn from_snapshot(snapshot: &MeshSnapshot, config: DocumentConfig) -> MeshDocResult<Self> {
        let xform = XForm::try_new(snapshot.matrix_world).ok_or(MeshDocError::SingularTransform)?;
        let mut doc = Self {
            name: snapshot.name.clone(),
            verts: Vec::with_capacity(snapshot.vertices.len()),
            edges: Vec::with_capacity(snapshot.edges.len()),
            faces: Vec::with_capacity(snapshot.faces.len()),
            xform,
            symmetry: BTreeSet::new(),
            version: next_version(),
            config,
            selection_center: Cell::new(Point::ORIGIN),
            caches: SpatialCaches::default(),
        };

        let n = snapshot.vertices.len();
        if u32::try_from(n).is_err() {
            return Err(MeshDocError::invalid_snapshot(format!("{n} vertices exceed handle range")));
        }
        let vid = |i: usize| VertId(i as u32);

        for sv in &snapshot.vertices {
            let v = doc.alloc_vert(sv.position, sv.normal);
            if let Some(vert) = doc.vert_mut(v) {
                vert.selected = sv.selected;
            }
        }

        for (i, se) in snapshot.edges.iter().enumerate() {
            let [a, b] = se.verts;
            if a >= n || b >= n {
                return Err(MeshDocError::invalid_snapshot(format!(
                    "edge {i} references vertex outside 0..{n}"
                )));
            }
            if a == b {
                return Err(MeshDocError::invalid_snapshot(format!(
                    "edge {i} joins vertex {a} to itself"
                )));
            }
            let e = doc.alloc_edge(vid(a), vid(b));
            if let Some(edge) = doc.edge_mut(e) {
                edge.selected = se.selected;
            }
        }

        for (i, sf) in snapshot.faces.iter().enumerate() {
            if let Some(&bad) = sf.verts.iter().find(|&&v| v >= n) {
                return Err(MeshDocError::invalid_snapshot(format!(
                    "face {i} references vertex {bad} outside 0..{n}"
                )));
            }
            let verts: Vec<VertId> = sf.verts.iter().map(|&v| vid(v)).collect();
            Self::validate_loop(&verts)
                .map_err(|err| MeshDocError::invalid_snapshot(format!("face {i}: {err}")))?;
            let f = doc.alloc_face(&verts);
            if let Some(face) = doc.face_mut(f) {
                face.selected = sf.selected;
                face.smooth = sf.smooth;
            }
        }

        doc.fill_missing_normals();

        debug!(
            name = %doc.name,
            verts = doc.verts.len(),
            edges = doc.edges.len(),
            faces = doc.faces.len(),
            "Built mesh document"
        );
        Ok(doc)
    }

    /// Checks a face loop for length and repeated vertices.
    pub(crate) fn validate_loop(verts: &[VertId]) -> MeshDocResult<()> {
        if verts.len() < 3 {
            return Err(MeshDocError::invalid_loop(format!(
                "{} vertices, need at least 3",
                verts.len()
            )));
        }
        let distinct: BTreeSet<VertId> = verts.iter().copied().collect();
        if distinct.len() != verts.len() {
            return Err(MeshDocError::invalid_loop("vertex repeated in loop"));
        }
        Ok(())
    }

    fn fill_missing_normals(&mut self) {
        let mut sums: HashMap<VertId, DVec3> = HashMap::new();
        for face in self.faces.iter().flatten() {
            let weighted = newell_normal(&self.loop_positions(&face.verts));
            for &v in &face.verts {
                *sums.entry(v).or_insert(DVec3::ZERO) += weighted;
            }
        }
        for (i, slot) in self.verts.iter_mut().enumerate() {
            if let Some(vert) = slot {
                if vert.normal.length_squared() == 0.0 {
                    let sum = sums.get(&VertId(i as u32)).copied().unwrap_or(DVec3::ZERO);
                    vert.normal = sum.try_normalize().unwrap_or(DVec3::ZERO);
                }
            }
        }
    }

    // =========================================================================
    // RAW STORAGE
    // =========================================================================

    pub(crate) fn alloc_vert(&mut self, position: DVec3, normal: DVec3) -> VertId {
        let id = VertId(self.verts.len() as u32);
        self.verts.push(Some(Vertex::new(position, normal)));
        id
    }

    /// Adds an edge between two live, distinct vertices.
    pub(crate) fn alloc_edge(&mut self, a: VertId, b: VertId) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Some(Edge::new([a, b])));
        for v in [a, b] {
            if let Some(vert) = self.vert_mut(v) {
                vert.edges.push(id);
            }
        }
        id
    }

    /// Adds a face over a validated loop, reusing existing edges.
    pub(crate) fn alloc_face(&mut self, verts: &[VertId]) -> FaceId {
        let id = FaceId(self.faces.len() as u32);
        let n = verts.len();
        let mut edges = Vec::with_capacity(n);
        for i in 0..n {
            let (a, b) = (verts[i], verts[(i + 1) % n]);
            let e = match self.find_edge(a, b) {
                Some(e) => e,
                None => self.alloc_edge(a, b),
            };
            if let Some(edge) = self.edge_mut(e) {
                edge.faces.push(id);
            }
            edges.push(e);
        }
        let normal = newell_normal(&self.loop_positions(verts))
            .try_normalize()
            .unwrap_or(DVec3::ZERO);
        self.faces.push(Some(Face {
            verts: verts.to_vec(),
            edges,
            normal,
            smooth: false,
            selected: false,
        }));
        id
    }

    /// Removes a face, detaching it from its edges.
    pub(crate) fn remove_face(&mut self, f: FaceId) -> Option<Face> {
        let face = self.faces.get_mut(f.index())?.take()?;
        for &e in &face.edges {
            if let Some(edge) = self.edge_mut(e) {
                edge.faces.retain(|&x| x != f);
            }
        }
        Some(face)
    }

    /// Removes an edge and every face using it.
    pub(crate) fn remove_edge(&mut self, e: EdgeId) -> Option<Edge> {
        let faces = self.edge(e)?.faces.clone();
        for f in faces {
            self.remove_face(f);
        }
        let edge = self.edges.get_mut(e.index())?.take()?;
        for v in edge.verts {
            if let Some(vert) = self.vert_mut(v) {
                vert.edges.retain(|&x| x != e);
            }
        }
        Some(edge)
    }

    /// Removes a vertex with its edges and faces.
    pub(crate) fn remove_vert(&mut self, v: VertId) -> Option<Vertex> {
        let edges = self.vert(v)?.edges.clone();
        for e in edges {
            self.remove_edge(e);
        }
        self.verts.get_mut(v.index())?.take()
    }

    pub(crate) fn vert_mut(&mut self, v: VertId) -> Option<&mut Vertex> {
        self.verts.get_mut(v.index()).and_then(Option::as_mut)
    }

    pub(crate) fn edge_mut(&mut self, e: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(e.index()).and_then(Option::as_mut)
    }

    pub(crate) fn face_mut(&mut self, f: FaceId) -> Option<&mut Face> {
        self.faces.get_mut(f.index()).and_then(Option::as_mut)
    }

    pub(crate) fn loop_positions(&self, verts: &[VertId]) -> Vec<DVec3> {
        verts
            .iter()
            .filter_map(|&v| self.vert(v).map(|vert| vert.position))
            .collect()
    }

    /// Fan-triangulates every face with more than three sides.
    pub(crate) fn triangulate(&mut self) {
        let polygons: Vec<FaceId> = self
            .faces()
            .filter(|(_, face)| face.len() > 3)
            .map(|(id, _)| id)
            .collect();
        debug!(count = polygons.len(), "Triangulating polygons");
        for f in polygons {
            let Some(face) = self.remove_face(f) else {
                continue;
            };
            for i in 1..face.verts.len() - 1 {
                let tri = self.alloc_face(&[face.verts[0], face.verts[i], face.verts[i + 1]]);
                if let Some(t) = self.face_mut(tri) {
                    t.smooth = face.smooth;
                    t.selected = face.selected;
                }
            }
        }
        self.dirty();
    }

    // =========================================================================
    // VERSION
    // =========================================================================

    /// Marks the document changed, invalidating every spatial cache.
    pub fn dirty(&mut self) {
        self.version = next_version();
    }

    /// Current version stamp.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    // =========================================================================
    // READ ACCESS
    // =========================================================================

    /// Mesh name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local-to-world transform.
    pub fn xform(&self) -> &XForm {
        &self.xform
    }

    /// World frame of the local axes, or `None` if the transform
    /// collapses an axis.
    pub fn get_frame(&self) -> Option<Frame> {
        self.xform.to_frame()
    }

    /// Query tunables.
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Enabled mirror axes.
    pub fn symmetry(&self) -> &BTreeSet<Axis> {
        &self.symmetry
    }

    /// Live vertex.
    pub fn vert(&self, v: VertId) -> Option<&Vertex> {
        self.verts.get(v.index()).and_then(Option::as_ref)
    }

    /// Live edge.
    pub fn edge(&self, e: EdgeId) -> Option<&Edge> {
        self.edges.get(e.index()).and_then(Option::as_ref)
    }

    /// Live face.
    pub fn face(&self, f: FaceId) -> Option<&Face> {
        self.faces.get(f.index()).and_then(Option::as_ref)
    }

    pub(crate) fn try_vert(&self, v: VertId) -> MeshDocResult<&Vertex> {
        self.vert(v).ok_or(MeshDocError::InvalidVert(v))
    }

    pub(crate) fn try_edge(&self, e: EdgeId) -> MeshDocResult<&Edge> {
        self.edge(e).ok_or(MeshDocError::InvalidEdge(e))
    }

    pub(crate) fn try_face(&self, f: FaceId) -> MeshDocResult<&Face> {
        self.face(f).ok_or(MeshDocError::InvalidFace(f))
    }

    /// Live vertices in handle order.
    pub fn verts(&self) -> impl Iterator<Item = (VertId, &Vertex)> + '_ {
        self.verts
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (VertId(i as u32), v)))
    }

    /// Live edges in handle order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|e| (EdgeId(i as u32), e)))
    }

    /// Live faces in handle order.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|f| (FaceId(i as u32), f)))
    }

    /// Number of live vertices.
    pub fn vert_count(&self) -> usize {
        self.verts.iter().flatten().count()
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().flatten().count()
    }

    /// Number of live faces.
    pub fn face_count(&self) -> usize {
        self.faces.iter().flatten().count()
    }

    /// Edge joining `a` and `b`, if any. With duplicates, the first found.
    pub fn find_edge(&self, a: VertId, b: VertId) -> Option<EdgeId> {
        self.vert(a)?
            .edges
            .iter()
            .copied()
            .find(|&e| self.edge(e).is_some_and(|edge| edge.joins(a, b)))
    }

    /// Faces around a vertex, each once, in edge order.
    pub fn vert_faces(&self, v: VertId) -> Vec<FaceId> {
        let mut seen = BTreeSet::new();
        let Some(vert) = self.vert(v) else {
            return Vec::new();
        };
        vert.edges
            .iter()
            .filter_map(|&e| self.edge(e))
            .flat_map(|edge| edge.faces.iter().copied())
            .filter(|&f| seen.insert(f))
            .collect()
    }

    /// Vertices sharing an edge with `v`.
    pub fn vert_neighbors(&self, v: VertId) -> Vec<VertId> {
        let Some(vert) = self.vert(v) else {
            return Vec::new();
        };
        vert.edges
            .iter()
            .filter_map(|&e| self.edge(e)?.other_vert(v))
            .collect()
    }

    /// World position of a vertex.
    pub fn vert_world_position(&self, v: VertId) -> Option<Point> {
        self.vert(v).map(|vert| self.xform.l2w_point(vert.position()))
    }

    /// World normal of a vertex.
    pub fn vert_world_normal(&self, v: VertId) -> Option<Normal> {
        self.vert(v).map(|vert| self.xform.l2w_normal(vert.normal()))
    }

    // =========================================================================
    // ELEMENT CAPABILITIES
    // =========================================================================

    /// True if the element is live.
    pub fn is_valid(&self, elem: MeshElement) -> bool {
        match elem {
            MeshElement::Vert(v) => self.vert(v).is_some(),
            MeshElement::Edge(e) => self.edge(e).is_some(),
            MeshElement::Face(f) => self.face(f).is_some(),
        }
    }

    /// Selection flag; `false` for dead elements.
    pub fn is_selected(&self, elem: MeshElement) -> bool {
        match elem {
            MeshElement::Vert(v) => self.vert(v).is_some_and(Vertex::is_selected),
            MeshElement::Edge(e) => self.edge(e).is_some_and(Edge::is_selected),
            MeshElement::Face(f) => self.face(f).is_some_and(Face::is_selected),
        }
    }

    /// Constituent vertices.
    pub fn verts_of(&self, elem: MeshElement) -> Vec<VertId> {
        match elem {
            MeshElement::Vert(v) => self.vert(v).map(|_| vec![v]).unwrap_or_default(),
            MeshElement::Edge(e) => self.edge(e).map(|edge| edge.verts.to_vec()).unwrap_or_default(),
            MeshElement::Face(f) => self.face(f).map(|face| face.verts.clone()).unwrap_or_default(),
        }
    }

    /// Faces touching the element; a face links only itself.
    pub fn linked_faces(&self, elem: MeshElement) -> Vec<FaceId> {
        match elem {
            MeshElement::Vert(v) => self.vert_faces(v),
            MeshElement::Edge(e) => self.edge(e).map(|edge| edge.faces.clone()).unwrap_or_default(),
            MeshElement::Face(f) => self.face(f).map(|_| vec![f]).unwrap_or_default(),
        }
    }

    // =========================================================================
    // SPATIAL CACHES
    // =========================================================================

    /// Local bounding box of the vertices; `None` for an empty mesh.
    pub fn get_bbox(&self) -> Option<BBox> {
        *self.caches.bbox.get(self.version, || {
            debug!(version = self.version, "Rebuilding bounding box");
            BBox::from_points(self.verts().map(|(_, v)| v.position()))
        })
    }

    /// BVH over the fan-triangulated faces.
    pub fn get_bvh(&self) -> Rc<Bvh> {
        self.caches.bvh.get(self.version, || {
            let triangles: Vec<BvhTriangle> = self
                .faces()
                .flat_map(|(id, face)| {
                    let corners = self.loop_positions(&face.verts);
                    let normal = face.normal;
                    (1..corners.len().saturating_sub(1)).map(move |i| BvhTriangle {
                        face: id,
                        corners: [corners[0], corners[i], corners[i + 1]],
                        normal,
                    })
                })
                .collect();
            debug!(version = self.version, triangles = triangles.len(), "Rebuilding BVH");
            Bvh::build(triangles, self.config.bvh_max_leaf_size)
        })
    }

    /// kd-tree over local vertex positions.
    pub fn get_point_index(&self) -> Rc<PointIndex> {
        self.caches.points.get(self.version, || {
            debug!(version = self.version, "Rebuilding point index");
            PointIndex::build(self.verts().map(|(id, v)| (id, v.position())))
        })
    }

    /// How often each spatial cache has been rebuilt.
    pub fn rebuild_counts(&self) -> RebuildCounts {
        RebuildCounts {
            bbox: self.caches.bbox.rebuild_count(),
            bvh: self.caches.bvh.rebuild_count(),
            point_index: self.caches.points.rebuild_count(),
        }
    }

    // =========================================================================
    // SELECTION CENTER
    // =========================================================================

    /// World-space average of the selected vertices. With nothing selected,
    /// the last non-empty center is returned (origin initially).
    pub fn selection_center(&self) -> Point {
        let selected: Vec<Point> = self
            .verts()
            .filter(|(_, v)| v.selected)
            .map(|(_, v)| v.position())
            .collect();
        if !selected.is_empty() {
            self.selection_center.set(Point::average(selected));
        }
        self.xform.l2w_point(self.selection_center.get())
    }

    // =========================================================================
    // SNAPSHOT
    // =========================================================================

    /// Compacted host snapshot: live elements renumbered in handle order.
    pub fn to_snapshot(&self) -> MeshSnapshot {
        let vert_index: HashMap<VertId, usize> = self
            .verts()
            .enumerate()
            .map(|(i, (id, _))| (id, i))
            .collect();
        let remap = |v: &VertId| vert_index.get(v).copied().unwrap_or(0);

        MeshSnapshot {
            name: self.name.clone(),
            vertices: self
                .verts()
                .map(|(_, v)| SnapshotVertex {
                    position: v.position,
                    normal: v.normal,
                    selected: v.selected,
                })
                .collect(),
            edges: self
                .edges()
                .map(|(_, e)| SnapshotEdge {
                    verts: [remap(&e.verts[0]), remap(&e.verts[1])],
                    selected: e.selected,
                })
                .collect(),
            faces: self
                .faces()
                .map(|(_, f)| SnapshotFace {
                    verts: f.verts.iter().map(remap).collect(),
                    selected: f.selected,
                    smooth: f.smooth,
                })
                .collect(),
            matrix_world: self.xform.matrix(),
            mirror_axes: self.symmetry.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests;
