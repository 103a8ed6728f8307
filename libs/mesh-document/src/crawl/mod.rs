//! # Contour Crawl
//!
//! Extracts ordered cross-section contours of the mesh against a plane by
//! walking face to face across the edges the plane cuts.
//!
//! ## Algorithm
//!
//! From a seed face, one directional walk is started through each of its
//! crossing edges. A walk leaves the current face through a crossing edge
//! other than the one it entered by, preferring, in order:
//!
//! 1. an edge back into the seed (the contour is closed)
//! 2. an edge into a face no walk has visited yet
//! 3. a boundary edge (the contour ends there)
//!
//! and stops when none applies. Walks share one visited set, so no face is
//! entered twice. If no walk closes, the two longest are joined into one open
//! polyline: the first reversed, then the second.
//!
//! A boundary crossing always names its only face as `face_before`, at
//! whichever end of the contour it sits.
//!
//! ## Cancellation
//!
//! Every crawl polls a [`CancelSignal`] between steps and returns what it has
//! so far when cancelled.

use crate::document::MeshDocument;
use crate::element::{EdgeId, FaceId, VertId};
use config::constants::WALK_MAX_STEPS;
use mesh_math::{Normal, Plane, Point, Ray};
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

// =============================================================================
// CANCELLATION
// =============================================================================

/// Cooperative cancellation polled by long-running crawls.
pub trait CancelSignal {
    /// True once the caller wants the crawl to stop.
    fn is_cancelled(&self) -> bool;
}

impl CancelSignal for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Signal that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelSignal for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

// =============================================================================
// CONTOURS
// =============================================================================

/// One plane crossing between two faces, or out through a boundary edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    /// Face the walk leaves.
    pub face_before: FaceId,
    /// Edge crossed.
    pub edge: EdgeId,
    /// Face the walk enters; `None` at a boundary.
    pub face_after: Option<FaceId>,
    /// World-space crossing point.
    pub point: Point,
}

impl Crossing {
    /// Same crossing walked the other way. Boundary crossings are unchanged.
    pub fn reversed(self) -> Self {
        match self.face_after {
            Some(after) => Self {
                face_before: after,
                face_after: Some(self.face_before),
                ..self
            },
            None => self,
        }
    }
}

/// Ordered crossings of one connected cross-section.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contour {
    /// Crossings in walk order.
    pub crossings: Vec<Crossing>,
    /// True if the last crossing re-enters the first face.
    pub closed: bool,
}

impl Contour {
    /// Number of crossings.
    pub fn len(&self) -> usize {
        self.crossings.len()
    }

    /// True if there are no crossings.
    pub fn is_empty(&self) -> bool {
        self.crossings.is_empty()
    }

    /// World-space polyline through the crossing points.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.crossings.iter().map(|c| c.point)
    }

    /// Every face the contour passes through.
    pub fn faces(&self) -> BTreeSet<FaceId> {
        self.crossings
            .iter()
            .flat_map(|c| std::iter::once(c.face_before).chain(c.face_after))
            .collect()
    }
}

// =============================================================================
// WALKER
// =============================================================================

enum WalkEnd {
    Closed,
    Open,
    Cancelled,
}

enum Step {
    Close(EdgeId, Point),
    Advance(EdgeId, Point, FaceId),
    Boundary(EdgeId, Point),
    Stop,
}

/// Crawl state for one query: the document, the plane in local space and
/// the cancellation signal.
struct Crawler<'a> {
    doc: &'a MeshDocument,
    plane: Plane,
    cancel: &'a dyn CancelSignal,
}

impl<'a> Crawler<'a> {
    fn new(doc: &'a MeshDocument, world_plane: &Plane, cancel: &'a dyn CancelSignal) -> Self {
        Self {
            doc,
            plane: doc.xform().w2l_plane(world_plane),
            cancel,
        }
    }

    fn position(&self, v: VertId) -> Option<Point> {
        self.doc.vert(v).map(|vert| vert.position())
    }

    /// Local crossing point of an edge, if the plane cuts or touches it.
    fn edge_crossing(&self, e: EdgeId) -> Option<Point> {
        let [a, b] = self.doc.edge(e)?.verts();
        let (p0, _) = self.plane.edge_intersection((self.position(a)?, self.position(b)?))?;
        Some(p0)
    }

    /// Crossing edges of a face in loop order.
    fn crossing_edges(&self, f: FaceId) -> Vec<(EdgeId, Point)> {
        let Some(face) = self.doc.face(f) else {
            return Vec::new();
        };
        face.edges()
            .iter()
            .filter_map(|&e| Some((e, self.edge_crossing(e)?)))
            .collect()
    }

    fn crossing(&self, face_before: FaceId, edge: EdgeId, face_after: Option<FaceId>, local: Point) -> Crossing {
        Crossing {
            face_before,
            edge,
            face_after,
            point: self.doc.xform().l2w_point(local),
        }
    }

    /// Faces across `e` from `face`.
    fn across(&self, e: EdgeId, face: FaceId) -> Vec<FaceId> {
        self.doc
            .edge(e)
            .map(|edge| edge.faces().iter().copied().filter(|&f| f != face).collect())
            .unwrap_or_default()
    }

    fn choose_exit(
        &self,
        face: FaceId,
        seed: FaceId,
        exits: &[(EdgeId, Point)],
        visited: &BTreeSet<FaceId>,
    ) -> Step {
        if face != seed {
            if let Some(&(e, p)) = exits.iter().find(|(e, _)| self.across(*e, face).contains(&seed)) {
                return Step::Close(e, p);
            }
        }
        for &(e, p) in exits {
            let others = self.across(e, face);
            if others.len() > 1 {
                debug!(edge = %e, faces = others.len() + 1, "Crawling across non-manifold edge");
            }
            if let Some(&next) = others.iter().find(|&&f| !visited.contains(&f)) {
                return Step::Advance(e, p, next);
            }
        }
        match exits.iter().find(|(e, _)| self.across(*e, face).is_empty()) {
            Some(&(e, p)) => Step::Boundary(e, p),
            None => Step::Stop,
        }
    }

    /// Walks from `seed` out through `start` until the contour closes,
    /// leaves the mesh, or runs out of unvisited faces.
    fn walk(&self, seed: FaceId, start: EdgeId, visited: &mut BTreeSet<FaceId>) -> (Vec<Crossing>, WalkEnd) {
        let mut crossings = Vec::new();
        let mut face = seed;
        let mut entry: Option<EdgeId> = None;

        loop {
            if self.cancel.is_cancelled() {
                warn!(crossings = crossings.len(), "Crawl cancelled, returning partial contour");
                return (crossings, WalkEnd::Cancelled);
            }
            let exits: Vec<(EdgeId, Point)> = self
                .crossing_edges(face)
                .into_iter()
                .filter(|&(e, _)| match entry {
                    None => e == start,
                    Some(entered) => e != entered,
                })
                .collect();

            match self.choose_exit(face, seed, &exits, visited) {
                Step::Close(e, p) => {
                    crossings.push(self.crossing(face, e, Some(seed), p));
                    return (crossings, WalkEnd::Closed);
                }
                Step::Advance(e, p, next) => {
                    crossings.push(self.crossing(face, e, Some(next), p));
                    visited.insert(next);
                    face = next;
                    entry = Some(e);
                }
                Step::Boundary(e, p) => {
                    crossings.push(self.crossing(face, e, None, p));
                    return (crossings, WalkEnd::Open);
                }
                Step::Stop => return (crossings, WalkEnd::Open),
            }
        }
    }

    /// Contour through `seed`, or `None` if the plane misses it.
    fn crawl(&self, seed: FaceId) -> Option<Contour> {
        let exits = self.crossing_edges(seed);
        if exits.is_empty() {
            return None;
        }
        let mut visited = BTreeSet::from([seed]);
        let mut walks: Vec<Vec<Crossing>> = Vec::with_capacity(exits.len());

        for (e, _) in exits {
            let (crossings, end) = self.walk(seed, e, &mut visited);
            match end {
                WalkEnd::Closed => {
                    debug!(face = %seed, crossings = crossings.len(), "Crawled closed contour");
                    return Some(Contour {
                        crossings,
                        closed: true,
                    });
                }
                WalkEnd::Open => walks.push(crossings),
                WalkEnd::Cancelled => {
                    walks.push(crossings);
                    break;
                }
            }
        }

        // stable, so equal lengths keep walk order
        walks.sort_by_key(|w| Reverse(w.len()));
        let mut walks = walks.into_iter();
        let mut crossings: Vec<Crossing> = walks
            .next()
            .unwrap_or_default()
            .into_iter()
            .rev()
            .map(Crossing::reversed)
            .collect();
        crossings.extend(walks.next().unwrap_or_default());

        debug!(face = %seed, crossings = crossings.len(), "Crawled open contour");
        (!crossings.is_empty()).then_some(Contour {
            crossings,
            closed: false,
        })
    }

    /// Greedy vertex walk from a face that misses the plane toward a face
    /// that straddles it. Gives up when every unvisited neighbour is farther
    /// from the plane than the current vertex.
    fn walk_to_plane(&self, start: FaceId) -> Option<FaceId> {
        let distance = |v: VertId| self.position(v).map(|p| self.plane.distance_to(p));
        let (mut current, mut current_distance) = self
            .doc
            .face(start)?
            .verts()
            .iter()
            .copied()
            .filter_map(|v| Some((v, distance(v)?)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;
        let side = self.plane.classify(self.position(current)?);
        let mut visited = BTreeSet::from([current]);

        for _ in 0..WALK_MAX_STEPS {
            if self.cancel.is_cancelled() {
                warn!("Walk toward plane cancelled");
                return None;
            }
            let mut best: Option<(VertId, f64)> = None;
            for &e in self.doc.vert(current)?.edges() {
                let Some(edge) = self.doc.edge(e) else {
                    continue;
                };
                let Some(n) = edge.other_vert(current) else {
                    continue;
                };
                if visited.contains(&n) {
                    continue;
                }
                let Some(p) = self.position(n) else {
                    continue;
                };
                if self.plane.classify(p) != side {
                    if let Some(&f) = edge.faces().first() {
                        return Some(f);
                    }
                    continue;
                }
                let d = self.plane.distance_to(p);
                if best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((n, d));
                }
            }
            let (next, d) = best?;
            if d > current_distance {
                debug!(vert = %current, "Walk toward plane stuck at a local minimum");
                return None;
            }
            visited.insert(next);
            current = next;
            current_distance = d;
        }
        debug!(steps = WALK_MAX_STEPS, "Walk toward plane hit step limit");
        None
    }
}

// =============================================================================
// DOCUMENT API
// =============================================================================

impl MeshDocument {
    fn local_cardinal_plane(&self, n: Normal) -> Plane {
        Plane::new(self.xform().l2w_point(Point::ORIGIN), self.xform().l2w_normal(n))
    }

    /// Local XY plane in world space.
    pub fn xy_plane(&self) -> Plane {
        self.local_cardinal_plane(Normal::new(0.0, 0.0, 1.0))
    }

    /// Local XZ plane in world space.
    pub fn xz_plane(&self) -> Plane {
        self.local_cardinal_plane(Normal::new(0.0, 1.0, 0.0))
    }

    /// Local YZ plane in world space.
    pub fn yz_plane(&self) -> Plane {
        self.local_cardinal_plane(Normal::new(1.0, 0.0, 0.0))
    }

    /// Contour through a given face.
    pub fn plane_intersection_crawl_from(
        &self,
        face: FaceId,
        plane: &Plane,
        cancel: &dyn CancelSignal,
    ) -> Option<Contour> {
        Crawler::new(self, plane, cancel).crawl(face)
    }

    /// Contour through the face hit by `ray`. `None` if the ray misses or
    /// the hit face does not straddle the plane.
    pub fn plane_intersection_crawl(&self, ray: &Ray, plane: &Plane, cancel: &dyn CancelSignal) -> Option<Contour> {
        let hit = self.raycast(ray)?;
        Crawler::new(self, plane, cancel).crawl(hit.face)
    }

    /// Like [`Self::plane_intersection_crawl`], but if the hit face misses
    /// the plane, first walks across vertices toward it.
    pub fn plane_intersection_walk_crawl(
        &self,
        ray: &Ray,
        plane: &Plane,
        cancel: &dyn CancelSignal,
    ) -> Option<Contour> {
        let hit = self.raycast(ray)?;
        let crawler = Crawler::new(self, plane, cancel);
        if !crawler.crossing_edges(hit.face).is_empty() {
            return crawler.crawl(hit.face);
        }
        let seed = crawler.walk_to_plane(hit.face)?;
        debug!(from = %hit.face, to = %seed, "Walked to plane");
        crawler.crawl(seed)
    }

    /// Every contour of the mesh against `plane`, one per connected
    /// cross-section, in ascending seed-face order.
    pub fn plane_intersections_crawl(&self, plane: &Plane, cancel: &dyn CancelSignal) -> Vec<Contour> {
        let crawler = Crawler::new(self, plane, cancel);
        let seeds = self.crossing_faces(&crawler);
        let mut touched: BTreeSet<FaceId> = BTreeSet::new();
        let mut contours = Vec::new();

        for seed in seeds {
            if touched.contains(&seed) {
                continue;
            }
            if cancel.is_cancelled() {
                warn!(contours = contours.len(), "Sweep cancelled, returning partial result");
                break;
            }
            touched.insert(seed);
            if let Some(contour) = crawler.crawl(seed) {
                touched.extend(contour.faces());
                contours.push(contour);
            }
        }
        debug!(contours = contours.len(), "Swept plane intersections");
        contours
    }

    /// Unordered world segments where `plane` cuts the fan-triangulated
    /// faces.
    pub fn plane_intersection(&self, plane: &Plane) -> Vec<(Point, Point)> {
        let crawler = Crawler::new(self, plane, &NeverCancel);
        let local = crawler.plane;
        self.crossing_faces(&crawler)
            .into_iter()
            .filter_map(|f| self.face(f))
            .flat_map(|face| {
                let corners: Vec<Point> = face
                    .verts()
                    .iter()
                    .filter_map(|&v| self.vert(v).map(|vert| vert.position()))
                    .collect();
                (1..corners.len().saturating_sub(1))
                    .flat_map(|i| local.triangle_intersection([corners[0], corners[i], corners[i + 1]]))
                    .collect::<Vec<_>>()
            })
            .map(|(a, b)| (self.xform().l2w_point(a), self.xform().l2w_point(b)))
            .collect()
    }

    /// Faces touching an edge the plane cuts or touches, from one linear
    /// pass over the edges.
    fn crossing_faces(&self, crawler: &Crawler<'_>) -> BTreeSet<FaceId> {
        self.edges()
            .filter(|&(e, _)| crawler.edge_crossing(e).is_some())
            .flat_map(|(_, edge)| edge.faces().iter().copied())
            .collect()
    }
}
