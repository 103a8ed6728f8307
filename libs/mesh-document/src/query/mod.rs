//! # Query Engine
//!
//! World-space queries answered through the local-space spatial caches.
//!
//! ## Ray casts
//!
//! Rays are converted to local space, intersected with the BVH, and the hit
//! is rejected if it lies outside the bounding box grown by the configured
//! margin. Distances are always measured in world space.
//!
//! ## Nearest element
//!
//! 3D variants measure world distance. Radius queries ask the point index
//! for a local radius large enough to cover the world radius under any
//! non-uniform scale, then filter by exact world distance. Passing a
//! candidate subset switches to a linear scan over those candidates.
//!
//! 2D variants project through a caller-supplied function and skip points
//! whose projection is undefined (behind the camera, for instance).

use crate::document::MeshDocument;
use crate::element::{EdgeId, FaceId, VertId};
use config::constants::{EPSILON, RAYCAST_ALL_MAX_HITS};
use glam::{DVec2, DVec3};
use mesh_math::triangle2d::point_in_triangle2d;
use mesh_math::{Normal, Point, Point2D, Ray};
use std::collections::BTreeSet;

/// World-space ray or nearest-surface hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Hit point.
    pub point: Point,
    /// Face normal at the hit.
    pub normal: Normal,
    /// Face containing the hit.
    pub face: FaceId,
    /// World distance from the query origin.
    pub distance: f64,
}

fn closest_on_segment(p: DVec3, a: DVec3, b: DVec3) -> DVec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < EPSILON * EPSILON {
        return a;
    }
    a + ab * ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
}

fn segment_distance2d(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < EPSILON * EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

fn sort_by_distance<T>(found: &mut [(T, f64)]) {
    found.sort_by(|a, b| a.1.total_cmp(&b.1));
}

impl MeshDocument {
    // =========================================================================
    // RAY CASTS
    // =========================================================================

    /// Nearest face hit along a world ray.
    pub fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        let local = self.xform().w2l_ray(ray);
        let hit = self.get_bvh().ray_cast(&local)?;
        let bbox = self.get_bbox()?;
        if !bbox.point_within(hit.point, self.config().bbox_hit_margin) {
            return None;
        }
        let point = self.xform().l2w_point(hit.point);
        Some(RayHit {
            point,
            normal: self.xform().l2w_normal(hit.normal),
            face: hit.face,
            distance: ray.o.distance_to(point),
        })
    }

    /// True if the ray hits any face.
    pub fn raycast_hit(&self, ray: &Ray) -> bool {
        self.raycast(ray).is_some()
    }

    /// Every hit along the ray, nearest first, with cumulative distances.
    ///
    /// Each re-cast starts just past the previous hit, so the loop always
    /// advances and stops at the ray's end or after
    /// [`RAYCAST_ALL_MAX_HITS`] hits.
    pub fn raycast_all(&self, ray: &Ray) -> Vec<RayHit> {
        let advance = self.config().raycast_advance;
        let mut hits = Vec::new();
        let mut origin = ray.o;
        let mut remaining = ray.max;
        let mut travelled = 0.0;

        while hits.len() < RAYCAST_ALL_MAX_HITS && remaining > 0.0 {
            let Some(mut hit) = self.raycast(&Ray::new(origin, ray.d, 0.0, remaining)) else {
                break;
            };
            let step = hit.distance + advance;
            hit.distance += travelled;
            hits.push(hit);
            travelled += step;
            remaining -= step;
            origin += ray.d * step;
        }
        hits
    }

    /// Closest surface point within world distance `max_dist`.
    pub fn nearest(&self, point: Point, max_dist: f64) -> Option<RayHit> {
        let local = self.xform().w2l_point(point);
        let local_max = max_dist * self.xform().w2l_length_bound();
        let found = self.get_bvh().find_nearest(local, local_max)?;
        let world = self.xform().l2w_point(found.point);
        let distance = point.distance_to(world);
        (distance <= max_dist).then(|| RayHit {
            point: world,
            normal: self.xform().l2w_normal(found.normal),
            face: found.face,
            distance,
        })
    }

    // =========================================================================
    // NEAREST 3D
    // =========================================================================

    fn vert_world_distance(&self, v: VertId, point: Point) -> Option<f64> {
        self.vert_world_position(v).map(|p| p.distance_to(point))
    }

    /// Vertices within world distance `radius`, nearest first.
    pub fn nearest_verts_point(&self, point: Point, radius: f64, verts: Option<&[VertId]>) -> Vec<(VertId, f64)> {
        let mut found: Vec<(VertId, f64)> = match verts {
            Some(candidates) => candidates
                .iter()
                .filter_map(|&v| Some((v, self.vert_world_distance(v, point)?)))
                .filter(|&(_, d)| d <= radius)
                .collect(),
            None => {
                let local = self.xform().w2l_point(point);
                let local_radius = radius * self.xform().w2l_length_bound();
                self.get_point_index()
                    .within(local, local_radius)
                    .into_iter()
                    .filter_map(|(v, _)| Some((v, self.vert_world_distance(v, point)?)))
                    .filter(|&(_, d)| d <= radius)
                    .collect()
            }
        };
        sort_by_distance(&mut found);
        found
    }

    /// Closest vertex by world distance.
    pub fn nearest_vert_point(&self, point: Point, verts: Option<&[VertId]>) -> Option<(VertId, f64)> {
        match verts {
            Some(candidates) => candidates
                .iter()
                .filter_map(|&v| Some((v, self.vert_world_distance(v, point)?)))
                .min_by(|a, b| a.1.total_cmp(&b.1)),
            None => {
                // local nearest bounds the world nearest from above
                let (v, _) = self.get_point_index().nearest(self.xform().w2l_point(point))?;
                let bound = self.vert_world_distance(v, point)?;
                self.nearest_verts_point(point, bound, None)
                    .into_iter()
                    .next()
                    .or(Some((v, bound)))
            }
        }
    }

    fn edge_world_distance(&self, e: EdgeId, point: Point) -> Option<f64> {
        let [a, b] = self.edge(e)?.verts();
        let (a, b) = (self.vert_world_position(a)?, self.vert_world_position(b)?);
        let q = point.as_dvec3();
        Some(closest_on_segment(q, a.as_dvec3(), b.as_dvec3()).distance(q))
    }

    fn edge_candidates(&self, edges: Option<&[EdgeId]>) -> Vec<EdgeId> {
        match edges {
            Some(candidates) => candidates.to_vec(),
            None => self.edges().map(|(id, _)| id).collect(),
        }
    }

    /// Edges within world distance `radius`, nearest first.
    pub fn nearest_edges_point(&self, point: Point, radius: f64, edges: Option<&[EdgeId]>) -> Vec<(EdgeId, f64)> {
        let mut found: Vec<(EdgeId, f64)> = self
            .edge_candidates(edges)
            .into_iter()
            .filter_map(|e| Some((e, self.edge_world_distance(e, point)?)))
            .filter(|&(_, d)| d <= radius)
            .collect();
        sort_by_distance(&mut found);
        found
    }

    /// Closest edge by world distance.
    pub fn nearest_edge_point(&self, point: Point, edges: Option<&[EdgeId]>) -> Option<(EdgeId, f64)> {
        self.edge_candidates(edges)
            .into_iter()
            .filter_map(|e| Some((e, self.edge_world_distance(e, point)?)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    // =========================================================================
    // NEAREST 2D
    // =========================================================================

    fn project_vert(&self, v: VertId, project: &impl Fn(Point) -> Option<Point2D>) -> Option<DVec2> {
        project(self.vert_world_position(v)?).map(|p| p.0)
    }

    /// Vertices whose projection lies within `radius` of `p`, nearest first.
    pub fn nearest2d_verts(
        &self,
        p: Point2D,
        radius: f64,
        project: impl Fn(Point) -> Option<Point2D>,
        verts: Option<&[VertId]>,
    ) -> Vec<(VertId, f64)> {
        let candidates: Vec<VertId> = match verts {
            Some(v) => v.to_vec(),
            None => self.verts().map(|(id, _)| id).collect(),
        };
        let mut found: Vec<(VertId, f64)> = candidates
            .into_iter()
            .filter_map(|v| Some((v, self.project_vert(v, &project)?.distance(p.0))))
            .filter(|&(_, d)| d <= radius)
            .collect();
        sort_by_distance(&mut found);
        found
    }

    /// Vertex whose projection is closest to `p`, within `max_dist`.
    pub fn nearest2d_vert(
        &self,
        p: Point2D,
        max_dist: f64,
        project: impl Fn(Point) -> Option<Point2D>,
        verts: Option<&[VertId]>,
    ) -> Option<(VertId, f64)> {
        self.nearest2d_verts(p, max_dist, project, verts).into_iter().next()
    }

    /// Screen distance to an edge trimmed by `shorten / 2` of its projected
    /// length at each end.
    fn edge_distance2d(
        &self,
        e: EdgeId,
        p: DVec2,
        shorten: f64,
        project: &impl Fn(Point) -> Option<Point2D>,
    ) -> Option<f64> {
        let [a, b] = self.edge(e)?.verts();
        let (a, b) = (self.project_vert(a, project)?, self.project_vert(b, project)?);
        let Some(dir) = (b - a).try_normalize() else {
            return Some(p.distance(a));
        };
        let margin = a.distance(b) * shorten * 0.5;
        Some(segment_distance2d(p, a + dir * margin, b - dir * margin))
    }

    /// Edges whose trimmed projection lies within `radius` of `p`, nearest
    /// first.
    pub fn nearest2d_edges(
        &self,
        p: Point2D,
        radius: f64,
        project: impl Fn(Point) -> Option<Point2D>,
        shorten: f64,
        edges: Option<&[EdgeId]>,
    ) -> Vec<(EdgeId, f64)> {
        let mut found: Vec<(EdgeId, f64)> = self
            .edge_candidates(edges)
            .into_iter()
            .filter_map(|e| Some((e, self.edge_distance2d(e, p.0, shorten, &project)?)))
            .filter(|&(_, d)| d <= radius)
            .collect();
        sort_by_distance(&mut found);
        found
    }

    /// Edge whose trimmed projection is closest to `p`, within `max_dist`.
    pub fn nearest2d_edge(
        &self,
        p: Point2D,
        max_dist: f64,
        project: impl Fn(Point) -> Option<Point2D>,
        shorten: f64,
        edges: Option<&[EdgeId]>,
    ) -> Option<(EdgeId, f64)> {
        self.nearest2d_edges(p, max_dist, project, shorten, edges)
            .into_iter()
            .next()
    }

    /// Projected fan triangles of a face, or `None` if any vertex fails to
    /// project.
    fn project_face(&self, f: FaceId, project: &impl Fn(Point) -> Option<Point2D>) -> Option<Vec<DVec2>> {
        self.face(f)?
            .verts()
            .iter()
            .map(|&v| self.project_vert(v, project))
            .collect()
    }

    /// Faces whose projection contains `p`.
    pub fn nearest2d_faces(
        &self,
        p: Point2D,
        project: impl Fn(Point) -> Option<Point2D>,
        faces: Option<&[FaceId]>,
    ) -> Vec<FaceId> {
        let candidates: Vec<FaceId> = match faces {
            Some(f) => f.to_vec(),
            None => self.faces().map(|(id, _)| id).collect(),
        };
        candidates
            .into_iter()
            .filter(|&f| {
                self.project_face(f, &project).is_some_and(|pts| {
                    (1..pts.len().saturating_sub(1)).any(|i| {
                        point_in_triangle2d(p, Point2D(pts[0]), Point2D(pts[i]), Point2D(pts[i + 1]))
                    })
                })
            })
            .collect()
    }

    /// Containing face whose projected centroid is closest to `p`.
    pub fn nearest2d_face(
        &self,
        p: Point2D,
        project: impl Fn(Point) -> Option<Point2D>,
        faces: Option<&[FaceId]>,
    ) -> Option<FaceId> {
        self.nearest2d_faces(p, &project, faces)
            .into_iter()
            .filter_map(|f| {
                let pts = self.project_face(f, &project)?;
                let centroid = pts.iter().sum::<DVec2>() / pts.len() as f64;
                Some((f, centroid.distance(p.0)))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(f, _)| f)
    }

    // =========================================================================
    // VISIBILITY
    // =========================================================================

    /// Vertices for which `is_visible(world position, world normal)` holds.
    pub fn visible_verts(&self, is_visible: impl Fn(Point, Normal) -> bool) -> BTreeSet<VertId> {
        self.verts()
            .filter(|(_, v)| {
                is_visible(
                    self.xform().l2w_point(v.position()),
                    self.xform().l2w_normal(v.normal()),
                )
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Edges with both vertices visible.
    pub fn visible_edges(
        &self,
        is_visible: impl Fn(Point, Normal) -> bool,
        visible: Option<&BTreeSet<VertId>>,
    ) -> Vec<EdgeId> {
        let computed;
        let visible = match visible {
            Some(set) => set,
            None => {
                computed = self.visible_verts(is_visible);
                &computed
            }
        };
        self.edges()
            .filter(|(_, e)| e.verts().iter().all(|v| visible.contains(v)))
            .map(|(id, _)| id)
            .collect()
    }

    /// Faces with every vertex visible.
    pub fn visible_faces(
        &self,
        is_visible: impl Fn(Point, Normal) -> bool,
        visible: Option<&BTreeSet<VertId>>,
    ) -> Vec<FaceId> {
        let computed;
        let visible = match visible {
            Some(set) => set,
            None => {
                computed = self.visible_verts(is_visible);
                &computed
            }
        };
        self.faces()
            .filter(|(_, f)| f.verts().iter().all(|v| visible.contains(v)))
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
mod tests;
