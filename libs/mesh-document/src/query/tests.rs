//! # Query Engine Tests

use super::*;
use crate::fixtures::{cube_snapshot, document, grid_snapshot};
use crate::host::MeshSnapshot;
use approx::assert_relative_eq;
use config::constants::EDGE_SHORTEN_DEFAULT;
use glam::DMat4;
use mesh_math::Direction;

fn down(x: f64, y: f64, z: f64) -> Ray {
    Ray::infinite(Point::new(x, y, z), Direction::new(0.0, 0.0, -1.0))
}

fn ortho(p: Point) -> Option<Point2D> {
    Some(Point2D::new(p.x, p.y))
}

#[test]
fn test_raycast_hits_grid() {
    let doc = document(&grid_snapshot(2));
    let hit = doc.raycast(&down(1.3, 0.4, 2.0)).unwrap();
    assert_eq!(hit.face, FaceId(1));
    assert_relative_eq!(hit.distance, 2.0, epsilon = 1e-12);
    assert_relative_eq!(hit.normal.z, 1.0, epsilon = 1e-12);
    assert!(doc.raycast_hit(&down(1.3, 0.4, 2.0)));
}

#[test]
fn test_raycast_miss_returns_none() {
    let doc = document(&grid_snapshot(2));
    assert!(doc.raycast(&down(5.0, 5.0, 1.0)).is_none());
    let away = Ray::infinite(Point::new(1.0, 1.0, 1.0), Direction::new(0.0, 0.0, 1.0));
    assert!(!doc.raycast_hit(&away));
}

#[test]
fn test_raycast_empty_mesh() {
    let doc = document(&MeshSnapshot::from_polygons("empty", &[], &[]));
    assert!(doc.raycast(&down(0.0, 0.0, 1.0)).is_none());
    assert!(doc.nearest(Point::ORIGIN, 10.0).is_none());
    assert!(doc.nearest_vert_point(Point::ORIGIN, None).is_none());
}

#[test]
fn test_raycast_measures_world_distance() {
    let mut snapshot = grid_snapshot(1);
    snapshot.matrix_world = DMat4::from_scale_rotation_translation(
        DVec3::new(2.0, 2.0, 2.0),
        glam::DQuat::IDENTITY,
        DVec3::new(0.0, 0.0, -3.0),
    );
    let doc = document(&snapshot);
    let hit = doc.raycast(&down(1.2, 0.6, 1.0)).unwrap();
    assert_relative_eq!(hit.point.z, -3.0, epsilon = 1e-12);
    assert_relative_eq!(hit.distance, 4.0, epsilon = 1e-12);
}

#[test]
fn test_raycast_all_through_cube() {
    let doc = document(&cube_snapshot());
    let hits = doc.raycast_all(&down(0.3, 0.6, 2.0));
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].face, FaceId(1));
    assert_eq!(hits[1].face, FaceId(0));
    assert_relative_eq!(hits[0].distance, 1.0, epsilon = 1e-9);
    assert_relative_eq!(hits[1].distance, 2.0, epsilon = 1e-9);
}

#[test]
fn test_raycast_all_respects_max() {
    let doc = document(&cube_snapshot());
    let short = Ray::new(Point::new(0.3, 0.6, 2.0), Direction::new(0.0, 0.0, -1.0), 0.0, 1.5);
    assert_eq!(doc.raycast_all(&short).len(), 1);
}

#[test]
fn test_nearest_surface_point() {
    let doc = document(&grid_snapshot(2));
    let hit = doc.nearest(Point::new(0.25, 1.5, 3.0), 5.0).unwrap();
    assert_relative_eq!(hit.distance, 3.0, epsilon = 1e-12);
    assert_relative_eq!(hit.point.x, 0.25, epsilon = 1e-12);
    assert_relative_eq!(hit.point.y, 1.5, epsilon = 1e-12);
    assert_relative_eq!(hit.point.z, 0.0, epsilon = 1e-12);
    assert!(doc.nearest(Point::new(0.25, 1.5, 3.0), 1.0).is_none());
}

#[test]
fn test_nearest_vert_point() {
    let doc = document(&grid_snapshot(3));
    let (v, d) = doc.nearest_vert_point(Point::new(1.1, 0.9, 0.0), None).unwrap();
    assert_eq!(v, VertId(5));
    assert_relative_eq!(d, (0.02f64).sqrt(), epsilon = 1e-12);

    let subset = [VertId(0), VertId(15)];
    let (v, _) = doc.nearest_vert_point(Point::new(1.1, 0.9, 0.0), Some(&subset)).unwrap();
    assert_eq!(v, VertId(0));
}

#[test]
fn test_nearest_vert_among_unwelded_duplicates() {
    let mut positions = vec![DVec3::splat(0.5); 40];
    positions.push(DVec3::new(4.0, 0.0, 0.0));
    let doc = document(&MeshSnapshot::from_polygons("dupes", &positions, &[]));
    let (v, d) = doc.nearest_vert_point(Point::ORIGIN, None).unwrap();
    assert!(v.index() < 40);
    assert_relative_eq!(d, 0.75f64.sqrt(), epsilon = 1e-12);
    assert_eq!(doc.nearest_verts_point(Point::ORIGIN, 1.0, None).len(), 40);
}

#[test]
fn test_nearest_verts_under_non_uniform_scale() {
    let mut snapshot = grid_snapshot(3);
    snapshot.matrix_world = DMat4::from_scale(DVec3::new(1.0, 10.0, 1.0));
    let doc = document(&snapshot);
    let found = doc.nearest_verts_point(Point::new(1.0, 4.0, 0.0), 4.3, None);
    let ids: Vec<VertId> = found.iter().map(|&(v, _)| v).collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[0], VertId(1));
    assert!(ids.contains(&VertId(0)) && ids.contains(&VertId(2)));
    assert!(found.windows(2).all(|w| w[0].1 <= w[1].1));
}

#[test]
fn test_nearest_edges_point() {
    let doc = document(&grid_snapshot(2));
    let (e, d) = doc.nearest_edge_point(Point::new(0.5, -0.25, 0.0), None).unwrap();
    assert_eq!(doc.edge(e).unwrap().verts(), [VertId(0), VertId(1)]);
    assert_relative_eq!(d, 0.25, epsilon = 1e-12);

    let near = doc.nearest_edges_point(Point::new(1.0, 1.0, 0.0), 0.1, None);
    assert_eq!(near.len(), 4);
}

#[test]
fn test_nearest2d_vert_skips_unprojectable() {
    let doc = document(&grid_snapshot(3));
    let (v, _) = doc.nearest2d_vert(Point2D::new(2.1, 0.1), 1.0, ortho, None).unwrap();
    assert_eq!(v, VertId(2));

    let clipped = |p: Point| (p.x < 1.5).then(|| Point2D::new(p.x, p.y));
    let (v, _) = doc.nearest2d_vert(Point2D::new(2.1, 0.1), 2.0, clipped, None).unwrap();
    assert_eq!(v, VertId(1));
}

#[test]
fn test_nearest2d_edges_shorten() {
    let doc = document(&grid_snapshot(3));
    let at_vertex = Point2D::new(1.0, 0.0);
    assert_eq!(doc.nearest2d_edges(at_vertex, 0.01, ortho, 0.0, None).len(), 3);
    assert!(doc.nearest2d_edges(at_vertex, 0.2, ortho, 0.5, None).is_empty());
    assert_eq!(doc.nearest2d_edges(at_vertex, 0.3, ortho, 0.5, None).len(), 3);

    let (e, d) = doc
        .nearest2d_edge(Point2D::new(0.5, 0.1), 1.0, ortho, EDGE_SHORTEN_DEFAULT, None)
        .unwrap();
    assert_eq!(doc.edge(e).unwrap().verts(), [VertId(0), VertId(1)]);
    assert_relative_eq!(d, 0.1, epsilon = 1e-12);
}

#[test]
fn test_nearest2d_face() {
    let doc = document(&grid_snapshot(3));
    assert_eq!(doc.nearest2d_face(Point2D::new(1.3, 0.6), ortho, None), Some(FaceId(1)));
    assert_eq!(doc.nearest2d_faces(Point2D::new(1.3, 0.6), ortho, None), vec![FaceId(1)]);
    assert!(doc.nearest2d_face(Point2D::new(-1.0, 0.5), ortho, None).is_none());
}

#[test]
fn test_visibility_requires_all_vertices() {
    let doc = document(&grid_snapshot(3));
    let left = |p: Point, _: Normal| p.x < 1.5;
    let verts = doc.visible_verts(left);
    assert_eq!(verts.len(), 8);
    assert_eq!(doc.visible_edges(left, Some(&verts)).len(), 10);
    assert_eq!(doc.visible_edges(left, None).len(), 10);
    assert_eq!(doc.visible_faces(left, None), vec![FaceId(0), FaceId(3), FaceId(6)]);
}

#[test]
fn test_visibility_sees_world_normals() {
    let mut snapshot = grid_snapshot(1);
    snapshot.matrix_world = DMat4::from_scale(DVec3::new(1.0, 1.0, -1.0));
    let doc = document(&snapshot);
    let facing_up = |_: Point, n: Normal| n.z > 0.0;
    assert!(doc.visible_verts(facing_up).is_empty());
}
