//! # Mesh Document Tests
//!
//! Snapshot import, adjacency, caches and compaction.

use super::*;
use crate::fixtures::{cube_snapshot, document, grid_snapshot};
use approx::assert_relative_eq;
use glam::DMat4;

#[test]
fn test_cube_import_builds_adjacency() {
    let doc = document(&cube_snapshot());
    assert_eq!(doc.vert_count(), 8);
    assert_eq!(doc.edge_count(), 12);
    assert_eq!(doc.face_count(), 6);
    assert!(doc.edges().all(|(_, e)| e.is_manifold()));
    assert!(doc.verts().all(|(_, v)| v.edges().len() == 3));
    assert_eq!(doc.vert_faces(VertId(0)).len(), 3);
}

#[test]
fn test_face_edges_follow_loop() {
    let doc = document(&cube_snapshot());
    for (_, face) in doc.faces() {
        let n = face.len();
        for i in 0..n {
            let edge = doc.edge(face.edges()[i]).unwrap();
            assert!(edge.joins(face.verts()[i], face.verts()[(i + 1) % n]));
        }
    }
}

#[test]
fn test_missing_normals_are_filled() {
    let doc = document(&cube_snapshot());
    let n = doc.vert(VertId(0)).unwrap().normal().as_dvec3();
    let expected = DVec3::splat(-1.0).normalize();
    assert_relative_eq!(n.x, expected.x, epsilon = 1e-12);
    assert_relative_eq!(n.y, expected.y, epsilon = 1e-12);
    assert_relative_eq!(n.z, expected.z, epsilon = 1e-12);

    let top = doc.face(FaceId(1)).unwrap().normal().as_dvec3();
    assert_relative_eq!(top.z, 1.0, epsilon = 1e-12);
}

#[test]
fn test_snapshot_edge_out_of_range_fails() {
    let mut snapshot = cube_snapshot();
    snapshot.edges.push(SnapshotEdge {
        verts: [0, 42],
        selected: false,
    });
    let err = MeshDocument::from_snapshot(&snapshot, DocumentConfig::default()).unwrap_err();
    assert!(matches!(err, MeshDocError::InvalidSnapshot { .. }));
}

#[test]
fn test_snapshot_degenerate_inputs_fail() {
    let mut snapshot = cube_snapshot();
    snapshot.edges.push(SnapshotEdge {
        verts: [3, 3],
        selected: false,
    });
    assert!(MeshDocument::from_snapshot(&snapshot, DocumentConfig::default()).is_err());

    let mut snapshot = cube_snapshot();
    snapshot.faces.push(SnapshotFace::new(vec![0, 1]));
    assert!(MeshDocument::from_snapshot(&snapshot, DocumentConfig::default()).is_err());

    let mut snapshot = cube_snapshot();
    snapshot.faces.push(SnapshotFace::new(vec![0, 1, 0]));
    assert!(MeshDocument::from_snapshot(&snapshot, DocumentConfig::default()).is_err());
}

#[test]
fn test_singular_matrix_is_rejected() {
    let mut snapshot = cube_snapshot();
    snapshot.matrix_world = DMat4::from_scale(DVec3::new(1.0, 0.0, 1.0));
    let err = MeshDocument::from_snapshot(&snapshot, DocumentConfig::default()).unwrap_err();
    assert_eq!(err, MeshDocError::SingularTransform);
}

#[test]
fn test_versions_are_unique_across_documents() {
    let a = document(&cube_snapshot());
    let mut b = document(&cube_snapshot());
    assert_ne!(a.version(), b.version());
    let before = b.version();
    b.dirty();
    assert!(b.version() > before);
}

#[test]
fn test_cache_accessors_are_idempotent() {
    let doc = document(&grid_snapshot(3));
    let bvh = doc.get_bvh();
    let again = doc.get_bvh();
    assert!(Rc::ptr_eq(&bvh, &again));
    doc.get_point_index();
    doc.get_point_index();
    doc.get_bbox();
    doc.get_bbox();
    assert_eq!(
        doc.rebuild_counts(),
        RebuildCounts {
            bbox: 1,
            bvh: 1,
            point_index: 1
        }
    );
}

#[test]
fn test_dirty_invalidates_caches() {
    let mut doc = document(&grid_snapshot(2));
    doc.get_bvh();
    doc.dirty();
    doc.get_bvh();
    assert_eq!(doc.rebuild_counts().bvh, 2);
}

#[test]
fn test_bvh_fans_polygons() {
    let doc = document(&cube_snapshot());
    assert_eq!(doc.get_bvh().triangle_count(), 12);
    assert_eq!(doc.get_point_index().len(), 8);
    let bbox = doc.get_bbox().unwrap();
    assert_eq!(bbox.max(), Point::new(1.0, 1.0, 1.0));
}

#[test]
fn test_triangulate_fans_quads() {
    let mut doc = document(&grid_snapshot(2));
    doc.triangulate();
    assert_eq!(doc.face_count(), 8);
    assert!(doc.faces().all(|(_, f)| f.len() == 3));
    // 12 grid edges plus one diagonal per quad
    assert_eq!(doc.edge_count(), 16);
}

#[test]
fn test_remove_edge_cascades_to_faces() {
    let mut doc = document(&cube_snapshot());
    let e = doc.find_edge(VertId(4), VertId(5)).unwrap();
    doc.remove_edge(e);
    assert_eq!(doc.face_count(), 4);
    assert!(doc.edge(e).is_none());
    assert!(!doc.is_valid(MeshElement::Face(FaceId(1))));
}

#[test]
fn test_to_snapshot_compacts_handles() {
    let mut doc = document(&cube_snapshot());
    doc.remove_vert(VertId(0));
    let snapshot = doc.to_snapshot();
    assert_eq!(snapshot.vertices.len(), 7);
    assert_eq!(snapshot.faces.len(), 3);
    assert_eq!(snapshot.edges.len(), 9);
    assert!(snapshot
        .faces
        .iter()
        .flat_map(|f| f.verts.iter())
        .all(|&v| v < 7));

    let rebuilt = document(&snapshot);
    assert_eq!(rebuilt.face_count(), 3);
}

#[test]
fn test_element_capabilities() {
    let doc = document(&cube_snapshot());
    let e = doc.find_edge(VertId(0), VertId(1)).unwrap();
    assert_eq!(doc.verts_of(MeshElement::Edge(e)).len(), 2);
    assert_eq!(doc.linked_faces(MeshElement::Edge(e)).len(), 2);
    assert_eq!(doc.linked_faces(MeshElement::Vert(VertId(6))).len(), 3);
    assert!(!doc.is_valid(MeshElement::Vert(VertId(99))));
    assert!(doc.verts_of(MeshElement::Face(FaceId(99))).is_empty());
}

#[test]
fn test_world_accessors_apply_transform() {
    let mut snapshot = cube_snapshot();
    snapshot.matrix_world = DMat4::from_translation(DVec3::new(10.0, 0.0, 0.0));
    let doc = document(&snapshot);
    assert_eq!(
        doc.vert_world_position(VertId(6)),
        Some(Point::new(11.0, 1.0, 1.0))
    );
}

#[test]
fn test_frame_follows_world_matrix() {
    let mut snapshot = cube_snapshot();
    snapshot.matrix_world = DMat4::from_translation(DVec3::new(0.0, 2.0, 0.0))
        * DMat4::from_rotation_z(std::f64::consts::FRAC_PI_2);
    let frame = document(&snapshot).get_frame().unwrap();
    assert_eq!(frame.o, Point::new(0.0, 2.0, 0.0));
    assert_relative_eq!(frame.x.y, 1.0, epsilon = 1e-12);
    assert_relative_eq!(frame.y.x, -1.0, epsilon = 1e-12);
    assert_relative_eq!(frame.z.z, 1.0, epsilon = 1e-12);

    let identity = document(&cube_snapshot()).get_frame().unwrap();
    assert_eq!(identity.o, Point::ORIGIN);
}
