use glam::{DMat4, DVec3};
use mesh_document::{content_hash, CacheStats, MeshSnapshot, SourceCache};
use mesh_math::{Direction, Point, Ray};
use std::rc::Rc;

fn quad(name: &str) -> MeshSnapshot {
    MeshSnapshot::from_polygons(
        name,
        &[DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0), DVec3::Y],
        &[vec![0, 1, 2, 3]],
    )
}

#[test]
fn unchanged_content_reuses_document() {
    let mut cache = SourceCache::new();
    let a = cache.get_or_build(&quad("a")).unwrap();
    let b = cache.get_or_build(&quad("a")).unwrap();
    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!(cache.len(), 1);
    assert_eq!(
        cache.stats(),
        CacheStats {
            hits: 1,
            misses: 1,
            evictions: 0
        }
    );
}

#[test]
fn changed_content_rebuilds() {
    let mut cache = SourceCache::new();
    let before = cache.get_or_build(&quad("a")).unwrap();

    let mut moved = quad("a");
    moved.vertices[2].position.z = 0.5;
    let after = cache.get_or_build(&moved).unwrap();
    assert!(!Rc::ptr_eq(&before, &after));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().evictions, 1);

    // the old handle stays usable
    let ray = Ray::infinite(Point::new(0.2, 0.1, 1.0), Direction::new(0.0, 0.0, -1.0));
    assert!(before.raycast(&ray).is_some());
}

#[test]
fn hash_ignores_selection_but_not_transform() {
    let base = quad("a");
    let mut selected = quad("a");
    selected.faces[0].selected = true;
    assert_eq!(content_hash(&base), content_hash(&selected));

    let mut moved = quad("a");
    moved.matrix_world = DMat4::from_translation(DVec3::Z);
    assert_ne!(content_hash(&base), content_hash(&moved));
}

#[test]
fn entries_are_keyed_by_name() {
    let mut cache = SourceCache::new();
    cache.get_or_build(&quad("a")).unwrap();
    cache.get_or_build(&quad("b")).unwrap();
    assert_eq!(cache.len(), 2);
    assert!(cache.evict("a"));
    assert!(!cache.evict("a"));
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn source_documents_are_triangulated_and_unselected() {
    let mut snapshot = quad("a");
    snapshot.faces[0].selected = true;
    snapshot.vertices[0].selected = true;
    let mut cache = SourceCache::new();
    let source = cache.get_or_build(&snapshot).unwrap();
    assert_eq!(source.face_count(), 2);
    assert!(source.get_selected_faces().is_empty());
    assert!(source.get_selected_verts().is_empty());
    assert!(source.symmetry().is_empty());
}
