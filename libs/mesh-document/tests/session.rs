use glam::DVec3;
use mesh_document::{Axis, FaceId, HostState, MeshElement, MeshHost, MeshSnapshot, TargetDocument};
use mesh_math::{Normal, Point};

#[derive(Default)]
struct FakeHost {
    written: Vec<MeshSnapshot>,
    state: HostState,
    restored: Option<HostState>,
}

impl MeshHost for FakeHost {
    fn write_mesh(&mut self, snapshot: &MeshSnapshot) {
        self.written.push(snapshot.clone());
    }

    fn host_state(&self) -> HostState {
        self.state
    }

    fn restore_state(&mut self, state: &HostState) {
        self.state = *state;
        self.restored = Some(*state);
    }
}

/// Two unit quads side by side sharing the edge 1-4.
fn strip() -> MeshSnapshot {
    let positions = [
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(1.0, 0.0, 0.0),
        DVec3::new(2.0, 0.0, 0.0),
        DVec3::new(0.0, 1.0, 0.0),
        DVec3::new(1.0, 1.0, 0.0),
        DVec3::new(2.0, 1.0, 0.0),
    ];
    MeshSnapshot::from_polygons("strip", &positions, &[vec![0, 1, 4, 3], vec![1, 2, 5, 4]])
}

#[test]
fn commit_writes_compacted_mesh_and_restores_state() {
    let mut host = FakeHost::default();
    let mut target = TargetDocument::open(&strip(), &host).unwrap();
    // the editing tool hides the object while the session runs
    host.state.hidden = true;

    target.delete_faces(&[FaceId(0)], true, true);
    target.commit(&mut host);

    assert_eq!(host.written.len(), 1);
    let written = &host.written[0];
    assert_eq!(written.vertices.len(), 4);
    assert_eq!(written.edges.len(), 4);
    assert_eq!(written.faces.len(), 1);
    assert_eq!(written.faces[0].verts, vec![0, 1, 3, 2]);
    assert_eq!(host.restored, Some(HostState { hidden: false }));
}

#[test]
fn cancel_restores_without_writing() {
    let mut host = FakeHost::default();
    let mut target = TargetDocument::open(&strip(), &host).unwrap();
    host.state.hidden = true;
    target.delete_faces(&[FaceId(1)], true, true);
    target.cancel(&mut host);

    assert!(host.written.is_empty());
    assert!(!host.state.hidden);
}

#[test]
fn clean_writes_only_after_changes() {
    let mut host = FakeHost::default();
    let mut target = TargetDocument::open(&strip(), &host).unwrap();
    assert!(!target.clean(&mut host));

    target.new_vert(Point::new(3.0, 0.0, 0.0), Normal::new(0.0, 0.0, 1.0));
    assert!(target.clean(&mut host));
    assert!(!target.clean(&mut host));
    assert_eq!(host.written.len(), 1);
    assert_eq!(host.written[0].vertices.len(), 7);
}

#[test]
fn selection_survives_commit() {
    let mut host = FakeHost::default();
    let mut target = TargetDocument::open(&strip(), &host).unwrap();
    target.select(&[MeshElement::Face(FaceId(1))], true, false, true);
    target.commit(&mut host);

    let written = &host.written[0];
    let faces: Vec<bool> = written.faces.iter().map(|f| f.selected).collect();
    assert_eq!(faces, vec![false, true]);
    assert_eq!(written.vertices.iter().filter(|v| v.selected).count(), 4);
    assert_eq!(written.edges.iter().filter(|e| e.selected).count(), 4);
}

#[test]
fn symmetry_flows_from_host_to_export() {
    let mut snapshot = strip();
    snapshot.mirror_axes = vec![Axis::X];
    let host = FakeHost::default();
    let mut target = TargetDocument::open(&snapshot, &host).unwrap();
    assert!(target.has_symmetry(Axis::X));

    target.enable_symmetry(Axis::Z);
    target.disable_symmetry(Axis::X);
    let export = target.to_export();
    assert_eq!(export.symmetry, vec!["z".to_string()]);
    assert_eq!(export.faces, vec![vec![0, 1, 4, 3], vec![1, 2, 5, 4]]);

    let json = target.to_json().unwrap();
    assert!(json.contains("\"symmetry\":[\"z\"]"));
}

#[test]
fn malformed_snapshot_is_rejected() {
    let mut snapshot = strip();
    snapshot.faces[0].verts = vec![0, 1, 40];
    assert!(TargetDocument::open(&snapshot, &FakeHost::default()).is_err());
}
