//! Shared test meshes.

use crate::document::MeshDocument;
use crate::host::MeshSnapshot;
use config::constants::DocumentConfig;
use glam::DVec3;

/// Unit cube spanning `[0, 1]³` with outward-facing quads.
pub(crate) fn cube_snapshot() -> MeshSnapshot {
    let positions = [
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(1.0, 0.0, 0.0),
        DVec3::new(1.0, 1.0, 0.0),
        DVec3::new(0.0, 1.0, 0.0),
        DVec3::new(0.0, 0.0, 1.0),
        DVec3::new(1.0, 0.0, 1.0),
        DVec3::new(1.0, 1.0, 1.0),
        DVec3::new(0.0, 1.0, 1.0),
    ];
    let faces = [
        vec![0, 3, 2, 1],
        vec![4, 5, 6, 7],
        vec![0, 1, 5, 4],
        vec![1, 2, 6, 5],
        vec![2, 3, 7, 6],
        vec![3, 0, 4, 7],
    ];
    MeshSnapshot::from_polygons("cube", &positions, &faces)
}

/// `n × n` grid of unit quads on the XY plane facing +Z.
pub(crate) fn grid_snapshot(n: usize) -> MeshSnapshot {
    let row = n + 1;
    let positions: Vec<DVec3> = (0..row * row)
        .map(|i| DVec3::new((i % row) as f64, (i / row) as f64, 0.0))
        .collect();
    let faces: Vec<Vec<usize>> = (0..n * n)
        .map(|q| {
            let (i, j) = (q % n, q / n);
            let v = j * row + i;
            vec![v, v + 1, v + row + 1, v + row]
        })
        .collect();
    MeshSnapshot::from_polygons("grid", &positions, &faces)
}

/// Open tube of `rings` square rings stacked along +Z, quads facing out.
/// Vertex `k * 4 + i` is corner `i` of ring `k`.
pub(crate) fn tube_snapshot(rings: usize) -> MeshSnapshot {
    let corners = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
    let positions: Vec<DVec3> = (0..rings * 4)
        .map(|v| {
            let (x, y) = corners[v % 4];
            DVec3::new(x, y, (v / 4) as f64)
        })
        .collect();
    let faces: Vec<Vec<usize>> = (0..(rings - 1) * 4)
        .map(|q| {
            let (k, i) = (q / 4, q % 4);
            let j = (i + 1) % 4;
            vec![k * 4 + i, k * 4 + j, (k + 1) * 4 + j, (k + 1) * 4 + i]
        })
        .collect();
    MeshSnapshot::from_polygons("tube", &positions, &faces)
}

/// Document over a snapshot with default configuration.
pub(crate) fn document(snapshot: &MeshSnapshot) -> MeshDocument {
    MeshDocument::from_snapshot(snapshot, DocumentConfig::default()).expect("fixture snapshot is valid")
}
