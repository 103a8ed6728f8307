//! # Export Sidecar
//!
//! Minimal plain-object form of a document for external tools:
//! local positions, compacted indices and the mirror axis names.

use crate::document::MeshDocument;
use serde::{Deserialize, Serialize};

/// Serializable mesh with indices compacted over live elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshExport {
    /// Local vertex positions.
    pub vertices: Vec<[f64; 3]>,
    /// Edge endpoints as vertex indices.
    pub edges: Vec<[usize; 2]>,
    /// Face loops as vertex indices.
    pub faces: Vec<Vec<usize>>,
    /// Enabled mirror axes (`"x"`, `"y"`, `"z"`).
    pub symmetry: Vec<String>,
}

impl MeshExport {
    /// Exports the live elements of a document.
    pub fn from_document(doc: &MeshDocument) -> Self {
        let snapshot = doc.to_snapshot();
        Self {
            vertices: snapshot.vertices.iter().map(|v| v.position.to_array()).collect(),
            edges: snapshot.edges.iter().map(|e| e.verts).collect(),
            faces: snapshot.faces.into_iter().map(|f| f.verts).collect(),
            symmetry: snapshot.mirror_axes.iter().map(|a| a.name().to_string()).collect(),
        }
    }
}
