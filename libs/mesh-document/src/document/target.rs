//! # Target Document
//!
//! Mutable editing session over a host mesh. Opening captures the host's
//! non-mesh state; the session ends with [`TargetDocument::commit`] (write
//! back, then restore) or [`TargetDocument::cancel`] (restore only).

use super::MeshDocument;
use crate::error::MeshDocResult;
use crate::export::MeshExport;
use crate::host::{Axis, HostState, MeshHost, MeshSnapshot};
use config::constants::DocumentConfig;
use std::ops::{Deref, DerefMut};
use tracing::{debug, info};

/// Mutable document bound to one editing session.
#[derive(Debug)]
pub struct TargetDocument {
    doc: MeshDocument,
    host_state: HostState,
    written_version: u64,
}

impl TargetDocument {
    /// Opens a session with default configuration.
    pub fn open(snapshot: &MeshSnapshot, host: &dyn MeshHost) -> MeshDocResult<Self> {
        Self::open_with_config(snapshot, host, DocumentConfig::default())
    }

    /// Opens a session, seeding symmetry from the host mirror axes.
    pub fn open_with_config(
        snapshot: &MeshSnapshot,
        host: &dyn MeshHost,
        config: DocumentConfig,
    ) -> MeshDocResult<Self> {
        let mut doc = MeshDocument::from_snapshot(snapshot, config)?;
        doc.symmetry = snapshot.mirror_axes.iter().copied().collect();
        let written_version = doc.version();
        info!(name = %doc.name(), verts = doc.vert_count(), faces = doc.face_count(), "Opened target session");
        Ok(Self {
            doc,
            host_state: host.host_state(),
            written_version,
        })
    }

    /// Host state captured when the session opened.
    pub fn host_state(&self) -> HostState {
        self.host_state
    }

    // =========================================================================
    // SYMMETRY
    // =========================================================================

    /// Adds a mirror axis.
    pub fn enable_symmetry(&mut self, axis: Axis) {
        if self.doc.symmetry.insert(axis) {
            self.doc.dirty();
        }
    }

    /// Removes a mirror axis.
    pub fn disable_symmetry(&mut self, axis: Axis) {
        if self.doc.symmetry.remove(&axis) {
            self.doc.dirty();
        }
    }

    /// True if `axis` is mirrored.
    pub fn has_symmetry(&self, axis: Axis) -> bool {
        self.doc.symmetry.contains(&axis)
    }

    // =========================================================================
    // SESSION
    // =========================================================================

    /// Writes the mesh back if it changed since the last write.
    /// Returns whether a write happened.
    pub fn clean(&mut self, host: &mut dyn MeshHost) -> bool {
        if self.doc.version() == self.written_version {
            return false;
        }
        host.write_mesh(&self.doc.to_snapshot());
        self.written_version = self.doc.version();
        debug!(version = self.written_version, "Wrote target back to host");
        true
    }

    /// Writes the compacted mesh to the host and restores its state.
    pub fn commit(self, host: &mut dyn MeshHost) {
        let snapshot = self.doc.to_snapshot();
        host.write_mesh(&snapshot);
        host.restore_state(&self.host_state);
        info!(
            name = %snapshot.name,
            verts = snapshot.vertices.len(),
            faces = snapshot.faces.len(),
            "Committed target session"
        );
    }

    /// Restores host state without writing the mesh.
    pub fn cancel(self, host: &mut dyn MeshHost) {
        host.restore_state(&self.host_state);
        info!(name = %self.doc.name(), "Cancelled target session");
    }

    // =========================================================================
    // EXPORT
    // =========================================================================

    /// Plain-object export with compacted indices.
    pub fn to_export(&self) -> MeshExport {
        MeshExport::from_document(&self.doc)
    }

    /// JSON form of [`Self::to_export`].
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_export())
    }
}

impl Deref for TargetDocument {
    type Target = MeshDocument;

    fn deref(&self) -> &MeshDocument {
        &self.doc
    }
}

impl DerefMut for TargetDocument {
    fn deref_mut(&mut self) -> &mut MeshDocument {
        &mut self.doc
    }
}
