//! # Source Document
//!
//! Read-only, triangulated snapshot of a reference mesh used for snapping
//! and crawling. Building one is expensive, so hosts keep them in a
//! [`SourceCache`] keyed by mesh name and validated by content hash.
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec3;
//! use mesh_document::{MeshSnapshot, SourceCache};
//!
//! let snapshot = MeshSnapshot::from_polygons("tri", &[DVec3::ZERO, DVec3::X, DVec3::Y], &[vec![0, 1, 2]]);
//! let mut cache = SourceCache::new();
//! let a = cache.get_or_build(&snapshot).unwrap();
//! let b = cache.get_or_build(&snapshot).unwrap();
//! assert!(std::rc::Rc::ptr_eq(&a, &b));
//! ```

use super::MeshDocument;
use crate::error::MeshDocResult;
use crate::host::MeshSnapshot;
use config::constants::DocumentConfig;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::rc::Rc;
use tracing::debug;

/// Hash of a snapshot's geometry: position bit patterns, connectivity and
/// the world matrix. Selection and names do not contribute.
pub fn content_hash(snapshot: &MeshSnapshot) -> u64 {
    let mut hasher = DefaultHasher::new();
    snapshot.vertices.len().hash(&mut hasher);
    for v in &snapshot.vertices {
        v.position.to_array().map(f64::to_bits).hash(&mut hasher);
    }
    snapshot.edges.len().hash(&mut hasher);
    for e in &snapshot.edges {
        e.verts.hash(&mut hasher);
    }
    snapshot.faces.len().hash(&mut hasher);
    for f in &snapshot.faces {
        f.verts.hash(&mut hasher);
    }
    snapshot.matrix_world.to_cols_array().map(f64::to_bits).hash(&mut hasher);
    hasher.finish()
}

/// Immutable document over a reference mesh.
///
/// Faces are fan-triangulated, selection is cleared and symmetry is empty.
/// Dereferences to [`MeshDocument`] for queries and crawls only.
#[derive(Debug)]
pub struct SourceDocument {
    doc: MeshDocument,
    hash: u64,
}

impl SourceDocument {
    /// Builds a source document with default configuration.
    pub fn build(snapshot: &MeshSnapshot) -> MeshDocResult<Self> {
        Self::build_with_config(snapshot, DocumentConfig::default())
    }

    /// Builds a source document with the given configuration.
    pub fn build_with_config(snapshot: &MeshSnapshot, config: DocumentConfig) -> MeshDocResult<Self> {
        let mut doc = MeshDocument::from_snapshot(snapshot, config)?;
        doc.triangulate();
        for vert in doc.verts.iter_mut().flatten() {
            vert.selected = false;
        }
        for edge in doc.edges.iter_mut().flatten() {
            edge.selected = false;
        }
        for face in doc.faces.iter_mut().flatten() {
            face.selected = false;
        }
        doc.dirty();
        Ok(Self {
            doc,
            hash: content_hash(snapshot),
        })
    }

    /// Content hash of the snapshot this document was built from.
    pub fn content_hash(&self) -> u64 {
        self.hash
    }
}

impl Deref for SourceDocument {
    type Target = MeshDocument;

    fn deref(&self) -> &MeshDocument {
        &self.doc
    }
}

/// Cache entry: the shared document and the hash it was built for.
#[derive(Debug)]
struct CacheEntry {
    hash: u64,
    doc: Rc<SourceDocument>,
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that built a new document.
    pub misses: u64,
    /// Entries replaced because their content hash changed.
    pub evictions: u64,
}

/// Source documents keyed by mesh name, rebuilt when the content changes.
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: HashMap<String, CacheEntry>,
    config: DocumentConfig,
    stats: CacheStats,
}

impl SourceCache {
    /// Creates an empty cache building with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache building with the given configuration.
    pub fn with_config(config: DocumentConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the cached document for `snapshot.name` if its content hash
    /// still matches, otherwise builds (and replaces) it.
    pub fn get_or_build(&mut self, snapshot: &MeshSnapshot) -> MeshDocResult<Rc<SourceDocument>> {
        let hash = content_hash(snapshot);
        if let Some(entry) = self.entries.get(&snapshot.name) {
            if entry.hash == hash {
                self.stats.hits += 1;
                debug!(name = %snapshot.name, hash, "Source cache hit");
                return Ok(Rc::clone(&entry.doc));
            }
            self.stats.evictions += 1;
            debug!(name = %snapshot.name, old = entry.hash, new = hash, "Source content changed, evicting");
        }
        self.stats.misses += 1;
        debug!(name = %snapshot.name, hash, "Source cache miss");

        let doc = Rc::new(SourceDocument::build_with_config(snapshot, self.config)?);
        self.entries.insert(
            snapshot.name.clone(),
            CacheEntry {
                hash,
                doc: Rc::clone(&doc),
            },
        );
        Ok(doc)
    }

    /// Drops the entry for `name`; returns whether one existed.
    pub fn evict(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Hit/miss/eviction counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
