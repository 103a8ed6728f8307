//! # Spatial Index Cache
//!
//! Derived acceleration structures stamped with the document version they
//! were built at:
//!
//! - **Bounding box** over local vertex positions
//! - **BVH** over fan-triangulated faces ([`bvh::Bvh`])
//! - **Point index** over vertices ([`point_index::PointIndex`])
//!
//! A structure is trusted iff its stamp equals the current version. Stale
//! structures are rebuilt on access; fresh ones are returned as is.

pub mod bvh;
pub mod point_index;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub use bvh::{Bvh, BvhHit, BvhNearest, BvhTriangle};
pub use point_index::PointIndex;

/// Lazily rebuilt value keyed by a version stamp.
#[derive(Debug)]
pub(crate) struct VersionedCache<T> {
    slot: RefCell<Option<(u64, Rc<T>)>>,
    rebuilds: Cell<usize>,
}

impl<T> Default for VersionedCache<T> {
    fn default() -> Self {
        Self {
            slot: RefCell::new(None),
            rebuilds: Cell::new(0),
        }
    }
}

impl<T> VersionedCache<T> {
    /// Returns the cached value if stamped with `version`, else rebuilds.
    pub(crate) fn get(&self, version: u64, build: impl FnOnce() -> T) -> Rc<T> {
        if let Some((stamp, value)) = self.slot.borrow().as_ref() {
            if *stamp == version {
                return Rc::clone(value);
            }
        }
        let value = Rc::new(build());
        self.rebuilds.set(self.rebuilds.get() + 1);
        *self.slot.borrow_mut() = Some((version, Rc::clone(&value)));
        value
    }

    /// Number of rebuilds so far.
    pub(crate) fn rebuild_count(&self) -> usize {
        self.rebuilds.get()
    }
}

/// Rebuild counters of the three spatial caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RebuildCounts {
    /// Bounding box rebuilds.
    pub bbox: usize,
    /// BVH rebuilds.
    pub bvh: usize,
    /// Point index rebuilds.
    pub point_index: usize,
}
