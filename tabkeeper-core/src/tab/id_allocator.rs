//! Session-wide tab id allocation

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use super::types::TabId;

/// Hands out monotonically increasing tab ids.
///
/// Clones share the same counter, so one allocator passed to every window
/// and both browsing modes guarantees session-wide uniqueness. Ids are never
/// reused; after restoring persisted tabs call [`Self::ensure_above`] so new
/// ids do not collide with restored ones.
#[derive(Debug, Clone, Default)]
pub struct TabIdAllocator {
    next: Arc<AtomicI32>,
}

impl TabIdAllocator {
    /// Creates an allocator starting at id 0
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator whose first id is `first`
    #[must_use]
    pub fn starting_at(first: i32) -> Self {
        Self {
            next: Arc::new(AtomicI32::new(first.max(0))),
        }
    }

    /// Allocates the next id
    pub fn allocate(&self) -> TabId {
        TabId::new(self.next.fetch_add(1, Ordering::SeqCst))
    }

    /// Makes sure future ids are strictly greater than `id`
    pub fn ensure_above(&self, id: TabId) {
        if id.is_valid() {
            self.next.fetch_max(id.get().saturating_add(1), Ordering::SeqCst);
        }
    }

    /// Returns the id the next call to [`Self::allocate`] would return
    #[must_use]
    pub fn peek(&self) -> TabId {
        TabId::new(self.next.load(Ordering::SeqCst))
    }
}
