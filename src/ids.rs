//! Process-wide identity allocation for dungeon objects.
//!
//! Objects are identified by a 64-bit id drawn from a monotonic counter.
//! Identity in the entity graph is by reference (arena key), never by this
//! id; the id exists for logging, reset/threat back-references, and
//! external correlation only (spec.md §3.4).

use std::sync::atomic::{AtomicU64, Ordering};

/// A stable 64-bit identifier for a dungeon object.
///
/// Also doubles as a "weak reference": holding an `ObjectId` after its
/// referent has been destroyed is harmless, it simply fails to resolve
/// against the arena (see `entity::graph::Graph::get`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Process-wide monotonic id allocator. One instance is owned by the
/// `Graph` that allocates every object in the process.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        IdAllocator { next: AtomicU64::new(1) }
    }

    pub fn next(&self) -> ObjectId {
        ObjectId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let alloc = IdAllocator::new();
        let a = alloc.next();
        let b = alloc.next();
        assert!(a.0 < b.0);
    }
}
