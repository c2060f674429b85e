//! Per-node monoid cache with lazy recomputation.
//!
//! Structural writes only flip `dirty` flags; the folded value is rebuilt on
//! the next read from the children's own cached values.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use crate::monoid::MonoidId;

/// One cached aggregate.
struct CacheEntry {
    dirty: bool,
    value: Box<dyn Any>,
}

/// Cached aggregates of one internal node, keyed by monoid identity.
#[derive(Default)]
pub struct MonoidalCache {
    entries: HashMap<MonoidId, CacheEntry>,
}

impl MonoidalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clean cached value for `id`, if any.
    ///
    /// An entry stored under the same id with a different value type counts
    /// as a miss and is overwritten by the next `store`.
    pub fn lookup<V: Clone + 'static>(&self, id: MonoidId) -> Option<V> {
        let entry = self.entries.get(&id)?;
        if entry.dirty {
            return None;
        }
        entry.value.downcast_ref::<V>().cloned()
    }

    pub fn store<V: 'static>(&mut self, id: MonoidId, value: V) {
        self.entries.insert(
            id,
            CacheEntry {
                dirty: false,
                value: Box::new(value),
            },
        );
    }

    /// Mark every entry dirty.
    pub fn invalidate(&mut self) {
        for entry in self.entries.values_mut() {
            entry.dirty = true;
        }
    }

    /// Whether an entry exists and is clean.
    pub fn is_fresh(&self, id: MonoidId) -> bool {
        self.entries.get(&id).map_or(false, |entry| !entry.dirty)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for MonoidalCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dirty = self.entries.values().filter(|e| e.dirty).count();
        f.debug_struct("MonoidalCache")
            .field("entries", &self.entries.len())
            .field("dirty", &dirty)
            .finish()
    }
}
