//! Slot arena with free-list reuse.
//!
//! Nodes refer to each other by `NodeId` instead of owning pointers, so the
//! parent back-links never form reference cycles. Freed slots are recycled
//! on the next allocation under a new generation.

use crate::types::{NodeId, NULL_NODE};

/// Statistics for an arena
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaStats {
    pub total_capacity: usize,
    pub allocated_count: usize,
    pub free_count: usize,
    pub utilization: f64,
}

/// Bumped each time a slot is vacated.
type Generation = u32;

#[derive(Debug)]
struct Slot<T> {
    generation: Generation,
    item: Option<T>,
}

/// Arena allocator handing out generational `NodeId`s.
///
/// An id packs the slot index into its low 32 bits and the slot's
/// generation into the high 32 bits. A stale id resolves to `None` even
/// after its slot has been reused.
#[derive(Debug)]
pub struct Arena<T> {
    storage: Vec<Slot<T>>,
    /// Free slot indices for reuse
    free_list: Vec<usize>,
}

impl<T> Arena<T> {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self {
            storage: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Create a new arena with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Vec::with_capacity(capacity),
            free_list: Vec::new(),
        }
    }

    /// Allocate a new item in the arena and return its ID
    #[inline]
    pub fn allocate(&mut self, item: T) -> NodeId {
        if let Some(free_index) = self.free_list.pop() {
            let slot = &mut self.storage[free_index];
            slot.item = Some(item);
            return Self::pack(free_index, slot.generation);
        }

        let index = self.storage.len();
        // Index u32::MAX is reserved for NULL_NODE.
        debug_assert!(index < u32::MAX as usize);
        self.storage.push(Slot {
            generation: 0,
            item: Some(item),
        });
        Self::pack(index, 0)
    }

    /// Deallocate an item and hand it back
    #[inline]
    pub fn deallocate(&mut self, id: NodeId) -> Option<T> {
        let index = self.live_slot(id)?;
        let slot = &mut self.storage[index];
        let item = slot.item.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(index);
        Some(item)
    }

    /// Get a reference to an item in the arena
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        let index = self.live_slot(id)?;
        self.storage[index].item.as_ref()
    }

    /// Get a mutable reference to an item in the arena
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        let index = self.live_slot(id)?;
        self.storage[index].item.as_mut()
    }

    /// Check if an ID is valid and allocated
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Get the number of allocated items
    pub fn len(&self) -> usize {
        self.storage.len() - self.free_list.len()
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the number of free slots
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Drop every item. Slots are kept with bumped generations, so ids
    /// issued before the clear stay dead.
    pub fn clear(&mut self) {
        self.free_list.clear();
        for (index, slot) in self.storage.iter_mut().enumerate().rev() {
            if slot.item.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free_list.push(index);
        }
    }

    /// Get arena statistics
    pub fn stats(&self) -> ArenaStats {
        let total_capacity = self.storage.capacity();
        let allocated_count = self.len();
        let utilization = if total_capacity > 0 {
            allocated_count as f64 / total_capacity as f64
        } else {
            0.0
        };

        ArenaStats {
            total_capacity,
            allocated_count,
            free_count: self.free_list.len(),
            utilization,
        }
    }

    #[inline]
    fn pack(index: usize, generation: Generation) -> NodeId {
        (NodeId::from(generation) << 32) | index as NodeId
    }

    /// Slot index of `id` if the slot exists and its generation matches.
    #[inline]
    fn live_slot(&self, id: NodeId) -> Option<usize> {
        if id == NULL_NODE {
            return None;
        }
        let index = usize::try_from(id & NodeId::from(u32::MAX)).ok()?;
        let generation = Generation::try_from(id >> 32).ok()?;
        let slot = self.storage.get(index)?;
        (slot.generation == generation).then_some(index)
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}
