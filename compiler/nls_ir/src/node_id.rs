//! Handles into the node heap.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Handle to a heap block.
///
/// A handle is a slot index plus the generation the slot had when the block
/// was allocated. Freed slots are reused with a bumped generation, so a stale
/// handle never silently aliases the block that took its place: the heap
/// rejects it as corruption.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        NodeId { index, generation }
    }

    /// Slot index inside the heap.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    pub(crate) const fn raw_index(self) -> u32 {
        self.index
    }

    /// Generation of the slot at allocation time.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl Hash for NodeId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        ((u64::from(self.generation) << 32) | u64::from(self.index)).hash(state);
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}v{})", self.index, self.generation)
    }
}
