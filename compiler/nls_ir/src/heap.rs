//! Reference-counted node heap.
//!
//! Every node lives in a [`Heap`] slot addressed by a [`NodeId`]. A slot
//! carries a validity tag, a generation and a reference count. Fresh nodes
//! start at zero references: the creator owns them until it links them into
//! a parent (which grabs) or grabs them itself. Releasing the last reference
//! tears the node down and releases its children.
//!
//! Misuse (releasing at zero, touching a freed slot, a stale handle into a
//! reused slot) is a bug in the caller and panics with the offending handle.
//! Running out of capacity is an [`AllocError`].
//!
//! [`Heap::shutdown`] audits the heap: every allocation must be matched by a
//! free or reported as a leak.

use std::fmt;

use smallvec::SmallVec;

use crate::{Application, Builtin, Function, Ident, NodeId, NodeKind, NodeTag, Var};

/// Validity tag of an occupied slot.
const MAGIC_LIVE: u32 = 0x2315_3e3c;
/// Validity tag of a vacant slot.
const MAGIC_FREED: u32 = 0x2315_3c20;

/// Allocation failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The configured live-node ceiling was hit.
    LimitReached { limit: usize },
    /// The backing storage could not grow.
    Exhausted,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::LimitReached { limit } => {
                write!(f, "node limit of {limit} reached")
            }
            AllocError::Exhausted => write!(f, "node storage exhausted"),
        }
    }
}

impl std::error::Error for AllocError {}

struct Block {
    magic: u32,
    generation: u32,
    refs: u32,
    kind: Option<NodeKind>,
}

/// One block still live at shutdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeakedBlock {
    pub id: NodeId,
    pub label: &'static str,
    pub refs: u32,
}

/// Outcome of [`Heap::shutdown`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LeakReport {
    /// Total allocations over the heap's lifetime.
    pub allocations: usize,
    /// Frees performed through normal release, excluding forced ones.
    pub frees: usize,
    pub leaks: Vec<LeakedBlock>,
}

impl LeakReport {
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.leaks.is_empty()
    }
}

/// Node storage with reference counting and a leak audit.
pub struct Heap {
    blocks: Vec<Block>,
    /// Vacant slot indices, reused last-in first-out.
    vacant: Vec<u32>,
    allocations: usize,
    frees: usize,
    live: usize,
    max_nodes: Option<usize>,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Heap {
    /// Create an empty heap without a node ceiling.
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// Create an empty heap that refuses to hold more than `max_nodes` live
    /// nodes at once.
    pub fn with_limit(max_nodes: Option<usize>) -> Self {
        Heap {
            blocks: Vec::new(),
            vacant: Vec::new(),
            allocations: 0,
            frees: 0,
            live: 0,
            max_nodes,
        }
    }

    #[inline]
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    #[inline]
    pub fn frees(&self) -> usize {
        self.frees
    }

    /// Number of currently allocated nodes.
    #[inline]
    pub fn live(&self) -> usize {
        self.live
    }

    /// Store `kind` in a fresh slot with zero references.
    ///
    /// The children named by `kind` are not grabbed; the typed constructors
    /// do that.
    pub(crate) fn alloc(&mut self, kind: NodeKind) -> Result<NodeId, AllocError> {
        if let Some(limit) = self.max_nodes {
            if self.live >= limit {
                return Err(AllocError::LimitReached { limit });
            }
        }

        let id = if let Some(index) = self.vacant.pop() {
            let block = &mut self.blocks[index as usize];
            debug_assert_eq!(block.magic, MAGIC_FREED);
            block.magic = MAGIC_LIVE;
            block.refs = 0;
            block.kind = Some(kind);
            NodeId::new(index, block.generation)
        } else {
            let Ok(index) = u32::try_from(self.blocks.len()) else {
                return Err(AllocError::Exhausted);
            };
            self.blocks
                .try_reserve(1)
                .map_err(|_| AllocError::Exhausted)?;
            self.blocks.push(Block {
                magic: MAGIC_LIVE,
                generation: 0,
                refs: 0,
                kind: Some(kind),
            });
            NodeId::new(index, 0)
        };

        self.allocations += 1;
        self.live += 1;
        Ok(id)
    }

    pub fn alloc_int(&mut self, value: i64) -> Result<NodeId, AllocError> {
        self.alloc(NodeKind::Int(value))
    }

    pub fn alloc_var(&mut self, name: Ident) -> Result<NodeId, AllocError> {
        self.alloc(NodeKind::Var(Var::new(name)))
    }

    /// Function node for `builtin`, registered under `name`.
    pub fn alloc_function(&mut self, name: Ident, builtin: Builtin) -> Result<NodeId, AllocError> {
        self.alloc(NodeKind::Function(Function {
            name,
            arity: builtin.arity(),
            builtin,
        }))
    }

    /// Application of `func` to the non-empty list `args`. Grabs both.
    #[track_caller]
    pub fn alloc_application(
        &mut self,
        func: NodeId,
        args: NodeId,
    ) -> Result<NodeId, AllocError> {
        assert_eq!(
            self.tag(args),
            NodeTag::List,
            "application arguments must be a list, got {}",
            self.tag(args).label()
        );
        let id = self.alloc(NodeKind::Application(Application { func, args }))?;
        self.grab(func);
        self.grab(args);
        Ok(id)
    }

    #[track_caller]
    fn block(&self, id: NodeId) -> &Block {
        match self.blocks.get(id.index()) {
            Some(block) if block.magic == MAGIC_LIVE && block.generation == id.generation() => {
                block
            }
            Some(block) if block.magic == MAGIC_LIVE => panic!(
                "stale handle {id:?}: slot now holds generation {}",
                block.generation
            ),
            Some(block) if block.magic == MAGIC_FREED => panic!("use of freed node {id:?}"),
            Some(block) => panic!("corrupt block {id:?}: bad tag {:#x}", block.magic),
            None => panic!("handle {id:?} out of range ({} slots)", self.blocks.len()),
        }
    }

    #[track_caller]
    fn block_mut(&mut self, id: NodeId) -> &mut Block {
        // Validate through the shared path so diagnostics stay in one place.
        self.block(id);
        &mut self.blocks[id.index()]
    }

    /// Payload of a live node.
    #[track_caller]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        match &self.block(id).kind {
            Some(kind) => kind,
            None => panic!("node {id:?} is being torn down"),
        }
    }

    #[track_caller]
    pub(crate) fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        match &mut self.block_mut(id).kind {
            Some(kind) => kind,
            None => panic!("node {id:?} is being torn down"),
        }
    }

    /// Swap the payload of `id`, returning the old one.
    ///
    /// The old payload's children keep their references; the caller decides
    /// whether to release them.
    #[track_caller]
    pub(crate) fn replace_kind(&mut self, id: NodeId, kind: NodeKind) -> NodeKind {
        std::mem::replace(self.kind_mut(id), kind)
    }

    #[inline]
    #[track_caller]
    pub fn tag(&self, id: NodeId) -> NodeTag {
        self.kind(id).tag()
    }

    #[track_caller]
    pub fn ref_count(&self, id: NodeId) -> u32 {
        self.block(id).refs
    }

    /// Whether the caller's reference is the only one.
    #[track_caller]
    pub fn is_last_ref(&self, id: NodeId) -> bool {
        self.ref_count(id) == 1
    }

    /// Add a reference to `id`.
    #[track_caller]
    pub fn grab(&mut self, id: NodeId) -> NodeId {
        let block = self.block_mut(id);
        block.refs = match block.refs.checked_add(1) {
            Some(refs) => refs,
            None => panic!("reference count overflow on {id:?}"),
        };
        id
    }

    /// Drop a reference to `id`, tearing the node down at zero.
    #[track_caller]
    pub fn release(&mut self, id: NodeId) {
        let block = self.block_mut(id);
        if block.refs == 0 {
            let label = block.kind.as_ref().map_or("?", NodeKind::label);
            panic!("release of unreferenced {label} node {id:?}");
        }
        block.refs -= 1;
        if block.refs == 0 {
            self.teardown(id);
        }
    }

    /// Tear down a node that was allocated but never grabbed.
    #[track_caller]
    pub fn discard(&mut self, id: NodeId) {
        let refs = self.ref_count(id);
        assert_eq!(refs, 0, "discard of {id:?} still holding {refs} references");
        self.teardown(id);
    }

    /// Free `root` and every child whose count drops to zero as a result.
    ///
    /// Iterative, so long lists do not recurse.
    fn teardown(&mut self, root: NodeId) {
        let mut pending: SmallVec<[NodeId; 8]> = SmallVec::new();
        pending.push(root);
        while let Some(id) = pending.pop() {
            let Some(kind) = self.free_slot(id) else {
                continue;
            };
            for child in kind.children() {
                let block = self.block_mut(child);
                if block.refs == 0 {
                    panic!("child {child:?} of freed node {id:?} has no references");
                }
                block.refs -= 1;
                if block.refs == 0 {
                    pending.push(child);
                }
            }
        }
    }

    /// Mark the slot of `id` vacant and hand back its payload.
    ///
    /// Children of the payload are not released.
    #[track_caller]
    pub(crate) fn free_slot(&mut self, id: NodeId) -> Option<NodeKind> {
        let block = self.block_mut(id);
        let kind = block.kind.take();
        block.magic = MAGIC_FREED;
        block.refs = 0;
        block.generation = block.generation.wrapping_add(1);
        self.vacant.push(id.raw_index());
        self.frees += 1;
        self.live -= 1;
        kind
    }

    /// Release the children a detached payload owns.
    #[track_caller]
    pub(crate) fn release_children(&mut self, kind: &NodeKind) {
        for child in kind.children() {
            self.release(child);
        }
    }

    /// Audit and dismantle the heap.
    ///
    /// Every block still live is reported as a leak, then force-freed. Panics
    /// if the allocation and free counts do not add up.
    pub fn shutdown(mut self) -> LeakReport {
        let mut leaks = Vec::new();
        for (index, block) in self.blocks.iter().enumerate() {
            if block.magic != MAGIC_LIVE {
                continue;
            }
            let Ok(index) = u32::try_from(index) else {
                continue;
            };
            let leaked = LeakedBlock {
                id: NodeId::new(index, block.generation),
                label: block.kind.as_ref().map_or("?", NodeKind::label),
                refs: block.refs,
            };
            tracing::warn!(
                id = ?leaked.id,
                label = leaked.label,
                refs = leaked.refs,
                "node leaked at heap shutdown"
            );
            leaks.push(leaked);
        }

        assert_eq!(
            self.allocations,
            self.frees + leaks.len(),
            "heap accounting mismatch: {} allocations, {} frees, {} leaked",
            self.allocations,
            self.frees,
            leaks.len()
        );

        let report = LeakReport {
            allocations: self.allocations,
            frees: self.frees,
            leaks,
        };
        for leaked in &report.leaks {
            self.free_slot(leaked.id);
        }
        report
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("live", &self.live)
            .field("allocations", &self.allocations)
            .field("frees", &self.frees)
            .field("max_nodes", &self.max_nodes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
