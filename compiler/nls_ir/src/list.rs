//! Cons lists.
//!
//! A list is a chain of `List` cells, each owning its `head` and the next
//! cell. There is no empty list node: a list has at least one cell, and
//! "no list" is spelled `Option<NodeId>` where it matters. Argument lists,
//! parameter lists and sequence values all share this representation.

use crate::{AllocError, Cons, Heap, NodeId, NodeKind};

impl Heap {
    /// Single-cell list holding `item`. Grabs `item`.
    pub fn list(&mut self, item: NodeId) -> Result<NodeId, AllocError> {
        let id = self.alloc(NodeKind::List(Cons {
            head: item,
            rest: None,
        }))?;
        self.grab(item);
        Ok(id)
    }

    /// Build a list from `items` in order, grabbing each.
    ///
    /// Returns `None` for an empty slice.
    pub fn list_from(&mut self, items: &[NodeId]) -> Result<Option<NodeId>, AllocError> {
        match items.split_first() {
            Some((&first, rest)) => self.list_build(first, rest).map(Some),
            None => Ok(None),
        }
    }

    fn list_build(&mut self, first: NodeId, rest: &[NodeId]) -> Result<NodeId, AllocError> {
        let list = self.list(first)?;
        let mut last = list;
        for &item in rest {
            let cell = match self.list(item) {
                Ok(cell) => cell,
                Err(err) => {
                    self.discard(list);
                    return Err(err);
                }
            };
            self.set_rest(last, cell);
            last = cell;
        }
        Ok(list)
    }

    #[track_caller]
    fn cons(&self, cell: NodeId) -> Cons {
        match self.kind(cell) {
            NodeKind::List(cons) => *cons,
            other => panic!("expected a list cell at {cell:?}, found {}", other.label()),
        }
    }

    /// Link `next` after the last cell `cell` and grab it.
    #[track_caller]
    fn set_rest(&mut self, cell: NodeId, next: NodeId) {
        match self.kind_mut(cell) {
            NodeKind::List(cons) => {
                debug_assert!(cons.rest.is_none());
                cons.rest = Some(next);
            }
            other => panic!("expected a list cell at {cell:?}, found {}", other.label()),
        }
        self.grab(next);
    }

    /// Last cell of `list`.
    ///
    /// Panics on a non-list or a cycle.
    #[track_caller]
    fn list_tail(&self, list: NodeId) -> NodeId {
        let mut cell = list;
        let mut steps = 0usize;
        while let Some(next) = self.cons(cell).rest {
            steps += 1;
            assert!(steps <= self.live(), "cycle in list starting at {list:?}");
            cell = next;
        }
        cell
    }

    /// Append `item` at the end of `list`. Grabs `item`.
    #[track_caller]
    pub fn list_push(&mut self, list: NodeId, item: NodeId) -> Result<(), AllocError> {
        let tail = self.list_tail(list);
        let cell = self.list(item)?;
        self.set_rest(tail, cell);
        Ok(())
    }

    /// Splice `tail` onto the end of `list`. Grabs `tail`.
    #[track_caller]
    pub fn list_concat(&mut self, list: NodeId, tail: NodeId) {
        assert_ne!(list, tail, "list concatenated onto itself");
        self.cons(tail);
        let last = self.list_tail(list);
        self.set_rest(last, tail);
    }

    /// Drop the first cell of `list`, consuming the caller's reference.
    ///
    /// Returns the remainder with a reference held for the caller, or `None`
    /// when `list` had a single cell.
    #[track_caller]
    pub fn list_remove_head(&mut self, list: NodeId) -> Option<NodeId> {
        let rest = self.cons(list).rest;
        if let Some(rest) = rest {
            self.grab(rest);
        }
        self.release(list);
        rest
    }

    /// Number of cells in `list`.
    #[track_caller]
    pub fn list_len(&self, list: NodeId) -> usize {
        self.list_cells(list).count()
    }

    /// Cells of `list`, first to last.
    pub fn list_cells(&self, list: NodeId) -> ListCells<'_> {
        ListCells {
            heap: self,
            cell: Some(list),
        }
    }

    /// Heads of `list`, first to last.
    pub fn list_items(&self, list: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.list_cells(list).map(|cell| self.cons(cell).head)
    }

    /// Fresh cells over the same heads. Each head gains a reference.
    #[track_caller]
    pub fn list_share(&mut self, list: NodeId) -> Result<NodeId, AllocError> {
        let first = self.cons(list).head;
        let rest: Vec<NodeId> = self.list_items(list).skip(1).collect();
        self.list_build(first, &rest)
    }
}

/// Iterator over the cells of a list.
pub struct ListCells<'a> {
    heap: &'a Heap,
    cell: Option<NodeId>,
}

impl Iterator for ListCells<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cell = self.cell?;
        self.cell = self.heap.cons(cell).rest;
        Some(cell)
    }
}
