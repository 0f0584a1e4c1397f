//! Textual rendering of node trees.
//!
//! Integers, variables and functions print bare, applications as `(f a b)`,
//! abstractions as `lambda x y.body` and lists as `[a b c]`. The output is a
//! pure function of the tree.

use std::fmt;

use nls_stack::ensure_sufficient_stack;

use crate::{Heap, NodeId, NodeKind};

/// `Display` adapter for the tree rooted at a node.
pub struct NodeDisplay<'a> {
    heap: &'a Heap,
    id: NodeId,
}

impl Heap {
    pub fn display(&self, id: NodeId) -> NodeDisplay<'_> {
        NodeDisplay { heap: self, id }
    }
}

impl fmt::Display for NodeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| write_node(self.heap, self.id, f))
    }
}

fn write_node(heap: &Heap, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match heap.kind(id) {
        NodeKind::Int(value) => write!(f, "{value}"),
        NodeKind::Var(var) => write!(f, "{}", var.name),
        NodeKind::Function(func) => write!(f, "{}", func.name),
        NodeKind::Abstraction(abs) => {
            f.write_str("lambda")?;
            for var in heap.list_items(abs.vars) {
                f.write_str(" ")?;
                write_child(heap, var, f)?;
            }
            f.write_str(".")?;
            write_child(heap, abs.body, f)
        }
        NodeKind::Application(app) => {
            f.write_str("(")?;
            write_child(heap, app.func, f)?;
            for arg in heap.list_items(app.args) {
                f.write_str(" ")?;
                write_child(heap, arg, f)?;
            }
            f.write_str(")")
        }
        NodeKind::List(_) => {
            f.write_str("[")?;
            write_items(heap, id, f)?;
            f.write_str("]")
        }
    }
}

fn write_child(heap: &Heap, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    ensure_sufficient_stack(|| write_node(heap, id, f))
}

fn write_items(heap: &Heap, list: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, item) in heap.list_items(list).enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write_child(heap, item, f)?;
    }
    Ok(())
}

impl fmt::Debug for NodeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} = {self}", self.id)
    }
}

#[cfg(test)]
mod tests;
