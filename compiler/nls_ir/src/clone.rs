//! Deep copies and in-place rewrites.
//!
//! A clone never aliases the source's substitution chains: variables are
//! copied without links, and each cloned abstraction rebuilds its chains by
//! translating every source location through the old-to-new handle map.
//! Nodes shared inside the source stay shared inside the copy, except
//! variables: every occurrence gets its own node so that it can join a chain.

use nls_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;

use crate::{
    Abstraction, AllocError, Application, Cons, Heap, Location, NodeId, NodeKind, NodeTag, Var,
};

type CloneMap = FxHashMap<NodeId, NodeId>;

impl Heap {
    /// Copy the tree under `src` into fresh nodes. The copy has zero
    /// references.
    pub fn deep_clone(&mut self, src: NodeId) -> Result<NodeId, AllocError> {
        let mut map = CloneMap::default();
        self.clone_node(src, &mut map)
    }

    /// Replace the payload of `dst` with a copy of `src`'s tree, releasing
    /// what `dst` held before.
    ///
    /// Handles to `dst` observe the copy. `dst` keeps its references.
    pub fn clone_into(&mut self, dst: NodeId, src: NodeId) -> Result<(), AllocError> {
        assert_ne!(dst, src, "node {dst:?} cloned into itself");
        let mut map = CloneMap::default();
        map.insert(src, dst);
        let kind = self.clone_kind(src, &mut map)?;
        let is_abstraction = matches!(kind, NodeKind::Abstraction(_));
        let old = self.replace_kind(dst, kind);
        if is_abstraction {
            self.copy_chains(src, &map);
        }
        self.release_children(&old);
        Ok(())
    }

    /// Move `with` into the slot `slot`, consuming the caller's reference
    /// to `with`.
    ///
    /// Whatever `slot` held is released first. If the caller then holds the
    /// only reference to `with`, its payload moves into `slot` and its block
    /// is freed; a moved abstraction's chains are retargeted at `slot`.
    /// Otherwise `slot` receives a deep copy.
    #[track_caller]
    pub fn overwrite(&mut self, slot: NodeId, with: NodeId) -> Result<(), AllocError> {
        assert_ne!(slot, with, "node {slot:?} overwritten with itself");
        let old = self.replace_kind(slot, NodeKind::Int(0));
        self.release_children(&old);

        if self.is_last_ref(with) {
            let Some(kind) = self.free_slot(with) else {
                panic!("node {with:?} has no payload");
            };
            let moved = match &kind {
                NodeKind::Abstraction(abs) => Some(*abs),
                _ => None,
            };
            self.replace_kind(slot, kind);
            if let Some(abs) = moved {
                self.retarget_chains(abs, with, slot);
            }
            Ok(())
        } else {
            let result = self.clone_into(slot, with);
            self.release(with);
            result
        }
    }

    /// Point chain links whose parent is `from` at `to`.
    fn retarget_chains(&mut self, abs: Abstraction, from: NodeId, to: NodeId) {
        let params: Vec<NodeId> = self.list_items(abs.vars).collect();
        for param in params {
            let mut var = param;
            while let Some(mut loc) = self.var_next(var) {
                if loc.parent == from {
                    loc.parent = to;
                    self.set_var_next(var, Some(loc));
                }
                var = self.child_at(loc);
            }
        }
    }

    fn clone_node(&mut self, src: NodeId, map: &mut CloneMap) -> Result<NodeId, AllocError> {
        if let Some(&copy) = map.get(&src) {
            if self.tag(src) != NodeTag::Var {
                return Ok(copy);
            }
        }
        ensure_sufficient_stack(|| {
            let copy = self.alloc(NodeKind::Int(0))?;
            map.insert(src, copy);
            let kind = match self.clone_kind(src, map) {
                Ok(kind) => kind,
                Err(err) => {
                    self.discard(copy);
                    return Err(err);
                }
            };
            let is_abstraction = matches!(kind, NodeKind::Abstraction(_));
            self.replace_kind(copy, kind);
            if is_abstraction {
                self.copy_chains(src, map);
            }
            Ok(copy)
        })
    }

    /// Clone of `src` linked into a new parent: grabbed on success.
    fn clone_child(&mut self, src: NodeId, map: &mut CloneMap) -> Result<NodeId, AllocError> {
        let copy = self.clone_node(src, map)?;
        Ok(self.grab(copy))
    }

    /// Payload for the copy of `src`, with children cloned and grabbed.
    fn clone_kind(&mut self, src: NodeId, map: &mut CloneMap) -> Result<NodeKind, AllocError> {
        let kind = match self.kind(src).clone() {
            NodeKind::Var(var) => NodeKind::Var(Var::new(var.name)),
            leaf @ (NodeKind::Int(_) | NodeKind::Function(_)) => leaf,
            NodeKind::Abstraction(abs) => {
                let (vars, body) = self.clone_pair(abs.vars, abs.body, map)?;
                NodeKind::Abstraction(Abstraction {
                    vars,
                    arity: abs.arity,
                    body,
                })
            }
            NodeKind::Application(app) => {
                let (func, args) = self.clone_pair(app.func, app.args, map)?;
                NodeKind::Application(Application { func, args })
            }
            NodeKind::List(cons) => {
                let head = self.clone_child(cons.head, map)?;
                let rest = match cons.rest {
                    Some(rest) => match self.clone_child(rest, map) {
                        Ok(rest) => Some(rest),
                        Err(err) => {
                            self.release(head);
                            return Err(err);
                        }
                    },
                    None => None,
                };
                NodeKind::List(Cons { head, rest })
            }
        };
        Ok(kind)
    }

    fn clone_pair(
        &mut self,
        first: NodeId,
        second: NodeId,
        map: &mut CloneMap,
    ) -> Result<(NodeId, NodeId), AllocError> {
        let first = self.clone_child(first, map)?;
        match self.clone_child(second, map) {
            Ok(second) => Ok((first, second)),
            Err(err) => {
                self.release(first);
                Err(err)
            }
        }
    }

    /// Rebuild the chains of the copy of abstraction `src`.
    fn copy_chains(&mut self, src: NodeId, map: &CloneMap) {
        let translate = |node: NodeId| match map.get(&node) {
            Some(&copy) => copy,
            None => panic!("chain reaches {node:?}, which was not cloned"),
        };
        let params: Vec<NodeId> = self
            .list_items(self.abstraction_parts(src).vars)
            .collect();
        for param in params {
            let mut var = param;
            while let Some(loc) = self.var_next(var) {
                let copied = Location::new(translate(loc.parent), loc.edge);
                self.set_var_next(translate(var), Some(copied));
                var = self.child_at(loc);
            }
        }
    }
}

#[cfg(test)]
mod tests;
