//! Substitution chains.
//!
//! When an abstraction is built, every occurrence of each bound variable in
//! its body is threaded into a chain: the parameter's `Var::next` names the
//! slot holding the first occurrence, that occurrence's `next` names the
//! second, and so on. Applying the abstraction walks the chain and stores the
//! argument in each slot, with no search through the body.
//!
//! Links are [`Location`]s, not owning edges. A nested abstraction that binds
//! the same name hides its body from the outer parameter. When a parameter
//! name repeats in one parameter list, the last one binds.

use smallvec::SmallVec;

use crate::{Abstraction, AllocError, Edge, Heap, Ident, Location, NodeId, NodeKind};

impl Heap {
    /// Abstraction over the `Var` list `vars` with body `body`.
    ///
    /// Grabs both and links the body's occurrences of each parameter into
    /// that parameter's chain.
    #[track_caller]
    pub fn alloc_abstraction(&mut self, vars: NodeId, body: NodeId) -> Result<NodeId, AllocError> {
        for var in self.list_items(vars) {
            assert!(
                matches!(self.kind(var), NodeKind::Var(_)),
                "abstraction parameter {var:?} is a {}",
                self.kind(var).label()
            );
        }
        let arity = self.list_len(vars);
        let abs = self.alloc(NodeKind::Abstraction(Abstraction { vars, arity, body }))?;
        self.grab(vars);
        self.grab(body);
        self.link_chains(abs);
        Ok(abs)
    }

    /// Parameters and body of the abstraction `abs`.
    #[track_caller]
    pub fn abstraction_parts(&self, abs: NodeId) -> Abstraction {
        match self.kind(abs) {
            NodeKind::Abstraction(parts) => *parts,
            other => panic!("expected an abstraction at {abs:?}, found {}", other.label()),
        }
    }

    #[track_caller]
    fn var_name(&self, var: NodeId) -> &Ident {
        match self.kind(var) {
            NodeKind::Var(var) => &var.name,
            other => panic!("expected a variable at {var:?}, found {}", other.label()),
        }
    }

    /// First link of the chain starting at `var`.
    #[track_caller]
    pub fn var_next(&self, var: NodeId) -> Option<Location> {
        match self.kind(var) {
            NodeKind::Var(var) => var.next,
            other => panic!("expected a variable at {var:?}, found {}", other.label()),
        }
    }

    #[track_caller]
    pub(crate) fn set_var_next(&mut self, var: NodeId, next: Option<Location>) {
        match self.kind_mut(var) {
            NodeKind::Var(var) => var.next = next,
            other => panic!("expected a variable at {var:?}, found {}", other.label()),
        }
    }

    /// Node held in the slot `loc`.
    #[track_caller]
    pub fn child_at(&self, loc: Location) -> NodeId {
        match (self.kind(loc.parent), loc.edge) {
            (NodeKind::List(cons), Edge::Head) => cons.head,
            (NodeKind::Application(app), Edge::Func) => app.func,
            (NodeKind::Abstraction(abs), Edge::Body) => abs.body,
            (other, edge) => panic!(
                "broken substitution chain: {edge:?} slot on a {} at {:?}",
                other.label(),
                loc.parent
            ),
        }
    }

    /// Store `child` in the slot `loc`, returning the previous occupant.
    ///
    /// Reference counts are untouched: the slot's reference moves from the
    /// old child to the new one.
    #[track_caller]
    pub(crate) fn set_child(&mut self, loc: Location, child: NodeId) -> NodeId {
        let slot = match (self.kind_mut(loc.parent), loc.edge) {
            (NodeKind::List(cons), Edge::Head) => &mut cons.head,
            (NodeKind::Application(app), Edge::Func) => &mut app.func,
            (NodeKind::Abstraction(abs), Edge::Body) => &mut abs.body,
            (other, edge) => panic!(
                "broken substitution chain: {edge:?} slot on a {} at {:?}",
                other.label(),
                loc.parent
            ),
        };
        std::mem::replace(slot, child)
    }

    /// Store `child` in the slot `loc`, grabbing it and releasing the
    /// previous occupant.
    #[track_caller]
    pub fn replace_child(&mut self, loc: Location, child: NodeId) {
        self.grab(child);
        let old = self.set_child(loc, child);
        self.release(old);
    }

    fn link_chains(&mut self, abs: NodeId) {
        let vars = self.abstraction_parts(abs).vars;
        let params: SmallVec<[(NodeId, Ident); 4]> = self
            .list_items(vars)
            .map(|var| (var, self.var_name(var).clone()))
            .collect();

        let mut occurrences = Vec::new();
        for (i, (param, name)) in params.iter().enumerate() {
            if params[i + 1..].iter().any(|(_, later)| later == name) {
                self.set_var_next(*param, None);
                continue;
            }

            occurrences.clear();
            self.collect_occurrences(Location::new(abs, Edge::Body), name, &mut occurrences);

            let mut prev = *param;
            for &loc in &occurrences {
                self.set_var_next(prev, Some(loc));
                prev = self.child_at(loc);
            }
            self.set_var_next(prev, None);
        }
    }

    /// Slots under `root` holding a free occurrence of `name`, left to right.
    fn collect_occurrences(&self, root: Location, name: &Ident, out: &mut Vec<Location>) {
        let mut pending = vec![root];
        while let Some(loc) = pending.pop() {
            let node = self.child_at(loc);
            match self.kind(node) {
                NodeKind::Var(var) => {
                    if var.name == *name {
                        out.push(loc);
                    }
                }
                NodeKind::Int(_) | NodeKind::Function(_) => {}
                NodeKind::Abstraction(inner) => {
                    let rebinds = self
                        .list_items(inner.vars)
                        .any(|var| self.var_name(var) == name);
                    if !rebinds {
                        pending.push(Location::new(node, Edge::Body));
                    }
                }
                NodeKind::Application(app) => {
                    let cells: SmallVec<[NodeId; 4]> = self.list_cells(app.args).collect();
                    pending.extend(
                        cells
                            .into_iter()
                            .rev()
                            .map(|cell| Location::new(cell, Edge::Head)),
                    );
                    pending.push(Location::new(node, Edge::Func));
                }
                NodeKind::List(_) => {
                    let cells: SmallVec<[NodeId; 4]> = self.list_cells(node).collect();
                    pending.extend(
                        cells
                            .into_iter()
                            .rev()
                            .map(|cell| Location::new(cell, Edge::Head)),
                    );
                }
            }
        }
    }

    /// Store `arg` in every slot of `param`'s chain.
    ///
    /// Each slot grabs `arg` and releases the occurrence it held. The chain
    /// is consumed: `param` has no successor afterwards.
    #[track_caller]
    pub fn substitute(&mut self, param: NodeId, arg: NodeId) {
        let mut link = self.var_next(param);
        self.set_var_next(param, None);
        while let Some(loc) = link {
            let occurrence = self.child_at(loc);
            link = self.var_next(occurrence);
            self.replace_child(loc, arg);
        }
    }

    /// Remove the first `n` parameters of `abs`, which must keep at least
    /// one.
    #[track_caller]
    pub fn abstraction_drop_params(&mut self, abs: NodeId, n: usize) {
        let Abstraction { mut vars, arity, .. } = self.abstraction_parts(abs);
        assert!(
            n < arity,
            "dropping {n} of {arity} parameters from {abs:?}"
        );
        for _ in 0..n {
            vars = match self.list_remove_head(vars) {
                Some(rest) => rest,
                None => panic!("abstraction {abs:?} ran out of parameters"),
            };
        }
        if let NodeKind::Abstraction(parts) = self.kind_mut(abs) {
            parts.vars = vars;
            parts.arity = arity - n;
        }
    }
}

#[cfg(test)]
mod tests;
