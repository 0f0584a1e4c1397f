//! Variable resolution and application.

use nls_ir::{Application, Edge, Function, Ident, Location, NodeId, NodeKind, NodeTag};
use smallvec::SmallVec;

use super::Runtime;
use crate::errors::{not_callable, too_many_arguments, unbound_symbol, EvalResult};

/// Prefix of the anonymous variables introduced by currying.
const CURRY_PREFIX: &str = "$";

impl Runtime {
    /// Replace the variable `node` with a copy of its binding.
    pub(super) fn resolve(&mut self, node: NodeId) -> EvalResult {
        let name = match self.heap.kind(node) {
            NodeKind::Var(var) => var.name.clone(),
            other => panic!("resolve on a {} at {node:?}", other.label()),
        };
        let Some(value) = self.symbols.search(&name) else {
            return Err(unbound_symbol(name.as_str()));
        };
        self.heap.clone_into(node, value)?;
        Ok(())
    }

    /// One step on the application `app`, dispatched on its operator.
    pub(super) fn apply(&mut self, app: NodeId, depth: usize) -> EvalResult {
        let Application { func, args } = match self.heap.kind(app) {
            NodeKind::Application(parts) => *parts,
            other => panic!("apply on a {} at {app:?}", other.label()),
        };
        match self.heap.tag(func) {
            NodeTag::Var | NodeTag::Application => self.reduce_at(func, depth + 1),
            NodeTag::Function => self.apply_function(app, func, args, depth),
            NodeTag::Abstraction => self.apply_abstraction(app, func, args),
            tag @ (NodeTag::Int | NodeTag::List) => Err(not_callable(tag.label())),
        }
    }

    fn apply_function(
        &mut self,
        app: NodeId,
        func: NodeId,
        args: NodeId,
        depth: usize,
    ) -> EvalResult {
        let Function {
            name,
            arity,
            builtin,
        } = match self.heap.kind(func) {
            NodeKind::Function(function) => function.clone(),
            other => panic!("expected a function at {func:?}, found {}", other.label()),
        };
        let supplied = self.heap.list_len(args);

        if supplied > arity {
            return Err(too_many_arguments(name.as_str(), arity, supplied));
        }
        if supplied < arity {
            return self.curry(app, func, args, &name, arity - supplied);
        }

        let result = self.call_builtin(builtin, args, depth)?;
        self.heap.overwrite(app, result)?;
        Ok(())
    }

    /// Turn the under-supplied call `app` into
    /// `lambda $0 .. $n.(func args.. $0 .. $n)`.
    ///
    /// The parameter variables and the trailing argument variables are
    /// distinct nodes that share names; construction links the latter into
    /// the former's chains.
    fn curry(
        &mut self,
        app: NodeId,
        func: NodeId,
        args: NodeId,
        name: &Ident,
        missing: usize,
    ) -> EvalResult {
        let heap = &mut self.heap;

        let call_args = heap.list_share(args)?;
        let extra = match fresh_vars(heap, missing) {
            Ok(extra) => extra,
            Err(err) => {
                heap.discard(call_args);
                return Err(err.into());
            }
        };
        heap.list_concat(call_args, extra);

        let call = match heap.alloc_application(func, call_args) {
            Ok(call) => call,
            Err(err) => {
                heap.discard(call_args);
                return Err(err.into());
            }
        };
        let params = match fresh_vars(heap, missing) {
            Ok(params) => params,
            Err(err) => {
                heap.discard(call);
                return Err(err.into());
            }
        };
        let curried = match heap.alloc_abstraction(params, call) {
            Ok(curried) => curried,
            Err(err) => {
                heap.discard(params);
                heap.discard(call);
                return Err(err.into());
            }
        };

        tracing::debug!(
            function = %name,
            supplied = heap.list_len(args),
            missing,
            "curried built-in"
        );
        heap.grab(curried);
        heap.overwrite(app, curried)?;
        Ok(())
    }

    /// Bind the arguments of `app` to the parameters of the abstraction in
    /// its operator slot.
    ///
    /// With fewer arguments than parameters the abstraction, minus the bound
    /// parameters, replaces `app`. Otherwise the substituted body does.
    fn apply_abstraction(&mut self, app: NodeId, func: NodeId, args: NodeId) -> EvalResult {
        let arity = self.heap.abstraction_parts(func).arity;
        let supplied = self.heap.list_len(args);
        if supplied > arity {
            return Err(too_many_arguments("lambda", arity, supplied));
        }

        let abs = self.unshare_operator(app, func)?;
        let heap = &mut self.heap;
        let params: SmallVec<[NodeId; 4]> = heap
            .list_items(heap.abstraction_parts(abs).vars)
            .take(supplied)
            .collect();
        let values: SmallVec<[NodeId; 4]> = heap.list_items(args).collect();
        for (param, value) in params.into_iter().zip(values) {
            heap.substitute(param, value);
        }

        let replacement = if supplied < arity {
            heap.abstraction_drop_params(abs, supplied);
            tracing::debug!(supplied, remaining = arity - supplied, "partial application");
            abs
        } else {
            heap.abstraction_parts(abs).body
        };
        heap.grab(replacement);
        heap.overwrite(app, replacement)?;
        Ok(())
    }

    /// Give `app` a private copy of its operator abstraction if anything
    /// else holds it, so substitution never mutates a shared value.
    fn unshare_operator(&mut self, app: NodeId, func: NodeId) -> EvalResult<NodeId> {
        if self.heap.is_last_ref(func) {
            return Ok(func);
        }
        let copy = self.heap.deep_clone(func)?;
        self.heap
            .replace_child(Location::new(app, Edge::Func), copy);
        Ok(copy)
    }
}

/// List of `count` fresh variables named `$0`, `$1`, ...
fn fresh_vars(heap: &mut nls_ir::Heap, count: usize) -> Result<NodeId, nls_ir::AllocError> {
    let first = heap.alloc_var(curry_name(0))?;
    let list = match heap.list(first) {
        Ok(list) => list,
        Err(err) => {
            heap.discard(first);
            return Err(err);
        }
    };
    for index in 1..count {
        let pushed = heap
            .alloc_var(curry_name(index))
            .and_then(|var| match heap.list_push(list, var) {
                Ok(()) => Ok(()),
                Err(err) => {
                    heap.discard(var);
                    Err(err)
                }
            });
        if let Err(err) = pushed {
            heap.discard(list);
            return Err(err);
        }
    }
    Ok(list)
}

fn curry_name(index: usize) -> Ident {
    Ident::new(&format!("{CURRY_PREFIX}{index}"))
}
