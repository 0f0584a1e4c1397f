//! Native routines bound in every fresh symbol table.

use nls_ir::{AllocError, Builtin, Ident, NodeId, NodeKind};
use smallvec::SmallVec;

use super::Runtime;
use crate::errors::{
    division_by_zero, integer_overflow, modulo_by_zero, type_mismatch, EvalResult,
};

/// Names installed at startup, aliases included.
pub const BUILTINS: &[(&str, Builtin)] = &[
    ("add", Builtin::Add),
    ("+", Builtin::Add),
    ("sub", Builtin::Sub),
    ("-", Builtin::Sub),
    ("mul", Builtin::Mul),
    ("*", Builtin::Mul),
    ("div", Builtin::Div),
    ("/", Builtin::Div),
    ("mod", Builtin::Mod),
    ("%", Builtin::Mod),
    ("abst", Builtin::Abst),
    ("lambda", Builtin::Abst),
    ("set", Builtin::Set),
];

impl Runtime {
    pub(super) fn install_builtins(&mut self) -> Result<(), AllocError> {
        for &(name, builtin) in BUILTINS {
            let name = Ident::new(name);
            let func = self.heap.alloc_function(name.clone(), builtin)?;
            self.symbols.add(&mut self.heap, name, func);
        }
        Ok(())
    }

    /// Run `builtin` on the argument list `args`, whose length equals the
    /// built-in's arity.
    ///
    /// Returns the result node with one reference held for the caller.
    pub(super) fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: NodeId,
        depth: usize,
    ) -> EvalResult<NodeId> {
        let argv: SmallVec<[NodeId; 2]> = self.heap.list_items(args).collect();
        debug_assert_eq!(argv.len(), builtin.arity());
        let &[first, second] = argv.as_slice() else {
            panic!("{} called with {} arguments", builtin.name(), argv.len());
        };

        match builtin {
            Builtin::Add | Builtin::Sub | Builtin::Mul | Builtin::Div | Builtin::Mod => {
                let lhs = self.int_argument(first, depth)?;
                let rhs = self.int_argument(second, depth)?;
                let value = arithmetic(builtin, lhs, rhs)?;
                let node = self.heap.alloc_int(value)?;
                Ok(self.heap.grab(node))
            }
            Builtin::Abst => self.build_abstraction(first, second),
            Builtin::Set => self.bind(first, second, depth),
        }
    }

    /// Reduce `arg` in place and read it as an integer.
    fn int_argument(&mut self, arg: NodeId, depth: usize) -> EvalResult<i64> {
        self.reduce_at(arg, depth + 1)?;
        match self.heap.kind(arg) {
            NodeKind::Int(value) => Ok(*value),
            other => Err(type_mismatch("int", other.label())),
        }
    }

    /// `abst vars body`: an abstraction over fresh copies of the named
    /// variables and a copy of `body`. `vars` is a variable or a list of
    /// them. Neither argument is reduced.
    fn build_abstraction(&mut self, vars: NodeId, body: NodeId) -> EvalResult<NodeId> {
        let names = self.parameter_names(vars)?;
        let heap = &mut self.heap;

        let mut params: Option<NodeId> = None;
        for name in names {
            let linked = heap.alloc_var(name).and_then(|var| {
                let linked = match params {
                    Some(list) => heap.list_push(list, var),
                    None => heap.list(var).map(|list| params = Some(list)),
                };
                if linked.is_err() {
                    heap.discard(var);
                }
                linked
            });
            if let Err(err) = linked {
                if let Some(list) = params {
                    heap.discard(list);
                }
                return Err(err.into());
            }
        }
        let Some(params) = params else {
            return Err(type_mismatch("variable", "empty list"));
        };

        let body = match heap.deep_clone(body) {
            Ok(body) => body,
            Err(err) => {
                heap.discard(params);
                return Err(err.into());
            }
        };
        match heap.alloc_abstraction(params, body) {
            Ok(abs) => Ok(heap.grab(abs)),
            Err(err) => {
                heap.discard(params);
                heap.discard(body);
                Err(err.into())
            }
        }
    }

    fn parameter_names(&self, vars: NodeId) -> EvalResult<Vec<Ident>> {
        let var_name = |node: NodeId| match self.heap.kind(node) {
            NodeKind::Var(var) => Ok(var.name.clone()),
            other => Err(type_mismatch("variable", other.label())),
        };
        match self.heap.kind(vars) {
            NodeKind::List(_) => self.heap.list_items(vars).map(var_name).collect(),
            _ => Ok(vec![var_name(vars)?]),
        }
    }

    /// `set name value`: reduce `value` and bind it to `name`.
    ///
    /// Evaluates to the bound value.
    fn bind(&mut self, name: NodeId, value: NodeId, depth: usize) -> EvalResult<NodeId> {
        let key = match self.heap.kind(name) {
            NodeKind::Var(var) => var.name.clone(),
            other => return Err(type_mismatch("variable", other.label())),
        };
        self.reduce_at(value, depth + 1)?;
        self.symbols.add(&mut self.heap, key, value);
        Ok(self.heap.grab(value))
    }
}

fn arithmetic(builtin: Builtin, lhs: i64, rhs: i64) -> EvalResult<i64> {
    let result = match builtin {
        Builtin::Add => lhs.checked_add(rhs),
        Builtin::Sub => lhs.checked_sub(rhs),
        Builtin::Mul => lhs.checked_mul(rhs),
        Builtin::Div if rhs == 0 => return Err(division_by_zero()),
        Builtin::Div => lhs.checked_div(rhs),
        Builtin::Mod if rhs == 0 => return Err(modulo_by_zero()),
        Builtin::Mod => lhs.checked_rem(rhs),
        Builtin::Abst | Builtin::Set => {
            unreachable!("{} is not arithmetic", builtin.name())
        }
    };
    result.ok_or_else(|| integer_overflow(builtin.name()))
}
