//! Lowering of parsed expressions into heap nodes.
//!
//! Every helper returns a node holding one reference for its caller. A
//! parent constructor grabs the child again and the caller's hold is then
//! released, so on failure releasing the holds frees every partial tree.

use nls_ir::{AllocError, Heap, Ident, NodeId};
use nls_stack::ensure_sufficient_stack;

use crate::ast::Expr;

/// Lower `program` into a list of its top-level expressions.
///
/// The list holds one reference for the caller. An empty program yields
/// `None`.
pub fn lower(heap: &mut Heap, program: &[Expr]) -> Result<Option<NodeId>, AllocError> {
    if program.is_empty() {
        return Ok(None);
    }
    lower_seq(heap, program, lower_expr).map(Some)
}

fn lower_expr(heap: &mut Heap, expr: &Expr) -> Result<NodeId, AllocError> {
    ensure_sufficient_stack(|| match expr {
        Expr::Int(value) => {
            let int = heap.alloc_int(*value);
            hold(heap, int)
        }
        Expr::Var(name) => lower_var(heap, name),
        Expr::Lambda { params, body } => {
            let vars = lower_seq(heap, params, |heap, name| lower_var(heap, name))?;
            let body = match lower_expr(heap, body) {
                Ok(body) => body,
                Err(err) => {
                    heap.release(vars);
                    return Err(err);
                }
            };
            let abs = heap.alloc_abstraction(vars, body);
            heap.release(vars);
            heap.release(body);
            hold(heap, abs)
        }
        Expr::Apply { func, args } => {
            let func = lower_expr(heap, func)?;
            let args = match lower_seq(heap, args, lower_expr) {
                Ok(args) => args,
                Err(err) => {
                    heap.release(func);
                    return Err(err);
                }
            };
            let app = heap.alloc_application(func, args);
            heap.release(func);
            heap.release(args);
            hold(heap, app)
        }
        Expr::List(items) => lower_seq(heap, items, lower_expr),
    })
}

fn lower_var(heap: &mut Heap, name: &str) -> Result<NodeId, AllocError> {
    let var = heap.alloc_var(Ident::new(name));
    hold(heap, var)
}

/// Grab a freshly allocated node for the caller.
fn hold(heap: &mut Heap, node: Result<NodeId, AllocError>) -> Result<NodeId, AllocError> {
    node.map(|node| heap.grab(node))
}

/// Lower `items` and link them into a list.
///
/// Panics on an empty slice, which the parser never produces.
fn lower_seq<T>(
    heap: &mut Heap,
    items: &[T],
    mut lower_item: impl FnMut(&mut Heap, &T) -> Result<NodeId, AllocError>,
) -> Result<NodeId, AllocError> {
    let mut held = Vec::with_capacity(items.len());
    let mut failure = None;
    for item in items {
        match lower_item(heap, item) {
            Ok(node) => held.push(node),
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }
    let list = match failure {
        Some(err) => Err(err),
        None => heap.list_from(&held),
    };
    for node in held {
        heap.release(node);
    }
    match list? {
        Some(list) => Ok(heap.grab(list)),
        None => panic!("lowering an empty sequence"),
    }
}
