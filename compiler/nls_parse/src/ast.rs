//! Parsed expressions, before they are lowered into the heap.

use std::mem;

/// Surface expression. Sequences (`params`, `args`, list items) are never
/// empty when produced by the parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Int(i64),
    Var(String),
    /// `\x y. body`
    Lambda { params: Vec<String>, body: Box<Expr> },
    /// `f a b`
    Apply { func: Box<Expr>, args: Vec<Expr> },
    /// `[a b c]`
    List(Vec<Expr>),
}

impl Expr {
    /// Move the sub-expressions of `self` into `out`, leaving leaves behind.
    fn take_children(&mut self, out: &mut Vec<Expr>) {
        match self {
            Expr::Int(_) | Expr::Var(_) => {}
            Expr::Lambda { body, .. } => out.push(mem::replace(&mut **body, Expr::Int(0))),
            Expr::Apply { func, args } => {
                out.push(mem::replace(&mut **func, Expr::Int(0)));
                out.append(args);
            }
            Expr::List(items) => out.append(items),
        }
    }
}

/// Nesting depth is bounded only by the source, so teardown runs off a
/// worklist instead of recursing once per level.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut expr) = pending.pop() {
            expr.take_children(&mut pending);
        }
    }
}
