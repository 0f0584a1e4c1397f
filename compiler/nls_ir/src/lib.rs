//! Node heap for the nameless lambda-calculus runtime.
//!
//! - [`Heap`]: reference-counted node storage with a shutdown leak audit
//! - [`NodeKind`]: integers, variables, built-in functions, abstractions,
//!   applications and cons lists
//! - [`Ident`]: shared identifier strings with a cached bucket checksum
//!
//! Tree surgery used by the evaluator (substitution chains, deep clone,
//! in-place overwrite) is implemented on [`Heap`] in the `chain` and `clone`
//! modules.

mod chain;
mod clone;
mod display;
mod heap;
mod ident;
mod list;
mod node;
mod node_id;

pub use display::NodeDisplay;
pub use heap::{AllocError, Heap, LeakReport, LeakedBlock};
pub use ident::{Ident, HASH_WIDTH};
pub use list::ListCells;
pub use node::{
    Abstraction, Application, Builtin, Cons, Edge, Function, Location, NodeKind, NodeTag, Var,
};
pub use node_id::NodeId;
