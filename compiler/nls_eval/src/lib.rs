//! Evaluator for the nameless lambda-calculus runtime.
//!
//! # Architecture
//!
//! - [`Runtime`]: one evaluation session owning the node heap and the
//!   symbol table; reduces expressions in place
//! - [`SymbolTable`]: bucketed global bindings, populated with the built-ins
//! - [`RuntimeConfig`]: reduction-depth and heap-size ceilings
//! - [`PrintHandlerImpl`]: where printed results go
//!
//! Expressions are trees in an [`nls_ir::Heap`]. Applications of built-ins
//! run native code once fully supplied and curry otherwise; applications of
//! abstractions substitute through the chains recorded at construction.

mod config;
pub mod errors;
mod print_handler;
mod runtime;
mod symbols;

pub use config::{RuntimeConfig, DEFAULT_MAX_DEPTH};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, BufferPrintHandler, PrintHandlerImpl,
    SharedPrintHandler, StdoutPrintHandler,
};
pub use runtime::{RunSummary, Runtime, BUILTINS};
pub use symbols::{EntryPos, SymbolTable};
