//! Evaluation session.
//!
//! A [`Runtime`] owns the node heap and the symbol table for one run. It is
//! created with the built-ins installed and torn down with
//! [`Runtime::shutdown`], which empties the table and audits the heap.
//!
//! Reduction is destructive: [`Runtime::reduce`] rewrites the node it is
//! given until it reaches normal form, so every holder of that handle sees
//! the result.

mod apply;
mod builtins;

use nls_ir::{AllocError, Heap, LeakReport, NodeId, NodeTag};
use nls_stack::ensure_sufficient_stack;

use crate::config::RuntimeConfig;
use crate::errors::{reduction_too_deep, EvalError, EvalResult};
use crate::print_handler::PrintHandlerImpl;
use crate::symbols::SymbolTable;

pub use builtins::BUILTINS;

/// Outcome of [`Runtime::run`].
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Number of top-level expressions attempted.
    pub evaluated: usize,
    /// Failed expressions with their zero-based index.
    pub errors: Vec<(usize, EvalError)>,
}

impl RunSummary {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct Runtime {
    heap: Heap,
    symbols: SymbolTable,
    config: RuntimeConfig,
}

impl Runtime {
    /// Fresh session with every built-in bound in the symbol table.
    pub fn new(config: RuntimeConfig) -> Result<Self, AllocError> {
        let mut runtime = Runtime {
            heap: Heap::with_limit(config.max_nodes),
            symbols: SymbolTable::new(),
            config,
        };
        runtime.install_builtins()?;
        Ok(runtime)
    }

    #[inline]
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    #[inline]
    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    #[inline]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Heap and symbol table together, for callers that edit bindings.
    #[inline]
    pub fn parts_mut(&mut self) -> (&mut Heap, &mut SymbolTable) {
        (&mut self.heap, &mut self.symbols)
    }

    #[inline]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Reduce `node` to normal form in place.
    ///
    /// On error the node may be left partly reduced, but the heap stays
    /// consistent and the runtime can evaluate further expressions.
    pub fn reduce(&mut self, node: NodeId) -> EvalResult {
        let _span = tracing::trace_span!("reduce", ?node).entered();
        self.reduce_at(node, 0)
    }

    /// Reduction loop for `node`, `depth` steps below the top-level call.
    fn reduce_at(&mut self, node: NodeId, depth: usize) -> EvalResult {
        ensure_sufficient_stack(|| {
            let mut depth = depth;
            loop {
                if let Some(limit) = self.config.max_depth {
                    if depth > limit {
                        return Err(reduction_too_deep(limit));
                    }
                }
                match self.heap.tag(node) {
                    NodeTag::Int | NodeTag::Function | NodeTag::Abstraction | NodeTag::List => {
                        return Ok(());
                    }
                    NodeTag::Var => self.resolve(node)?,
                    NodeTag::Application => self.apply(node, depth)?,
                }
                depth += 1;
            }
        })
    }

    /// Reduce every element of the list `program` once, printing each
    /// result on its own line.
    ///
    /// A failing expression is recorded and skipped.
    pub fn run(&mut self, program: NodeId, handler: &PrintHandlerImpl) -> RunSummary {
        let items: Vec<NodeId> = self.heap.list_items(program).collect();
        let mut summary = RunSummary::default();
        for (index, item) in items.into_iter().enumerate() {
            summary.evaluated += 1;
            match self.reduce(item) {
                Ok(()) => handler.println(&self.heap.display(item).to_string()),
                Err(err) => {
                    tracing::debug!(index, error = %err, "expression failed");
                    summary.errors.push((index, err));
                }
            }
        }
        summary
    }

    /// Release every binding and audit the heap.
    pub fn shutdown(mut self) -> LeakReport {
        self.symbols.clear(&mut self.heap);
        self.heap.shutdown()
    }
}
