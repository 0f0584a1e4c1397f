//! Driver for the `nls` binary.
//!
//! [`run_source`] takes program text through the whole pipeline: parse,
//! lower into a fresh runtime heap, reduce and print every top-level
//! expression, release the program, and audit the heap on shutdown.

use std::fmt;
use std::sync::Once;

use nls_eval::{EvalError, PrintHandlerImpl, Runtime, RuntimeConfig};
use nls_ir::{AllocError, LeakReport};
use nls_parse::{LoadError, ParseError};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=nls_eval=debug` or
/// `RUST_LOG=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Result of a complete run.
#[derive(Debug)]
pub struct Outcome {
    /// Number of top-level expressions evaluated.
    pub evaluated: usize,
    /// Failed expressions with their zero-based index.
    pub errors: Vec<(usize, EvalError)>,
    /// Heap audit taken after the program and all bindings were released.
    pub leaks: LeakReport,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty() && self.leaks.is_clean()
    }
}

/// Failure before any expression could be evaluated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DriverError {
    /// The runtime could not allocate its built-ins.
    Startup(AllocError),
    /// Source text did not parse.
    Parse {
        error: ParseError,
        line: usize,
        column: usize,
    },
    /// The node limit was reached while loading the program.
    Load(AllocError),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Startup(err) => write!(f, "cannot start runtime: {err}"),
            DriverError::Parse {
                error,
                line,
                column,
            } => write!(f, "{line}:{column}: {}", error.message),
            DriverError::Load(err) => write!(f, "out of memory while loading: {err}"),
        }
    }
}

impl std::error::Error for DriverError {}

/// Evaluate `source` under `config`, printing results through `handler`.
pub fn run_source(
    source: &str,
    config: RuntimeConfig,
    handler: &PrintHandlerImpl,
) -> Result<Outcome, DriverError> {
    let mut runtime = Runtime::new(config).map_err(DriverError::Startup)?;

    let program = match nls_parse::load(runtime.heap_mut(), source) {
        Ok(program) => program,
        Err(LoadError::Parse(error)) => {
            let (line, column) = error.line_col(source);
            return Err(DriverError::Parse {
                error,
                line,
                column,
            });
        }
        Err(LoadError::Alloc(err)) => return Err(DriverError::Load(err)),
    };

    let (evaluated, errors) = match program {
        Some(program) => {
            let summary = runtime.run(program, handler);
            runtime.heap_mut().release(program);
            (summary.evaluated, summary.errors)
        }
        None => (0, Vec::new()),
    };

    let leaks = runtime.shutdown();
    tracing::debug!(
        evaluated,
        failed = errors.len(),
        allocations = leaks.allocations,
        frees = leaks.frees,
        "run finished"
    );
    Ok(Outcome {
        evaluated,
        errors,
        leaks,
    })
}
