//! Recoverable evaluation errors.
//!
//! `EvalErrorKind` carries the structured category; factory functions build
//! an [`EvalError`] whose message is the kind's `Display` text. Conditions
//! that indicate a bug in the runtime itself (corrupt handles, over-release,
//! broken chains) are panics in `nls_ir`, never values of this type.

use std::fmt;

use nls_ir::AllocError;

/// Result of an evaluation step.
pub type EvalResult<T = ()> = Result<T, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Lookup
    UnboundSymbol {
        name: String,
    },
    NoSuchEntry {
        name: String,
    },

    // Application
    TooManyArguments {
        name: String,
        expected: usize,
        got: usize,
    },
    NotCallable {
        type_name: String,
    },
    TypeMismatch {
        expected: String,
        got: String,
    },

    // Arithmetic
    DivisionByZero,
    ModuloByZero,
    IntegerOverflow {
        operation: String,
    },

    // Resources
    OutOfMemory {
        cause: AllocError,
    },
    ReductionTooDeep {
        limit: usize,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundSymbol { name } => write!(f, "no such symbol: {name}"),
            Self::NoSuchEntry { name } => write!(f, "no such entry: {name}"),
            Self::TooManyArguments {
                name,
                expected,
                got,
            } => write!(
                f,
                "too many arguments to {name}: expected {expected}, got {got}"
            ),
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::ModuloByZero => write!(f, "modulo by zero"),
            Self::IntegerOverflow { operation } => {
                write!(f, "integer overflow in {operation}")
            }
            Self::OutOfMemory { cause } => write!(f, "out of memory: {cause}"),
            Self::ReductionTooDeep { limit } => {
                write!(f, "reduction exceeded depth limit of {limit}")
            }
        }
    }
}

/// Evaluation failure for one top-level expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Human-readable message, equal to `kind.to_string()`.
    pub message: String,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError { kind, message }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

impl From<AllocError> for EvalError {
    fn from(cause: AllocError) -> Self {
        out_of_memory(cause)
    }
}

#[cold]
pub fn unbound_symbol(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnboundSymbol {
        name: name.to_string(),
    })
}

#[cold]
pub fn no_such_entry(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchEntry {
        name: name.to_string(),
    })
}

/// More arguments supplied than `name` accepts.
#[cold]
pub fn too_many_arguments(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TooManyArguments {
        name: name.to_string(),
        expected,
        got,
    })
}

/// A non-function value in operator position.
#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn modulo_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ModuloByZero)
}

#[cold]
pub fn integer_overflow(operation: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow {
        operation: operation.to_string(),
    })
}

#[cold]
pub fn out_of_memory(cause: AllocError) -> EvalError {
    EvalError::from_kind(EvalErrorKind::OutOfMemory { cause })
}

/// Reduction nested deeper than the configured ceiling.
#[cold]
pub fn reduction_too_deep(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ReductionTooDeep { limit })
}
