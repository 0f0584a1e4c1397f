//! Surface syntax for the nameless runtime.
//!
//! [`parse`] turns source text into [`Expr`] trees; [`lower`] allocates them
//! in a [`Heap`] as a list of top-level expressions ready for evaluation.
//! [`load`] does both.

mod ast;
mod error;
mod lexer;
mod lower;
mod parser;

use std::fmt;

use nls_ir::{AllocError, Heap, NodeId};

pub use ast::Expr;
pub use error::ParseError;
pub use lexer::{tokenize, Spanned, SpannedToken, Token};
pub use lower::lower;
pub use parser::parse;

/// Failure of [`load`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
    Parse(ParseError),
    Alloc(AllocError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Parse(err) => write!(f, "parse error: {err}"),
            LoadError::Alloc(err) => write!(f, "out of memory while loading: {err}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<ParseError> for LoadError {
    fn from(err: ParseError) -> Self {
        LoadError::Parse(err)
    }
}

impl From<AllocError> for LoadError {
    fn from(err: AllocError) -> Self {
        LoadError::Alloc(err)
    }
}

/// Parse `source` and lower it into `heap`.
///
/// Returns the program list with one reference for the caller, or `None`
/// when the source holds no expressions.
pub fn load(heap: &mut Heap, source: &str) -> Result<Option<NodeId>, LoadError> {
    let program = parse(source)?;
    Ok(lower(heap, &program)?)
}
