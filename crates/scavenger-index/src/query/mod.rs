//! Query compilation.
//!
//! The query language itself (lexer, parser, AST, escaping) lives in the
//! `scavenger-query` crate. This module turns a parsed expression into
//! Tantivy queries against one target field at a time, analyzing terms with
//! the same pipeline the index was built with.

mod compile;

pub use compile::{CompileError, QueryCompiler};
pub use scavenger_query::{QueryError, QueryErrorKind, QueryExpr, parse};

impl From<CompileError> for QueryError {
    fn from(err: CompileError) -> Self {
        Self::compile(err.message)
    }
}
