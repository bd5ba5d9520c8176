//! Query language for scavenger search.
//!
//! The syntax follows the familiar classic full-text query conventions:
//!
//! - **Terms**: `dijkstra` - adjacent terms are alternatives (OR)
//! - **Phrases**: `"shortest path"` - exact sequences, `"a b"~2` for slop
//! - **Required / prohibited**: `+graph -tree`, `NOT tree`
//! - **Boolean keywords**: `heap AND stack`, `heap OR stack`
//! - **Grouping**: `(a b) AND c` - precedence control
//! - **Fields**: `name:parser` - search a specific field
//! - **Fuzzy**: `dijkstra~`, `dijkstra~1` - edit-distance matching
//! - **Wildcards**: `dijk*`, `te?t`
//! - **Boosting**: `parser^2.5` - adjust clause importance
//!
//! Any metacharacter can be made literal with a backslash; [`escape`] does
//! this for arbitrary text.
//!
//! # Example
//!
//! ```
//! use scavenger_query::{QueryExpr, escape, parse};
//!
//! let expr = parse("name:guide (rust OR golang) -deprecated").unwrap();
//! assert!(expr.is_some());
//!
//! let literal = parse(&escape("foo*")).unwrap();
//! assert_eq!(literal, Some(QueryExpr::Term("foo*".into())));
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod escape;
mod lexer;
mod parser;

pub use ast::{DEFAULT_FUZZY_DISTANCE, MAX_FUZZY_DISTANCE, QueryExpr};
pub use error::{LexError, ParseError, QueryError, QueryErrorKind};
pub use escape::{escape, wildcard_regex};
pub use lexer::{Token, tokenize};
pub use parser::parse;
