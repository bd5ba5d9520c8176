//! Error types for query parsing and compilation.
//!
//! A malformed query is always reported to the caller; nothing here degrades
//! to an empty match.

use std::{error::Error, fmt};

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Error message.
    pub message: String,
    /// Byte position in input where error occurred.
    pub position: usize,
    /// The original input string.
    pub input: String,
}

impl LexError {
    /// Creates a new lexer error.
    pub fn new(message: impl Into<String>, position: usize, input: &str) -> Self {
        Self {
            message: message.into(),
            position,
            input: input.to_string(),
        }
    }

    /// Formats the error with a caret under the offending character.
    pub fn format_with_context(&self) -> String {
        let column = self
            .input
            .get(..self.position)
            .unwrap_or(&self.input)
            .chars()
            .count();
        format!(
            "query syntax error: {}\n  {}\n  {}^",
            self.message,
            self.input,
            " ".repeat(column)
        )
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with_context())
    }
}

impl Error for LexError {}

/// Parse error with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Error message.
    pub message: String,
    /// Token index where error occurred (if applicable).
    pub token_index: Option<usize>,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(message: impl Into<String>, token_index: Option<usize>) -> Self {
        Self {
            message: message.into(),
            token_index,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(idx) = self.token_index {
            write!(f, "at token {}: {}", idx, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self {
            message: err.message,
            token_index: None,
        }
    }
}

/// A query that could not be turned into a search.
///
/// Displays as a one-line summary, the query with a caret under the
/// offending position when known, and a hint for common mistakes.
#[derive(Debug, Clone)]
pub struct QueryError {
    /// What went wrong.
    pub kind: QueryErrorKind,
    /// The query text, once known.
    pub query: Option<String>,
}

/// Stage at which a query failed.
#[derive(Debug, Clone)]
pub enum QueryErrorKind {
    /// Tokenization failed.
    Lex {
        /// Description of the failure.
        message: String,
        /// Byte offset into the query.
        position: usize,
    },
    /// The token stream is not a valid expression.
    Parse {
        /// Description of the failure.
        message: String,
        /// Byte offset into the query, when the parser tracked one.
        position: Option<usize>,
    },
    /// The expression is well formed but cannot be executed.
    Compile {
        /// Description of the failure.
        message: String,
    },
}

impl QueryErrorKind {
    /// Description of the failure.
    fn message(&self) -> &str {
        match self {
            Self::Lex { message, .. } | Self::Parse { message, .. } | Self::Compile { message } => {
                message
            }
        }
    }

    /// Byte offset of the failure, if known.
    fn position(&self) -> Option<usize> {
        match self {
            Self::Lex { position, .. } => Some(*position),
            Self::Parse { position, .. } => *position,
            Self::Compile { .. } => None,
        }
    }

    /// Leading label of the rendered error.
    fn label(&self) -> &'static str {
        match self {
            Self::Lex { .. } | Self::Parse { .. } => "query syntax error",
            Self::Compile { .. } => "query error",
        }
    }
}

/// Message fragments and the hint shown when a message contains them.
const HINTS: &[(&str, &str)] = &[
    ("unclosed quote", "Add a closing quote (\") to complete the phrase"),
    ("closing parenthesis", "Add a closing parenthesis ) to match the opening one"),
    (
        "unknown field",
        "Valid fields are: key, path, name, description, data, fileExtension, \
         dataSource, modifiedEpochTime",
    ),
    ("fuzzy distance", "Use 'term~' for the default distance or 'term~1' for a closer match"),
    ("dangling escape", "Escape a literal backslash as '\\\\'"),
    ("OR", "OR and AND need expressions on both sides, e.g., 'heap OR stack'"),
];

impl QueryError {
    /// Creates a lex error.
    pub fn lex(message: impl Into<String>, position: usize, query: impl Into<String>) -> Self {
        Self {
            kind: QueryErrorKind::Lex {
                message: message.into(),
                position,
            },
            query: Some(query.into()),
        }
    }

    /// Creates a parse error.
    pub fn parse(
        message: impl Into<String>,
        position: Option<usize>,
        query: Option<String>,
    ) -> Self {
        Self {
            kind: QueryErrorKind::Parse {
                message: message.into(),
                position,
            },
            query,
        }
    }

    /// Creates a compile error.
    pub fn compile(message: impl Into<String>) -> Self {
        Self {
            kind: QueryErrorKind::Compile {
                message: message.into(),
            },
            query: None,
        }
    }

    /// Attaches the query text.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// The bare failure description.
    pub fn message(&self) -> &str {
        self.kind.message()
    }

    /// A fix-it hint for well-known mistakes.
    pub fn suggestion(&self) -> Option<&'static str> {
        let message = self.message();
        HINTS
            .iter()
            .find(|(needle, _)| message.contains(needle))
            .map(|(_, hint)| *hint)
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", self.kind.label(), self.message())?;
        if let Some(query) = &self.query {
            writeln!(f, "  {query}")?;
            if let Some(position) = self.kind.position() {
                let column = query
                    .get(..position.min(query.len()))
                    .unwrap_or(query)
                    .chars()
                    .count();
                writeln!(f, "  {}^", " ".repeat(column))?;
            }
        }
        if let Some(hint) = self.suggestion() {
            write!(f, "hint: {hint}")?;
        }
        Ok(())
    }
}

impl Error for QueryError {}

impl From<LexError> for QueryError {
    fn from(err: LexError) -> Self {
        Self {
            kind: QueryErrorKind::Lex {
                message: err.message,
                position: err.position,
            },
            query: Some(err.input),
        }
    }
}

impl From<ParseError> for QueryError {
    fn from(err: ParseError) -> Self {
        Self {
            kind: QueryErrorKind::Parse {
                message: err.message,
                position: None,
            },
            query: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = QueryError::lex("unclosed quote", 0, "\"shortest path");
        let display = err.to_string();
        assert!(display.contains("unclosed quote"));
        assert!(display.contains("\"shortest path"));
        assert!(display.contains("^"));
        assert!(display.contains("hint:"));
    }

    #[test]
    fn parse_error_display() {
        let err = QueryError::parse(
            "expected closing parenthesis",
            Some(5),
            Some("(heap".to_string()),
        );
        let display = err.to_string();
        assert!(display.contains("expected closing parenthesis"));
        assert!(display.contains("(heap"));
        assert!(display.contains("hint:"));
    }

    #[test]
    fn error_with_query() {
        let err = QueryError::parse("test error", None, None).with_query("name:value");
        assert_eq!(err.query.as_deref(), Some("name:value"));
    }

    #[test]
    fn message_extraction() {
        let err = QueryError::lex("dangling escape", 3, "abc\\");
        assert_eq!(err.message(), "dangling escape");
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn or_error_suggestion() {
        let err = QueryError::parse("unexpected OR/AND", None, None);
        assert!(err.suggestion().unwrap().contains("both sides"));
    }

    #[test]
    fn lex_error_keeps_query_and_position() {
        let err = QueryError::from(LexError::new("unclosed quote", 4, "abc \"def"));
        assert_eq!(err.query.as_deref(), Some("abc \"def"));
        assert!(err.to_string().contains("      ^"));
    }

    #[test]
    fn compile_error_display() {
        let err = QueryError::compile("unknown field: title");
        let display = err.to_string();
        assert!(display.contains("unknown field: title"));
        assert!(display.contains("hint:"));
        assert!(display.contains("dataSource"));
    }
}
