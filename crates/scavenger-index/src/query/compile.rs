//! Query compiler.
//!
//! Compiles a query AST into a Tantivy query over a single target field.
//! Bare leaves resolve against the target field; `field:` prefixes redirect
//! their subtree to another contract field.

use std::{error::Error, fmt, slice};

use scavenger_query::{QueryExpr, wildcard_regex};
use tantivy::{
    Term,
    query::{
        AllQuery, BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, PhraseQuery, Query, RegexQuery,
        TermQuery,
    },
    schema::{Field, IndexRecordOption},
    tokenizer::TextAnalyzer,
};

use crate::{
    analyzer::{AnalyzedToken, analyze},
    schema::{FieldKind, IndexField, IndexSchema},
};

/// Error during query compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Error message.
    pub message: String,
}

impl CompileError {
    /// Creates an error with the given message.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CompileError {}

/// Result of compiling one expression; `None` means it matches nothing
/// meaningful (for example, only stop words).
type Compiled = Result<Option<Box<dyn Query>>, CompileError>;

/// Compiles query AST nodes into Tantivy queries.
pub struct QueryCompiler {
    /// Index schema for field references.
    schema: IndexSchema,
    /// Text analyzer for tokenizing query terms.
    analyzer: TextAnalyzer,
}

impl QueryCompiler {
    /// Creates a new query compiler.
    ///
    /// `analyzer` must be the analyzer the index was built with.
    pub fn new(schema: IndexSchema, analyzer: TextAnalyzer) -> Self {
        Self { schema, analyzer }
    }

    /// Compiles a query expression against `field`.
    ///
    /// Returns `None` for expressions that analyze to nothing.
    pub fn compile(&mut self, expr: &QueryExpr, field: IndexField) -> Compiled {
        match expr {
            QueryExpr::Term(text) => self.compile_text(text, 0, field),
            QueryExpr::Phrase { text, slop } => self.compile_text(text, *slop, field),
            QueryExpr::Fuzzy { term, distance } => self.compile_fuzzy(term, *distance, field),
            QueryExpr::Wildcard(pattern) => self.compile_wildcard(pattern, field),
            QueryExpr::And(exprs) => self.compile_clauses(exprs, field, Occur::Must),
            QueryExpr::Or(exprs) => self.compile_clauses(exprs, field, Occur::Should),
            QueryExpr::Not(_) | QueryExpr::Required(_) => {
                self.compile_clauses(slice::from_ref(expr), field, Occur::Must)
            }
            QueryExpr::Field { name, expr } => {
                let target: IndexField = name
                    .parse()
                    .map_err(|_| CompileError::new(format!("unknown field: {name}")))?;
                self.compile(expr, target)
            }
            QueryExpr::Boost { expr, factor } => Ok(self
                .compile(expr, field)?
                .map(|inner| Box::new(BoostQuery::new(inner, *factor)) as Box<dyn Query>)),
        }
    }

    /// Compiles `text` as a literal character sequence against `field`.
    ///
    /// No query syntax is interpreted. Analyzed fields match the analyzed
    /// tokens as a term (one token) or an exact phrase (several tokens).
    /// Raw fields match the whole text exactly.
    pub fn compile_literal(&mut self, text: &str, field: IndexField) -> Compiled {
        match field.kind() {
            FieldKind::Numeric => Ok(text
                .trim()
                .parse::<i64>()
                .ok()
                .map(|value| self.numeric_term(field, value))),
            FieldKind::Raw | FieldKind::Text => self.compile_text(text, 0, field),
        }
    }

    /// Combines child clauses, honoring `+` (required) and `-` (prohibited).
    ///
    /// Unmarked children get `default`. A clause list with only prohibited
    /// children excludes from the set of all documents.
    fn compile_clauses(&mut self, exprs: &[QueryExpr], field: IndexField, default: Occur) -> Compiled {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        for expr in exprs {
            let (occur, inner) = match expr {
                QueryExpr::Required(inner) => (Occur::Must, inner.as_ref()),
                QueryExpr::Not(inner) => (Occur::MustNot, inner.as_ref()),
                other => (default, other),
            };
            if let Some(query) = self.compile(inner, field)? {
                clauses.push((occur, query));
            }
        }

        let has_positive = clauses.iter().any(|(occur, _)| *occur != Occur::MustNot);
        if !has_positive {
            if clauses.is_empty() {
                return Ok(None);
            }
            clauses.insert(0, (Occur::Must, Box::new(AllQuery)));
        }

        if clauses.len() == 1 {
            return Ok(clauses.pop().map(|(_, query)| query));
        }
        Ok(Some(Box::new(BooleanQuery::new(clauses))))
    }

    /// Compiles a term or phrase.
    fn compile_text(&mut self, text: &str, slop: u32, field: IndexField) -> Compiled {
        let handle = self.schema.field(field);
        match field.kind() {
            FieldKind::Raw => Ok(Some(Box::new(TermQuery::new(
                Term::from_field_text(handle, text),
                IndexRecordOption::Basic,
            )))),
            FieldKind::Numeric => {
                let value = text.trim().parse::<i64>().map_err(|_| {
                    CompileError::new(format!("{field} expects an integer, got '{text}'"))
                })?;
                Ok(Some(self.numeric_term(field, value)))
            }
            FieldKind::Text => {
                let tokens = analyze(&mut self.analyzer, text);
                Ok(token_query(handle, &tokens, slop))
            }
        }
    }

    /// Compiles an edit-distance match.
    fn compile_fuzzy(&mut self, term: &str, distance: u8, field: IndexField) -> Compiled {
        let handle = self.schema.field(field);
        match field.kind() {
            FieldKind::Numeric => Err(numeric_only(field)),
            FieldKind::Raw => Ok(Some(Box::new(FuzzyTermQuery::new(
                Term::from_field_text(handle, term),
                distance,
                true,
            )))),
            FieldKind::Text => {
                let tokens = analyze(&mut self.analyzer, term);
                match tokens.as_slice() {
                    [token] => Ok(Some(Box::new(FuzzyTermQuery::new(
                        Term::from_field_text(handle, &token.text),
                        distance,
                        true,
                    )))),
                    // Punctuation split the term; fall back to an exact sequence.
                    _ => Ok(token_query(handle, &tokens, 0)),
                }
            }
        }
    }

    /// Compiles a `*`/`?` pattern into a term-dictionary regex.
    fn compile_wildcard(&self, pattern: &str, field: IndexField) -> Compiled {
        if field.kind() == FieldKind::Numeric {
            return Err(numeric_only(field));
        }
        let regex = wildcard_regex(pattern);
        let query = RegexQuery::from_pattern(&regex, self.schema.field(field)).map_err(|e| {
            CompileError::new(format!("invalid wildcard pattern '{pattern}': {e}"))
        })?;
        Ok(Some(Box::new(query)))
    }

    /// Exact match on an integer field.
    fn numeric_term(&self, field: IndexField, value: i64) -> Box<dyn Query> {
        Box::new(TermQuery::new(
            Term::from_field_i64(self.schema.field(field), value),
            IndexRecordOption::Basic,
        ))
    }
}

/// Builds a term query for one token or a positional phrase for several.
///
/// Phrase offsets keep the gaps left by removed stop words, so
/// `"path to graph"` still requires one position between its terms.
fn token_query(field: Field, tokens: &[AnalyzedToken], slop: u32) -> Option<Box<dyn Query>> {
    match tokens {
        [] => None,
        [token] => Some(Box::new(TermQuery::new(
            Term::from_field_text(field, &token.text),
            IndexRecordOption::WithFreqs,
        ))),
        [first, ..] => {
            let terms: Vec<(usize, Term)> = tokens
                .iter()
                .map(|t| {
                    (
                        t.position - first.position,
                        Term::from_field_text(field, &t.text),
                    )
                })
                .collect();
            let mut phrase = PhraseQuery::new_with_offset(terms);
            phrase.set_slop(slop);
            Some(Box::new(phrase))
        }
    }
}

/// Error for syntax that integer fields cannot honor.
fn numeric_only(field: IndexField) -> CompileError {
    CompileError::new(format!("{field} only supports exact integer values"))
}
