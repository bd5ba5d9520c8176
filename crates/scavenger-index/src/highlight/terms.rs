//! Extraction of the content-field terms a query can hit.

use levenshtein_automata::{Distance, LevenshteinAutomatonBuilder, SINK_STATE};
use scavenger_query::{QueryExpr, wildcard_regex};
use tantivy::tokenizer::TextAnalyzer;
use tantivy_fst::{Automaton, Regex};

use crate::{
    analyzer::analyze,
    query::CompileError,
    schema::{FieldKind, IndexField},
};

/// Wrapper that implements `tantivy_fst::Automaton` for `levenshtein_automata::DFA`.
pub struct LevenshteinDfa(levenshtein_automata::DFA);

impl Automaton for LevenshteinDfa {
    type State = u32;

    fn start(&self) -> Self::State {
        self.0.initial_state()
    }

    fn is_match(&self, state: &Self::State) -> bool {
        matches!(self.0.distance(*state), Distance::Exact(_))
    }

    fn can_match(&self, state: &Self::State) -> bool {
        *state != SINK_STATE
    }

    fn accept(&self, state: &Self::State, byte: u8) -> Self::State {
        self.0.transition(*state, byte)
    }
}

/// How a query leaf recognizes an analyzed token.
pub enum Matcher {
    /// Token equals the analyzed query term.
    Exact(String),
    /// Token is within an edit distance of the analyzed query term.
    Fuzzy(LevenshteinDfa),
    /// Token matches a wildcard pattern.
    Pattern(Regex),
}

/// A matcher together with the boost of the clause it came from.
pub struct TermMatcher {
    /// Token recognizer.
    pub matcher: Matcher,
    /// Product of the enclosing `^` boosts.
    pub boost: f32,
}

impl TermMatcher {
    /// Whether `token` is hit by this matcher.
    pub fn matches(&self, token: &str) -> bool {
        match &self.matcher {
            Matcher::Exact(term) => term == token,
            Matcher::Fuzzy(dfa) => accepts(dfa, token),
            Matcher::Pattern(regex) => accepts(regex, token),
        }
    }
}

/// Runs `token` through `automaton` byte by byte.
fn accepts<A: Automaton>(automaton: &A, token: &str) -> bool {
    let mut state = automaton.start();
    for &byte in token.as_bytes() {
        if !automaton.can_match(&state) {
            return false;
        }
        state = automaton.accept(&state, byte);
    }
    automaton.is_match(&state)
}

/// Collects the matchers a query contributes to `target`.
///
/// Prohibited clauses contribute nothing, since their terms never appear in
/// a matching document. Phrase terms are matched individually.
pub struct TermCollector<'a> {
    /// Analyzer the index was built with.
    analyzer: &'a mut TextAnalyzer,
    /// Field whose terms are collected.
    target: IndexField,
    /// Matchers found so far.
    matchers: Vec<TermMatcher>,
}

impl<'a> TermCollector<'a> {
    /// Starts a collection for `target`.
    pub fn new(analyzer: &'a mut TextAnalyzer, target: IndexField) -> Self {
        Self {
            analyzer,
            target,
            matchers: Vec::new(),
        }
    }

    /// Collects the analyzed tokens of literal `text`.
    pub fn literal(mut self, text: &str) -> Vec<TermMatcher> {
        self.push_exact(text, 1.0);
        self.matchers
    }

    /// Collects every positive leaf of `expr`, with bare leaves bound to `field`.
    pub fn expression(
        mut self,
        expr: &QueryExpr,
        field: IndexField,
    ) -> Result<Vec<TermMatcher>, CompileError> {
        self.visit(expr, field, 1.0)?;
        Ok(self.matchers)
    }

    /// Walks one node.
    fn visit(&mut self, expr: &QueryExpr, field: IndexField, boost: f32) -> Result<(), CompileError> {
        match expr {
            QueryExpr::Not(_) => {}
            QueryExpr::Required(inner) => self.visit(inner, field, boost)?,
            QueryExpr::And(exprs) | QueryExpr::Or(exprs) => {
                for inner in exprs {
                    self.visit(inner, field, boost)?;
                }
            }
            QueryExpr::Field { name, expr } => {
                let target: IndexField = name
                    .parse()
                    .map_err(|_| CompileError::new(format!("unknown field: {name}")))?;
                self.visit(expr, target, boost)?;
            }
            QueryExpr::Boost { expr, factor } => self.visit(expr, field, boost * factor)?,
            _ if field != self.target || field.kind() != FieldKind::Text => {}
            QueryExpr::Term(text) | QueryExpr::Phrase { text, .. } => self.push_exact(text, boost),
            QueryExpr::Fuzzy { term, distance } => self.push_fuzzy(term, *distance, boost),
            QueryExpr::Wildcard(pattern) => {
                let regex = Regex::new(&wildcard_regex(pattern)).map_err(|e| {
                    CompileError::new(format!("invalid wildcard pattern '{pattern}': {e}"))
                })?;
                self.matchers.push(TermMatcher {
                    matcher: Matcher::Pattern(regex),
                    boost,
                });
            }
        }
        Ok(())
    }

    /// Adds one exact matcher per analyzed token.
    fn push_exact(&mut self, text: &str, boost: f32) {
        for token in analyze(self.analyzer, text) {
            self.matchers.push(TermMatcher {
                matcher: Matcher::Exact(token.text),
                boost,
            });
        }
    }

    /// Adds an edit-distance matcher, or exact matchers when punctuation split the term.
    fn push_fuzzy(&mut self, term: &str, distance: u8, boost: f32) {
        let mut tokens = analyze(self.analyzer, term);
        if tokens.len() != 1 {
            self.push_exact(term, boost);
            return;
        }
        let Some(token) = tokens.pop() else {
            return;
        };
        let builder = LevenshteinAutomatonBuilder::new(distance, true);
        self.matchers.push(TermMatcher {
            matcher: Matcher::Fuzzy(LevenshteinDfa(builder.build_dfa(&token.text))),
            boost,
        });
    }
}
