//! Query abstract syntax tree.
//!
//! Represents parsed query expressions before compilation to search engine
//! queries. The tree is field-agnostic: bare leaves are resolved against
//! whichever default field the compiler is targeting.

use std::fmt;

/// The default edit distance for a fuzzy term written as `term~`.
pub const DEFAULT_FUZZY_DISTANCE: u8 = 2;

/// The largest edit distance a fuzzy term may request.
pub const MAX_FUZZY_DISTANCE: u8 = 2;

/// A parsed query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryExpr {
    /// A single search term, escapes already resolved.
    Term(String),

    /// A quoted phrase, matched as a positional sequence of analyzed terms.
    Phrase {
        /// Raw phrase text between the quotes.
        text: String,
        /// Number of positions terms may drift apart (`"a b"~2`).
        slop: u32,
    },

    /// A term matched within an edit distance (`term~` or `term~1`).
    Fuzzy {
        /// The term to match approximately.
        term: String,
        /// Maximum Levenshtein distance.
        distance: u8,
    },

    /// A wildcard pattern (`dijk*`, `te?t`).
    ///
    /// Backslash-escaped characters in the pattern are literal.
    Wildcard(String),

    /// Prohibited clause: results must NOT match this expression.
    Not(Box<Self>),

    /// Required clause (`+term`) inside a disjunction.
    Required(Box<Self>),

    /// Conjunction: all sub-expressions must match.
    And(Vec<Self>),

    /// Disjunction: at least one sub-expression must match, subject to the
    /// `Required` and `Not` clauses it contains.
    Or(Vec<Self>),

    /// Field-scoped query: search only within a specific field.
    Field {
        /// Field name (e.g., name, description, data, path).
        name: String,
        /// Expression to match within that field.
        expr: Box<Self>,
    },

    /// Boosted query: multiplies the score of the inner expression.
    Boost {
        /// The expression to boost.
        expr: Box<Self>,
        /// The boost factor (e.g., 2.5 means 2.5x the normal score).
        factor: f32,
    },
}

impl QueryExpr {
    /// Creates a plain phrase with zero slop.
    pub fn phrase(text: impl Into<String>) -> Self {
        Self::Phrase {
            text: text.into(),
            slop: 0,
        }
    }

    /// Creates an And expression, flattening nested Ands.
    pub fn and(exprs: Vec<Self>) -> Self {
        let mut flattened: Vec<Self> = exprs
            .into_iter()
            .flat_map(|e| match e {
                Self::And(inner) => inner,
                other => vec![other],
            })
            .collect();

        if flattened.len() == 1
            && let Some(only) = flattened.pop()
        {
            return only;
        }
        Self::And(flattened)
    }

    /// Creates an Or expression, flattening nested Ors.
    pub fn or(exprs: Vec<Self>) -> Self {
        let mut flattened: Vec<Self> = exprs
            .into_iter()
            .flat_map(|e| match e {
                Self::Or(inner) => inner,
                other => vec![other],
            })
            .collect();

        if flattened.len() == 1
            && let Some(only) = flattened.pop()
        {
            return only;
        }
        Self::Or(flattened)
    }

    /// Creates a boosted expression.
    pub fn boost(expr: Self, factor: f32) -> Self {
        Self::Boost {
            expr: Box::new(expr),
            factor,
        }
    }

    /// Returns true if this expression only excludes documents.
    ///
    /// A purely negative query needs a match-all base to subtract from.
    pub fn is_negative(&self) -> bool {
        match self {
            Self::Not(_) => true,
            Self::And(exprs) | Self::Or(exprs) => {
                !exprs.is_empty() && exprs.iter().all(Self::is_negative)
            }
            Self::Boost { expr, .. } | Self::Field { expr, .. } => expr.is_negative(),
            _ => false,
        }
    }

    /// Formats the expression as a tree structure with the given indentation level.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Term(s) => writeln!(f, "{prefix}Term({s:?})"),
            Self::Phrase { text, slop } => writeln!(f, "{prefix}Phrase({text:?}, slop={slop})"),
            Self::Fuzzy { term, distance } => writeln!(f, "{prefix}Fuzzy({term:?}, {distance})"),
            Self::Wildcard(p) => writeln!(f, "{prefix}Wildcard({p:?})"),
            Self::Not(inner) => {
                writeln!(f, "{prefix}Not")?;
                inner.fmt_tree(f, indent + 1)
            }
            Self::Required(inner) => {
                writeln!(f, "{prefix}Required")?;
                inner.fmt_tree(f, indent + 1)
            }
            Self::And(exprs) | Self::Or(exprs) => {
                let label = if matches!(self, Self::And(_)) {
                    "And"
                } else {
                    "Or"
                };
                writeln!(f, "{prefix}{label}")?;
                for expr in exprs {
                    expr.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
            Self::Field { name, expr } => {
                writeln!(f, "{prefix}Field({name:?})")?;
                expr.fmt_tree(f, indent + 1)
            }
            Self::Boost { expr, factor } => {
                writeln!(f, "{prefix}Boost({factor})")?;
                expr.fmt_tree(f, indent + 1)
            }
        }
    }

    /// Formats the expression back into query syntax.
    ///
    /// Groups are always parenthesized, so the result re-parses to an
    /// equivalent tree.
    pub fn to_query_string(&self) -> String {
        match self {
            Self::Term(s) => crate::escape(s).replace(' ', "\\ "),
            Self::Phrase { text, slop } => {
                let quoted = format!(
                    "\"{}\"",
                    text.replace('\\', "\\\\").replace('"', "\\\"")
                );
                if *slop > 0 {
                    format!("{quoted}~{slop}")
                } else {
                    quoted
                }
            }
            Self::Fuzzy { term, distance } => format!("{}~{distance}", crate::escape(term)),
            Self::Wildcard(p) => p.clone(),
            Self::Not(inner) => format!("-{}", inner.to_query_string()),
            Self::Required(inner) => format!("+{}", inner.to_query_string()),
            Self::And(exprs) => Self::join_group(exprs, " AND "),
            Self::Or(exprs) => Self::join_group(exprs, " "),
            Self::Field { name, expr } => format!("{name}:{}", expr.to_query_string()),
            Self::Boost { expr, factor } => format!("{}^{factor}", expr.to_query_string()),
        }
    }

    /// Joins sub-expressions with a separator inside parentheses.
    fn join_group(exprs: &[Self], separator: &str) -> String {
        let parts: Vec<String> = exprs.iter().map(Self::to_query_string).collect();
        format!("({})", parts.join(separator))
    }
}

impl fmt::Display for QueryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}
