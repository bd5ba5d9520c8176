//! Query parser.
//!
//! Parses a token stream into a query AST using recursive descent.
//!
//! # Grammar
//!
//! ```text
//! query      → or_expr
//! or_expr    → and_expr ("OR"? and_expr)*
//! and_expr   → unary ("AND" unary)*
//! unary      → ("-" | "NOT") unary | "+" unary | primary
//! primary    → (leaf | field_expr | "(" or_expr ")") ("^" NUMBER)?
//! leaf       → TERM ("~" N?)? | WILDCARD | PHRASE ("~" N)?
//! field_expr → FIELD_PREFIX (leaf | "(" or_expr ")")
//! ```
//!
//! # Precedence (highest to lowest)
//!
//! 1. Grouping: `(...)`
//! 2. Field prefix: `field:`
//! 3. Prefix operators: `-`, `NOT`, `+`
//! 4. AND (explicit keyword)
//! 5. OR (explicit keyword, or implicit between adjacent clauses)

use std::mem;

use crate::{
    ast::{DEFAULT_FUZZY_DISTANCE, MAX_FUZZY_DISTANCE, QueryExpr},
    error::{ParseError, QueryError},
    lexer::{Token, tokenize},
};

/// Recursive descent parser for query expressions.
struct Parser {
    /// Token stream to parse.
    tokens: Vec<Token>,
    /// Current position in token stream.
    position: usize,
}

impl Parser {
    /// Creates a new parser from a token stream.
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parses the token stream into a query expression.
    fn parse(mut self) -> Result<Option<QueryExpr>, ParseError> {
        if self.tokens.is_empty() {
            return Ok(None);
        }

        let expr = self.parse_or_expr()?;

        if let Some(token) = self.peek() {
            return Err(ParseError::new(
                format!("unexpected token: {token:?}"),
                Some(self.position),
            ));
        }

        Ok(Some(expr))
    }

    /// Parses: or_expr → and_expr ("OR"? and_expr)*
    fn parse_or_expr(&mut self) -> Result<QueryExpr, ParseError> {
        let mut clauses = vec![self.parse_and_expr()?];

        loop {
            if self.check(&Token::Or) {
                self.advance();
                clauses.push(self.parse_and_expr()?);
            } else if self.can_start_unary() {
                clauses.push(self.parse_and_expr()?);
            } else {
                break;
            }
        }

        Ok(QueryExpr::or(clauses))
    }

    /// Parses: and_expr → unary ("AND" unary)*
    fn parse_and_expr(&mut self) -> Result<QueryExpr, ParseError> {
        let mut exprs = vec![self.parse_unary()?];

        while self.check(&Token::And) {
            self.advance();
            exprs.push(self.parse_unary()?);
        }

        Ok(QueryExpr::and(exprs))
    }

    /// Checks if the current token can start a unary expression.
    fn can_start_unary(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Term(_)
                    | Token::Wildcard(_)
                    | Token::Phrase(_)
                    | Token::Not
                    | Token::Plus
                    | Token::LParen
                    | Token::FieldPrefix(_)
            )
        )
    }

    /// Parses: unary → ("-" | "NOT") unary | "+" unary | primary
    fn parse_unary(&mut self) -> Result<QueryExpr, ParseError> {
        if self.check(&Token::Not) {
            self.advance();
            let expr = self.parse_unary()?;
            return Ok(QueryExpr::Not(Box::new(expr)));
        }

        if self.check(&Token::Plus) {
            self.advance();
            let expr = self.parse_unary()?;
            return Ok(QueryExpr::Required(Box::new(expr)));
        }

        self.parse_primary()
    }

    /// Parses a primary expression and its optional boost suffix.
    fn parse_primary(&mut self) -> Result<QueryExpr, ParseError> {
        let expr = match self.peek().cloned() {
            Some(Token::Term(_) | Token::Wildcard(_) | Token::Phrase(_)) => self.parse_leaf()?,

            Some(Token::FieldPrefix(name)) => {
                self.advance();
                self.parse_field_expr(name)?
            }

            Some(Token::LParen) => self.parse_group("expected closing parenthesis")?,

            Some(Token::RParen) => {
                return Err(ParseError::new(
                    "unexpected closing parenthesis",
                    Some(self.position),
                ));
            }

            Some(Token::Or | Token::And) => {
                return Err(ParseError::new(
                    "unexpected OR/AND (needs expression before it)",
                    Some(self.position),
                ));
            }

            Some(Token::Not | Token::Plus) => {
                return Err(ParseError::new("unexpected operator", Some(self.position)));
            }

            Some(Token::Boost(_)) => {
                return Err(ParseError::new(
                    "unexpected boost (needs expression before it)",
                    Some(self.position),
                ));
            }

            Some(Token::Tilde(_)) => {
                return Err(ParseError::new(
                    "unexpected '~' (needs a term or phrase before it)",
                    Some(self.position),
                ));
            }

            None => {
                return Err(ParseError::new("unexpected end of query", None));
            }
        };

        Ok(self.maybe_apply_boost(expr))
    }

    /// Parses a term, wildcard, or phrase together with its tilde suffix.
    fn parse_leaf(&mut self) -> Result<QueryExpr, ParseError> {
        let start = self.position;
        let leaf = match self.peek().cloned() {
            Some(Token::Term(text)) => {
                self.advance();
                match self.take_tilde() {
                    None => QueryExpr::Term(text),
                    Some(distance) => {
                        let distance = distance.unwrap_or(u32::from(DEFAULT_FUZZY_DISTANCE));
                        let distance = u8::try_from(distance)
                            .ok()
                            .filter(|d| *d <= MAX_FUZZY_DISTANCE)
                            .ok_or_else(|| {
                                ParseError::new(
                                    format!(
                                        "fuzzy distance must be at most {MAX_FUZZY_DISTANCE}"
                                    ),
                                    Some(start),
                                )
                            })?;
                        QueryExpr::Fuzzy {
                            term: text,
                            distance,
                        }
                    }
                }
            }
            Some(Token::Wildcard(pattern)) => {
                self.advance();
                if self.take_tilde().is_some() {
                    return Err(ParseError::new(
                        "wildcard terms cannot be fuzzy",
                        Some(start),
                    ));
                }
                QueryExpr::Wildcard(pattern)
            }
            Some(Token::Phrase(text)) => {
                self.advance();
                match self.take_tilde() {
                    None => QueryExpr::phrase(text),
                    Some(Some(slop)) => QueryExpr::Phrase { text, slop },
                    Some(None) => {
                        return Err(ParseError::new(
                            "expected slop number after phrase '~'",
                            Some(start),
                        ));
                    }
                }
            }
            _ => {
                return Err(ParseError::new(
                    "expected term or phrase",
                    Some(self.position),
                ));
            }
        };
        Ok(leaf)
    }

    /// Consumes a tilde token if present, returning its optional number.
    fn take_tilde(&mut self) -> Option<Option<u32>> {
        if let Some(Token::Tilde(value)) = self.peek().cloned() {
            self.advance();
            Some(value)
        } else {
            None
        }
    }

    /// Parses the expression after a field prefix.
    fn parse_field_expr(&mut self, name: String) -> Result<QueryExpr, ParseError> {
        let expr = match self.peek() {
            Some(Token::Term(_) | Token::Wildcard(_) | Token::Phrase(_)) => self.parse_leaf()?,
            Some(Token::LParen) => {
                self.parse_group("expected closing parenthesis after field expression")?
            }
            _ => {
                return Err(ParseError::new(
                    format!("expected term, phrase, or group after '{name}:'"),
                    Some(self.position),
                ));
            }
        };

        Ok(QueryExpr::Field {
            name,
            expr: Box::new(expr),
        })
    }

    /// Checks if the current token is a boost operator and applies it if so.
    fn maybe_apply_boost(&mut self, expr: QueryExpr) -> QueryExpr {
        if let Some(Token::Boost(factor)) = self.peek().cloned() {
            self.advance();
            QueryExpr::boost(expr, factor)
        } else {
            expr
        }
    }

    /// Parses a parenthesized group, consuming the surrounding parentheses.
    fn parse_group(&mut self, missing_rparen_msg: &str) -> Result<QueryExpr, ParseError> {
        self.advance(); // (
        let inner = self.parse_or_expr()?;

        if !self.check(&Token::RParen) {
            return Err(ParseError::new(missing_rparen_msg, Some(self.position)));
        }
        self.advance(); // )

        Ok(inner)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Checks if the current token matches the given token.
    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| mem::discriminant(t) == mem::discriminant(token))
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }
}

/// Parses a query string into an AST.
///
/// Returns `Ok(None)` for empty queries, `Ok(Some(expr))` for valid queries,
/// or `Err(QueryError)` for invalid syntax.
pub fn parse(input: &str) -> Result<Option<QueryExpr>, QueryError> {
    let tokens = tokenize(input).map_err(QueryError::from)?;
    Parser::new(tokens)
        .parse()
        .map_err(|e| QueryError::from(e).with_query(input))
}
