//! Query lexer (tokenizer).
//!
//! Converts a query string into a stream of tokens for the parser. Backslash
//! escapes are resolved here: an escaped character is always literal text,
//! never an operator or a wildcard.

use std::{iter::Peekable, str::Chars};

use crate::error::LexError;

/// A token in the query language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A bare word with escapes resolved.
    Term(String),

    /// A word containing unescaped `*` or `?`.
    ///
    /// The pattern keeps wildcards bare and literal characters that needed
    /// escaping prefixed with a backslash, so [`crate::wildcard_regex`] can
    /// tell them apart.
    Wildcard(String),

    /// A quoted phrase (the quotes are stripped, content preserved).
    Phrase(String),

    /// The OR keyword.
    Or,

    /// The AND keyword.
    And,

    /// Negation: the `-` prefix or the NOT keyword.
    Not,

    /// Requirement prefix (`+`).
    Plus,

    /// Left parenthesis.
    LParen,

    /// Right parenthesis.
    RParen,

    /// Field prefix (e.g., "name:" produces FieldPrefix("name")).
    FieldPrefix(String),

    /// Boost operator with factor (e.g., "^2.5" produces Boost(2.5)).
    Boost(f32),

    /// Tilde suffix with an optional number (`~` or `~1`).
    ///
    /// After a term it requests fuzzy matching; after a phrase it sets slop.
    Tilde(Option<u32>),
}

/// Returns true for characters that terminate a bare word.
fn is_word_break(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '(' | ')' | '"' | '^' | '~')
}

/// Tokenizes a query string.
struct Lexer<'a> {
    /// The original input string.
    input: &'a str,
    /// Character iterator with one-character lookahead.
    chars: Peekable<Chars<'a>>,
    /// Current byte position in input.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    /// Creates an error at a specific position.
    fn error_at(&self, message: impl Into<String>, position: usize) -> LexError {
        LexError::new(message, position, self.input)
    }

    /// Tokenizes the entire input, returning all tokens or an error.
    fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Returns the next token, or None if at end of input.
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();

        let Some(&ch) = self.chars.peek() else {
            return Ok(None);
        };

        match ch {
            '"' => self.read_phrase(),
            '(' => {
                self.advance();
                Ok(Some(Token::LParen))
            }
            ')' => {
                self.advance();
                Ok(Some(Token::RParen))
            }
            '-' => {
                self.advance();
                Ok(Some(Token::Not))
            }
            '+' => {
                self.advance();
                Ok(Some(Token::Plus))
            }
            '^' => self.read_boost(),
            '~' => self.read_tilde(),
            _ => self.read_word(),
        }
    }

    /// Reads a quoted phrase. `\"` inside the phrase is a literal quote.
    fn read_phrase(&mut self) -> Result<Option<Token>, LexError> {
        let start_pos = self.position;
        self.advance(); // opening quote

        let mut content = String::new();

        loop {
            match self.chars.peek() {
                Some(&'"') => {
                    self.advance();
                    return Ok(Some(Token::Phrase(content)));
                }
                Some(&'\\') => {
                    let escape_pos = self.position;
                    self.advance();
                    let Some(escaped) = self.chars.peek().copied() else {
                        return Err(self.error_at("dangling escape", escape_pos));
                    };
                    content.push(escaped);
                    self.advance();
                }
                Some(&ch) => {
                    content.push(ch);
                    self.advance();
                }
                None => {
                    return Err(self.error_at("unclosed quote", start_pos));
                }
            }
        }
    }

    /// Reads a term, wildcard pattern, keyword, or field prefix.
    fn read_word(&mut self) -> Result<Option<Token>, LexError> {
        let mut text = String::new();
        let mut pattern = String::new();
        let mut escaped_any = false;
        let mut wildcard = false;

        while let Some(&ch) = self.chars.peek() {
            if is_word_break(ch) {
                break;
            }

            if ch == '\\' {
                let escape_pos = self.position;
                self.advance();
                let Some(escaped) = self.chars.peek().copied() else {
                    return Err(self.error_at("dangling escape", escape_pos));
                };
                text.push(escaped);
                pattern.push('\\');
                pattern.push(escaped);
                escaped_any = true;
                self.advance();
                continue;
            }

            if ch == ':' {
                self.advance();
                if text.is_empty() {
                    continue;
                }
                return Ok(Some(Token::FieldPrefix(text)));
            }

            if ch == '*' || ch == '?' {
                wildcard = true;
            }
            text.push(ch);
            pattern.push(ch);
            self.advance();
        }

        if text.is_empty() {
            return Ok(None);
        }

        if wildcard {
            return Ok(Some(Token::Wildcard(pattern)));
        }

        if !escaped_any {
            match text.as_str() {
                "OR" | "||" => return Ok(Some(Token::Or)),
                "AND" | "&&" => return Ok(Some(Token::And)),
                "NOT" => return Ok(Some(Token::Not)),
                _ => {}
            }
        }

        Ok(Some(Token::Term(text)))
    }

    /// Reads a boost operator (^N or ^N.N).
    fn read_boost(&mut self) -> Result<Option<Token>, LexError> {
        let start_pos = self.position;
        self.advance(); // '^'

        let number = self.read_number(true);

        if number.is_empty() {
            return Err(self.error_at("expected number after '^'", start_pos));
        }

        match number.parse::<f32>() {
            Ok(factor) => Ok(Some(Token::Boost(factor))),
            Err(_) => Err(self.error_at(format!("invalid boost value: {number}"), start_pos)),
        }
    }

    /// Reads a tilde suffix with an optional integer argument.
    fn read_tilde(&mut self) -> Result<Option<Token>, LexError> {
        let start_pos = self.position;
        self.advance(); // '~'

        let number = self.read_number(false);
        if number.is_empty() {
            return Ok(Some(Token::Tilde(None)));
        }

        match number.parse::<u32>() {
            Ok(value) => Ok(Some(Token::Tilde(Some(value)))),
            Err(_) => Err(self.error_at(format!("invalid value after '~': {number}"), start_pos)),
        }
    }

    /// Reads a run of digits, optionally with one decimal point.
    fn read_number(&mut self, allow_decimal: bool) -> String {
        let mut number = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_digit() || (allow_decimal && ch == '.' && !number.contains('.')) {
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        number
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Advances to the next character.
    fn advance(&mut self) {
        if let Some(ch) = self.chars.next() {
            self.position += ch.len_utf8();
        }
    }
}

/// Convenience function to tokenize a query string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).tokenize()
}
