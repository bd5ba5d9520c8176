//! Escaping helpers for embedding literal text in queries.

/// Characters with syntactic meaning somewhere in the query language.
const SPECIAL: &[char] = &[
    '\\', '+', '-', '!', '(', ')', ':', '^', '[', ']', '"', '{', '}', '~', '*', '?', '|', '&',
    '/',
];

/// Words that the lexer reads as operators.
const KEYWORDS: &[&str] = &["OR", "AND", "NOT"];

/// Characters that must be escaped inside a regular expression.
const REGEX_META: &[char] = &[
    '\\', '.', '+', '*', '?', '(', ')', '|', '[', ']', '{', '}', '^', '$', '#', '&', '-', '~',
];

/// Escapes every metacharacter in `text` with a backslash.
///
/// The result parses back into literal terms, one per whitespace-separated
/// word. Bare operator keywords are escaped too, so `a OR b` stays three
/// terms.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for piece in text.split_inclusive(char::is_whitespace) {
        let word = piece.trim_end_matches(char::is_whitespace);
        if KEYWORDS.contains(&word) {
            out.push('\\');
        }
        for ch in piece.chars() {
            if SPECIAL.contains(&ch) {
                out.push('\\');
            }
            out.push(ch);
        }
    }
    out
}

/// Converts a wildcard pattern into an anchored regular expression.
///
/// `*` matches any run of characters and `?` any single character.
/// Backslash-escaped characters are literal. Literal text is lowercased to
/// line up with the lowercased terms in the index.
pub fn wildcard_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '\\' => {
                if let Some(escaped) = chars.next() {
                    push_literal(&mut regex, escaped);
                }
            }
            other => push_literal(&mut regex, other),
        }
    }
    regex
}

/// Appends a lowercased literal character to a regex, escaping as needed.
fn push_literal(regex: &mut String, ch: char) {
    for lower in ch.to_lowercase() {
        if REGEX_META.contains(&lower) {
            regex.push('\\');
        }
        regex.push(lower);
    }
}
