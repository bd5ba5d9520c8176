//! Terminal presentation for scavenger.
//!
//! Syntax-highlighted display of configuration and JSON documents, styled
//! status lines, and conversion of marker-delimited search fragments into
//! ANSI emphasis.

#![warn(missing_docs)]

use syntect::{
    easy::HighlightLines,
    highlighting::Style,
    parsing::SyntaxSet,
    util::{LinesWithEndings, as_24_bit_terminal_escaped},
};
use two_face::{
    syntax::extra_newlines as extra_syntaxes,
    theme::{EmbeddedLazyThemeSet, EmbeddedThemeName, extra as extra_themes},
};

/// Highlights structured text for terminal output.
pub struct Highlighter {
    /// Language definitions, including TOML from the two-face extras.
    syntax_set: SyntaxSet,
    /// Embedded color themes.
    theme_set: EmbeddedLazyThemeSet,
    /// Active theme.
    theme: EmbeddedThemeName,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    /// Creates a highlighter using the Dracula theme.
    pub fn new() -> Self {
        Self::with_theme(EmbeddedThemeName::Dracula)
    }

    /// Creates a highlighter using `theme`.
    pub fn with_theme(theme: EmbeddedThemeName) -> Self {
        Self {
            syntax_set: extra_syntaxes(),
            theme_set: extra_themes(),
            theme,
        }
    }

    /// Highlights a TOML configuration.
    pub fn highlight_toml(&self, content: &str) -> String {
        self.highlight(content, "toml")
    }

    /// Highlights a JSON document.
    pub fn highlight_json(&self, content: &str) -> String {
        self.highlight(content, "json")
    }

    /// Highlights `content` as `syntax`, given as an extension or a syntax name.
    ///
    /// Unknown syntaxes fall back to plain text.
    pub fn highlight(&self, content: &str, syntax: &str) -> String {
        let definition = self
            .syntax_set
            .find_syntax_by_extension(syntax)
            .or_else(|| self.syntax_set.find_syntax_by_name(syntax))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut lines = HighlightLines::new(definition, self.theme_set.get(self.theme));
        let mut output = String::with_capacity(content.len() * 2);
        for line in LinesWithEndings::from(content) {
            let ranges: Vec<(Style, &str)> = lines
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_else(|_| vec![(Style::default(), line)]);
            output.push_str(&as_24_bit_terminal_escaped(&ranges, false));
        }
        output.push_str(colors::RESET);
        output
    }
}

/// ANSI escape sequences.
pub mod colors {
    /// Bold.
    pub const BOLD: &str = "\x1b[1m";
    /// Cyan, for headers.
    pub const CYAN: &str = "\x1b[36m";
    /// Green, for success.
    pub const GREEN: &str = "\x1b[32m";
    /// Yellow, for warnings and matched terms.
    pub const YELLOW: &str = "\x1b[33m";
    /// Red, for errors.
    pub const RED: &str = "\x1b[31m";
    /// Dim.
    pub const DIM: &str = "\x1b[2m";
    /// Resets all attributes.
    pub const RESET: &str = "\x1b[0m";
}

/// Wraps `text` in `codes` and a reset.
fn paint(codes: &[&str], text: &str) -> String {
    let mut out = codes.concat();
    out.push_str(text);
    out.push_str(colors::RESET);
    out
}

/// Bold cyan header.
pub fn header(text: &str) -> String {
    paint(&[colors::BOLD, colors::CYAN], text)
}

/// Bold subheader.
pub fn subheader(text: &str) -> String {
    paint(&[colors::BOLD], text)
}

/// Dimmed text.
pub fn dim(text: &str) -> String {
    paint(&[colors::DIM], text)
}

/// Green success text.
pub fn success(text: &str) -> String {
    paint(&[colors::GREEN], text)
}

/// Yellow warning text.
pub fn warning(text: &str) -> String {
    paint(&[colors::YELLOW], text)
}

/// Red error text.
pub fn error(text: &str) -> String {
    paint(&[colors::RED], text)
}

/// Dimmed horizontal rule.
pub fn rule(width: usize) -> String {
    dim(&"─".repeat(width))
}

/// Indents every line of `content` by three spaces.
pub fn indent_content(content: &str) -> String {
    content
        .lines()
        .map(|line| format!("   {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replaces `pre`/`post` marker pairs in a highlight fragment with bold yellow.
///
/// Markers are matched left to right; an unterminated `pre` marker leaves the
/// rest of the fragment untouched. Empty markers disable the conversion.
pub fn render_fragment(fragment: &str, pre: &str, post: &str) -> String {
    if pre.is_empty() || post.is_empty() {
        return fragment.to_string();
    }
    let mut out = String::with_capacity(fragment.len() + 16);
    let mut rest = fragment;
    while let Some(open) = rest.find(pre) {
        let after_open = &rest[open + pre.len()..];
        let Some(close) = after_open.find(post) else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push_str(&paint(&[colors::BOLD, colors::YELLOW], &after_open[..close]));
        rest = &after_open[close + post.len()..];
    }
    out.push_str(rest);
    out
}
