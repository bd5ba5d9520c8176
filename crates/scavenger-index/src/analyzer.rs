//! Text analysis pipeline for the scavenger index.
//!
//! Implements a five-stage text analysis pipeline:
//! 1. `SimpleTokenizer` - splits on whitespace and punctuation
//! 2. `RemoveLongFilter` - removes tokens longer than 40 bytes
//! 3. `LowerCaser` - converts tokens to lowercase
//! 4. `StopWordFilter` - drops common English function words
//! 5. `Stemmer` - optional language-specific stemming
//!
//! The same pipeline analyzes document fields at index time, query terms at
//! compile time, and stored content when locating highlight spans. Any
//! asymmetry between those three uses silently loses recall.

use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, StopWordFilter,
    TextAnalyzer, TokenStream,
};

use crate::IndexError;

/// Name of the custom tokenizer registered with Tantivy.
pub const SCAVENGER_TOKENIZER: &str = "scavenger_text";

/// Maximum token length in bytes before filtering.
const MAX_TOKEN_LENGTH: usize = 40;

/// Stemmer setting that disables stemming.
pub const NO_STEMMER: &str = "none";

/// English stop words removed from every analyzed field.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// Parses a stemmer setting into an optional Tantivy `Language`.
///
/// `"none"` disables stemming. Other values are lowercase language names
/// matching Tantivy's `Language` enum; unknown names are an error.
pub fn parse_language(name: &str) -> Result<Option<Language>, IndexError> {
    let language = match name.to_lowercase().as_str() {
        NO_STEMMER => return Ok(None),
        "arabic" => Language::Arabic,
        "danish" => Language::Danish,
        "dutch" => Language::Dutch,
        "english" => Language::English,
        "finnish" => Language::Finnish,
        "french" => Language::French,
        "german" => Language::German,
        "greek" => Language::Greek,
        "hungarian" => Language::Hungarian,
        "italian" => Language::Italian,
        "norwegian" => Language::Norwegian,
        "portuguese" => Language::Portuguese,
        "romanian" => Language::Romanian,
        "russian" => Language::Russian,
        "spanish" => Language::Spanish,
        "swedish" => Language::Swedish,
        "tamil" => Language::Tamil,
        "turkish" => Language::Turkish,
        other => return Err(IndexError::InvalidLanguage(other.to_string())),
    };
    Ok(Some(language))
}

/// Builds the scavenger text analyzer with an optional stemmer.
pub fn build_analyzer(language: Option<Language>) -> TextAnalyzer {
    let builder = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LENGTH))
        .filter(LowerCaser)
        .filter(StopWordFilter::remove(
            STOP_WORDS.iter().map(|word| (*word).to_string()),
        ));
    match language {
        Some(language) => builder.filter(Stemmer::new(language)).build(),
        None => builder.build(),
    }
}

/// Builds the scavenger text analyzer from a stemmer setting.
///
/// Convenience function combining [`parse_language`] and [`build_analyzer`].
pub fn build_analyzer_from_name(stemmer: &str) -> Result<TextAnalyzer, IndexError> {
    let language = parse_language(stemmer)?;
    Ok(build_analyzer(language))
}

/// A token produced by the analyzer, with its byte span in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedToken {
    /// Normalized term text.
    pub text: String,
    /// Byte offset where the token starts.
    pub offset_from: usize,
    /// Byte offset one past the token end.
    pub offset_to: usize,
    /// Token position, counting removed stop words.
    pub position: usize,
}

/// Runs `text` through `analyzer` and collects every surviving token.
pub fn analyze(analyzer: &mut TextAnalyzer, text: &str) -> Vec<AnalyzedToken> {
    let mut stream = analyzer.token_stream(text);
    let mut tokens = Vec::new();
    while let Some(token) = stream.next() {
        tokens.push(AnalyzedToken {
            text: token.text.clone(),
            offset_from: token.offset_from,
            offset_to: token.offset_to,
            position: token.position,
        });
    }
    tokens
}
