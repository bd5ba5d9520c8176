//! Highlighted excerpts of matched documents.
//!
//! The stored `data` of each result is re-tokenized with the index analyzer,
//! tokens hit by the query's content-field terms are weighted by IDF and
//! clause boost, and the best non-overlapping windows are returned with the
//! hits wrapped in markers. Fragments are always copied from the stored text,
//! so stripping the markers yields a substring of `data`.

mod fragment;
mod terms;

use std::collections::HashMap;

use scavenger_query::{QueryError, parse};
use tantivy::{Term, schema::Field, tokenizer::TextAnalyzer};
use tracing::debug;

use self::{
    fragment::{Hit, render, select},
    terms::{TermCollector, TermMatcher},
};
use crate::{
    IndexError,
    analyzer::analyze,
    schema::{IndexField, IndexSchema},
    snapshot::{InternalId, Snapshot},
    store::IndexStore,
};

/// Marker placed before a highlighted term unless configured otherwise.
pub const DEFAULT_PRE_TAG: &str = "<b>";
/// Marker placed after a highlighted term unless configured otherwise.
pub const DEFAULT_POST_TAG: &str = "</b>";

/// Extracts highlighted fragments from the `data` field.
#[derive(Clone)]
pub struct HighlightEngine {
    /// Field handles.
    schema: IndexSchema,
    /// Analyzer the index was built with.
    analyzer: TextAnalyzer,
    /// Opening marker.
    pre_tag: String,
    /// Closing marker.
    post_tag: String,
}

impl HighlightEngine {
    /// Creates an engine using the store's analyzer and the default markers.
    pub fn new(store: &IndexStore) -> Self {
        Self {
            schema: store.schema().clone(),
            analyzer: store.analyzer(),
            pre_tag: DEFAULT_PRE_TAG.to_string(),
            post_tag: DEFAULT_POST_TAG.to_string(),
        }
    }

    /// Replaces the markers wrapped around matched terms. Empty markers are allowed.
    #[must_use]
    pub fn with_tags(mut self, pre_tag: impl Into<String>, post_tag: impl Into<String>) -> Self {
        self.pre_tag = pre_tag.into();
        self.post_tag = post_tag.into();
        self
    }

    /// Returns up to `max_fragments` fragments of at most `fragment_length`
    /// characters for each of `ids`.
    ///
    /// Documents with no locatable fragment map to an empty list. Ids that no
    /// longer resolve in `snapshot` are left out. Query syntax errors are
    /// reported the same way [`crate::QueryEngine::search`] reports them.
    pub fn highlight(
        &self,
        snapshot: &Snapshot,
        text: &str,
        ids: &[InternalId],
        max_fragments: usize,
        fragment_length: usize,
        escape_literal: bool,
    ) -> Result<HashMap<InternalId, Vec<String>>, IndexError> {
        let mut analyzer = self.analyzer.clone();
        let matchers = collect_matchers(&mut analyzer, text, escape_literal)?;
        let mut weights = TermWeights::new(snapshot, self.schema.data, &matchers);

        let mut fragments = HashMap::with_capacity(ids.len());
        for &id in ids {
            let Some(document) = snapshot.get(id)? else {
                continue;
            };
            let data = document.record.data;
            let tokens = analyze(&mut analyzer, &data);
            let mut hits = Vec::new();
            for (index, token) in tokens.iter().enumerate() {
                if let Some(weight) = weights.weight(&token.text)? {
                    hits.push(Hit { token: index, weight });
                }
            }

            let windows = select(&data, &tokens, &hits, max_fragments, fragment_length);
            let rendered: Vec<String> = windows
                .iter()
                .map(|w| render(&data, &tokens, &hits, w, &self.pre_tag, &self.post_tag))
                .collect();
            debug!(%id, hits = hits.len(), fragments = rendered.len(), "highlight");
            fragments.insert(id, rendered);
        }
        Ok(fragments)
    }
}

/// Builds the content-field matchers for `text`.
fn collect_matchers(
    analyzer: &mut TextAnalyzer,
    text: &str,
    escape_literal: bool,
) -> Result<Vec<TermMatcher>, IndexError> {
    let collector = TermCollector::new(analyzer, IndexField::Data);
    if escape_literal {
        return Ok(collector.literal(text));
    }
    let Some(expr) = parse(text).map_err(|e| IndexError::Query(e.with_query(text)))? else {
        return Ok(Vec::new());
    };
    collector
        .expression(&expr, IndexField::Data)
        .map_err(|e| IndexError::Query(QueryError::from(e).with_query(text)))
}

/// Per-term weights, computed once per distinct token.
struct TermWeights<'a> {
    /// Snapshot supplying document frequencies.
    snapshot: &'a Snapshot,
    /// The content field.
    field: Field,
    /// Query term matchers.
    matchers: &'a [TermMatcher],
    /// Weight for each token seen so far; `None` when no matcher hits it.
    cache: HashMap<String, Option<f32>>,
}

impl<'a> TermWeights<'a> {
    /// Starts an empty cache.
    fn new(
        snapshot: &'a Snapshot,
        field: Field,
        matchers: &'a [TermMatcher],
    ) -> Self {
        Self {
            snapshot,
            field,
            matchers,
            cache: HashMap::new(),
        }
    }

    /// Boost times IDF for `token`, or `None` when the query does not hit it.
    fn weight(&mut self, token: &str) -> Result<Option<f32>, IndexError> {
        if self.matchers.is_empty() {
            return Ok(None);
        }
        if let Some(weight) = self.cache.get(token) {
            return Ok(*weight);
        }

        let boost = self
            .matchers
            .iter()
            .filter(|m| m.matches(token))
            .map(|m| m.boost)
            .reduce(f32::max);
        let weight = match boost {
            Some(boost) => Some(boost * self.idf(token)?),
            None => None,
        };
        self.cache.insert(token.to_string(), weight);
        Ok(weight)
    }

    /// BM25 inverse document frequency of `token` in the content field.
    #[allow(clippy::cast_precision_loss)]
    fn idf(&self, token: &str) -> Result<f32, IndexError> {
        let searcher = self.snapshot.searcher();
        let doc_freq = searcher
            .doc_freq(&Term::from_field_text(self.field, token))
            .map_err(|e| IndexError::read(&e))? as f32;
        let docs = searcher.num_docs() as f32;
        Ok((1.0 + (docs - doc_freq + 0.5) / (doc_freq + 0.5)).ln())
    }
}
