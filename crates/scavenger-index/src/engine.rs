//! Query execution over a snapshot.
//!
//! [`QueryEngine`] compiles one independent sub-query per searched field and
//! combines them: a single field is required, several fields are optional
//! alternatives, so a document qualifies by matching any of them.

use std::ops::RangeBounds;

use scavenger_query::{QueryError, parse};
use tantivy::{
    collector::{Count, TopDocs},
    query::{BooleanQuery, Occur, Query, RangeQuery},
    tokenizer::TextAnalyzer,
};
use tracing::debug;

use crate::{
    IndexError,
    query::QueryCompiler,
    schema::{IndexField, IndexSchema, names},
    snapshot::{InternalId, Snapshot},
    store::IndexStore,
};

/// One ranked match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedHit {
    /// Document address in the searched snapshot.
    pub id: InternalId,
    /// Relevance score; only meaningful for ordering.
    pub score: f32,
}

/// Ranked matches truncated to the requested limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedResults {
    /// Best matches first.
    pub hits: Vec<RankedHit>,
    /// Number of matching documents before truncation.
    pub total_hits: usize,
}

/// Compiles and runs queries.
#[derive(Clone)]
pub struct QueryEngine {
    /// Field handles.
    schema: IndexSchema,
    /// Analyzer the index was built with.
    analyzer: TextAnalyzer,
}

impl QueryEngine {
    /// Creates an engine that analyzes queries the way `store` analyzes documents.
    pub fn new(store: &IndexStore) -> Self {
        Self {
            schema: store.schema().clone(),
            analyzer: store.analyzer(),
        }
    }

    /// Searches `fields` of `snapshot` for `text`.
    ///
    /// An empty `fields` slice searches the default fields (`path`, `name`,
    /// `description`, `data`). With `escape_literal` the text matches only its
    /// literal character sequence; otherwise it is parsed as a structured
    /// query and syntax errors are returned.
    pub fn search(
        &self,
        snapshot: &Snapshot,
        text: &str,
        fields: &[IndexField],
        limit: usize,
        escape_literal: bool,
    ) -> Result<RankedResults, IndexError> {
        let query = self.build_query(text, fields, escape_literal)?;
        let results = match query {
            Some(query) => execute(snapshot, &*query, limit)?,
            None => RankedResults::default(),
        };
        debug!(
            query = text,
            literal = escape_literal,
            total_hits = results.total_hits,
            returned = results.hits.len(),
            "search"
        );
        Ok(results)
    }

    /// Finds documents whose `modifiedEpochTime` falls in `range`.
    pub fn modified_within(
        &self,
        snapshot: &Snapshot,
        range: impl RangeBounds<i64>,
        limit: usize,
    ) -> Result<RankedResults, IndexError> {
        let query = RangeQuery::new_i64_bounds(
            names::MODIFIED_EPOCH_TIME.to_string(),
            range.start_bound().cloned(),
            range.end_bound().cloned(),
        );
        execute(snapshot, &query, limit)
    }

    /// Compiles `text` over `fields` into one combined query.
    ///
    /// Returns `None` when nothing in the text survives analysis.
    pub fn build_query(
        &self,
        text: &str,
        fields: &[IndexField],
        escape_literal: bool,
    ) -> Result<Option<Box<dyn Query>>, IndexError> {
        let fields = resolve_fields(fields);
        let mut compiler = QueryCompiler::new(self.schema.clone(), self.analyzer.clone());
        let to_query_error = |e| IndexError::Query(QueryError::from(e).with_query(text));

        let mut sub_queries = Vec::with_capacity(fields.len());
        if escape_literal {
            for field in &fields {
                sub_queries.extend(compiler.compile_literal(text, *field).map_err(to_query_error)?);
            }
        } else {
            let Some(expr) = parse(text).map_err(|e| IndexError::Query(e.with_query(text)))? else {
                return Ok(None);
            };
            for field in &fields {
                sub_queries.extend(compiler.compile(&expr, *field).map_err(to_query_error)?);
            }
        }

        if sub_queries.is_empty() {
            return Ok(None);
        }
        let occur = if fields.len() == 1 {
            Occur::Must
        } else {
            Occur::Should
        };
        let clauses = sub_queries.into_iter().map(|q| (occur, q)).collect();
        Ok(Some(Box::new(BooleanQuery::new(clauses))))
    }
}

/// Applies the default field set and drops duplicates, keeping order.
pub fn resolve_fields(fields: &[IndexField]) -> Vec<IndexField> {
    let source: &[IndexField] = if fields.is_empty() {
        &IndexField::DEFAULT_SEARCH
    } else {
        fields
    };
    let mut resolved = Vec::with_capacity(source.len());
    for field in source {
        if !resolved.contains(field) {
            resolved.push(*field);
        }
    }
    resolved
}

/// Runs a compiled query, collecting the top `limit` hits and the total count.
fn execute(
    snapshot: &Snapshot,
    query: &dyn Query,
    limit: usize,
) -> Result<RankedResults, IndexError> {
    let searcher = snapshot.searcher();
    if limit == 0 {
        let total_hits = searcher
            .search(query, &Count)
            .map_err(|e| IndexError::read(&e))?;
        return Ok(RankedResults {
            hits: Vec::new(),
            total_hits,
        });
    }

    let (top_docs, total_hits) = searcher
        .search(query, &(TopDocs::with_limit(limit), Count))
        .map_err(|e| IndexError::read(&e))?;
    let hits = top_docs
        .into_iter()
        .map(|(score, address)| RankedHit {
            id: address.into(),
            score,
        })
        .collect();
    Ok(RankedResults { hits, total_hits })
}
