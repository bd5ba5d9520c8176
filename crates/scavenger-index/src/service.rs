//! The boundary operations: submit, commit, search, get, delete.
//!
//! [`SearchService`] composes the store, query engine, highlighter and
//! recency gate. Every read pins one snapshot, so a search and the records
//! and fragments it returns all come from the same commit.

use std::{path::PathBuf, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    IndexError,
    engine::{QueryEngine, resolve_fields},
    highlight::HighlightEngine,
    recency::RecencyGate,
    record::{DocumentRecord, IndexRequest, StoredDocument, UpsertStatus},
    schema::IndexField,
    snapshot::{InternalId, Version},
    store::IndexStore,
};

/// Parameters of one search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    /// Query text.
    pub query: String,
    /// Contract field names to search; empty means the default set.
    pub fields: Vec<String>,
    /// Maximum number of documents returned.
    pub limit: usize,
    /// Match the query text literally instead of parsing it.
    pub escape_literal: bool,
    /// Highlight fragments per document; zero disables highlighting.
    pub fragments: usize,
    /// Maximum fragment length in characters.
    pub fragment_length: usize,
    /// Include the full `data` of each document.
    pub include_data: bool,
}

impl SearchRequest {
    /// A request for `query` with default settings.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            fields: Vec::new(),
            limit: 20,
            escape_literal: false,
            fragments: 3,
            fragment_length: 100,
            include_data: false,
        }
    }
}

/// One matching document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Internal id within the searched snapshot.
    pub id: InternalId,
    /// Unique external identifier.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// File extension tag.
    pub file_extension: String,
    /// Source tag.
    pub data_source: String,
    /// Upsert time in seconds since the epoch.
    pub modified_epoch_time: i64,
    /// Relevance score, for ordering only.
    pub score: f32,
    /// Full content, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Highlighted fragments, when `data` was searched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<String>>,
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Live documents in the searched snapshot.
    pub total_documents: u64,
    /// Matching documents before truncation.
    pub total_hits: usize,
    /// Best matches first.
    pub documents: Vec<SearchHit>,
}

/// Summary of the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    /// Directory of the index, if on disk.
    pub path: Option<PathBuf>,
    /// Latest published version.
    pub version: Version,
    /// Live documents.
    pub documents: u64,
    /// Documents modified within the recency window.
    pub recent_documents: usize,
    /// Buffered operations awaiting a commit.
    pub pending: usize,
    /// Number of index segments.
    pub segments: usize,
}

/// Search appliance facade over one store.
pub struct SearchService {
    /// The store.
    store: Arc<IndexStore>,
    /// Query compilation and execution.
    engine: QueryEngine,
    /// Fragment extraction.
    highlighter: HighlightEngine,
    /// Recency decisions.
    gate: RecencyGate,
}

impl SearchService {
    /// Creates a service with the default highlight markers.
    pub fn new(store: Arc<IndexStore>) -> Self {
        Self {
            engine: QueryEngine::new(&store),
            highlighter: HighlightEngine::new(&store),
            gate: RecencyGate::new(Arc::clone(&store)),
            store,
        }
    }

    /// Replaces the highlight markers.
    #[must_use]
    pub fn with_tags(mut self, pre_tag: impl Into<String>, post_tag: impl Into<String>) -> Self {
        self.highlighter = self.highlighter.with_tags(pre_tag, post_tag);
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    /// Validates and buffers a record; it becomes visible after [`Self::commit`].
    pub fn submit(&self, request: IndexRequest) -> UpsertStatus {
        let result = DocumentRecord::try_from(request)
            .map_err(IndexError::from)
            .and_then(|record| self.store.upsert(&record));
        if let Err(e) = &result {
            warn!(error = %e, "upsert rejected");
        }
        UpsertStatus::from_result(&result)
    }

    /// Publishes buffered operations.
    pub fn commit(&self) -> Result<Version, IndexError> {
        self.store.commit()
    }

    /// Buffers the removal of `key`.
    pub fn delete(&self, key: &str) -> Result<(), IndexError> {
        self.store.delete(key)
    }

    /// Looks up a document by its `<segment>.<doc>` id in the latest snapshot.
    pub fn get(&self, id: &str) -> Result<Option<StoredDocument>, IndexError> {
        let id: InternalId = id.parse()?;
        self.store.get(id)
    }

    /// Looks up a document by key in the latest snapshot.
    pub fn get_by_key(&self, key: &str) -> Result<Option<StoredDocument>, IndexError> {
        self.store.get_by_key(key)
    }

    /// Whether `key` was indexed within `window`.
    pub fn is_recently_indexed(&self, key: &str, window: Duration) -> Result<bool, IndexError> {
        self.gate.is_recently_indexed(key, window)
    }

    /// Runs a search and assembles the response.
    ///
    /// Highlights are attached only when `data` is among the searched fields
    /// and fragments were requested.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse, IndexError> {
        let requested = request
            .fields
            .iter()
            .map(|name| name.parse::<IndexField>())
            .collect::<Result<Vec<_>, _>>()?;
        let fields = resolve_fields(&requested);

        let snapshot = self.store.snapshot()?;
        let results = self.engine.search(
            &snapshot,
            &request.query,
            &fields,
            request.limit,
            request.escape_literal,
        )?;

        let mut highlights = if fields.contains(&IndexField::Data) && request.fragments > 0 {
            let ids: Vec<InternalId> = results.hits.iter().map(|hit| hit.id).collect();
            Some(self.highlighter.highlight(
                &snapshot,
                &request.query,
                &ids,
                request.fragments,
                request.fragment_length,
                request.escape_literal,
            )?)
        } else {
            None
        };

        let mut documents = Vec::with_capacity(results.hits.len());
        for hit in &results.hits {
            let Some(stored) = snapshot.get(hit.id)? else {
                continue;
            };
            let record = stored.record;
            documents.push(SearchHit {
                id: hit.id,
                key: record.key,
                name: record.name,
                description: record.description,
                file_extension: record.file_extension,
                data_source: record.data_source,
                modified_epoch_time: stored.modified_epoch_time,
                score: hit.score,
                data: request.include_data.then_some(record.data),
                highlights: highlights
                    .as_mut()
                    .map(|map| map.remove(&hit.id).unwrap_or_default()),
            });
        }

        Ok(SearchResponse {
            total_documents: snapshot.count(),
            total_hits: results.total_hits,
            documents,
        })
    }

    /// Summarizes the latest snapshot; `window` bounds the recent count.
    pub fn status(&self, window: Duration) -> Result<ServiceStatus, IndexError> {
        let snapshot = self.store.snapshot()?;
        let window_secs = i64::try_from(window.as_secs()).unwrap_or(i64::MAX);
        let since = self
            .store
            .clock()
            .now_epoch_secs()
            .saturating_sub(window_secs);
        let recent = self.engine.modified_within(&snapshot, since.., 0)?;
        Ok(ServiceStatus {
            path: self.store.path().map(PathBuf::from),
            version: snapshot.version(),
            documents: snapshot.count(),
            recent_documents: recent.total_hits,
            pending: self.store.pending()?,
            segments: self.store.segment_count()?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{ErrorKind, StoreOptions, clock::ManualClock};

    fn request(key: &str, description: &str, data: &str) -> IndexRequest {
        IndexRequest {
            key: Some(key.to_string()),
            name: Some(String::new()),
            description: Some(description.to_string()),
            data: Some(data.to_string()),
            file_extension: Some("py".to_string()),
            data_source: Some("disk".to_string()),
        }
    }

    fn service() -> SearchService {
        let store = IndexStore::create_in_ram(&StoreOptions::default()).unwrap();
        SearchService::new(Arc::new(store))
    }

    fn data_search(query: &str) -> SearchRequest {
        SearchRequest {
            fields: vec!["data".to_string()],
            ..SearchRequest::new(query)
        }
    }

    #[test]
    fn submit_reports_status_codes() {
        let service = service();
        assert_eq!(service.submit(request("/a.py", "", "x")), UpsertStatus::Success);

        let missing = IndexRequest {
            data: None,
            ..request("/b.py", "", "x")
        };
        assert_eq!(service.submit(missing).code(), 2);
        assert_eq!(service.store().pending().unwrap(), 1);
    }

    #[test]
    fn search_returns_records_and_highlights() {
        let service = service();
        service.submit(request("/a.py", "", "def dijkstra(): pass"));
        service.commit().unwrap();

        let response = service.search(&data_search("dijkstra")).unwrap();
        assert_eq!(response.total_hits, 1);
        assert_eq!(response.total_documents, 1);
        let hit = &response.documents[0];
        assert_eq!(hit.key, "/a.py");
        assert_eq!(hit.data, None);
        assert_eq!(
            hit.highlights.as_deref(),
            Some(&["def <b>dijkstra</b>(): pass".to_string()][..])
        );
    }

    #[test]
    fn highlights_require_data_field() {
        let service = service();
        service.submit(request("/a.py", "graph helpers", "def dijkstra(): pass"));
        service.commit().unwrap();

        let response = service
            .search(&SearchRequest {
                fields: vec!["description".to_string()],
                ..SearchRequest::new("graph")
            })
            .unwrap();
        assert_eq!(response.total_hits, 1);
        assert!(response.documents[0].highlights.is_none());

        let no_fragments = service
            .search(&SearchRequest {
                fragments: 0,
                ..data_search("dijkstra")
            })
            .unwrap();
        assert!(no_fragments.documents[0].highlights.is_none());
    }

    #[test]
    fn include_data_and_json_shape() {
        let service = service();
        service.submit(request("/a.py", "", "def dijkstra(): pass"));
        service.commit().unwrap();

        let response = service
            .search(&SearchRequest {
                include_data: true,
                fragments: 0,
                ..data_search("dijkstra")
            })
            .unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["totalHits"], 1);
        assert_eq!(json["totalDocuments"], 1);
        let doc = &json["documents"][0];
        assert_eq!(doc["key"], "/a.py");
        assert_eq!(doc["fileExtension"], "py");
        assert_eq!(doc["dataSource"], "disk");
        assert_eq!(doc["data"], "def dijkstra(): pass");
        assert!(doc.get("highlights").is_none());
        assert!(doc["id"].is_string());
    }

    #[test]
    fn unknown_field_names_are_rejected() {
        let service = service();
        let err = service
            .search(&SearchRequest {
                fields: vec!["title".to_string()],
                ..SearchRequest::new("x")
            })
            .unwrap_err();
        assert!(matches!(err, IndexError::InvalidField(_)));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn get_by_id_and_delete() {
        let service = service();
        service.submit(request("/a.py", "", "def dijkstra(): pass"));
        service.commit().unwrap();

        let response = service.search(&data_search("dijkstra")).unwrap();
        let id = response.documents[0].id.to_string();
        let doc = service.get(&id).unwrap().unwrap();
        assert_eq!(doc.record.key, "/a.py");
        assert!(matches!(service.get("nope"), Err(IndexError::InvalidId(_))));

        service.delete("/a.py").unwrap();
        service.commit().unwrap();
        let response = service.search(&data_search("dijkstra")).unwrap();
        assert_eq!(response.total_hits, 0);
        assert!(service.get_by_key("/a.py").unwrap().is_none());
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"query": "heap", "escapeLiteral": true}"#).unwrap();
        assert_eq!(request.query, "heap");
        assert!(request.escape_literal);
        assert_eq!(request.limit, 20);
        assert_eq!(request.fragments, 3);
    }

    #[test]
    fn status_counts_recent_documents() {
        let clock = Arc::new(ManualClock::new(100_000));
        let store = IndexStore::create_in_ram(&StoreOptions::default())
            .unwrap()
            .with_clock(clock.clone());
        let service = SearchService::new(Arc::new(store));

        service.submit(request("/old.py", "", "x"));
        service.commit().unwrap();
        clock.advance(Duration::from_secs(48 * 3600));
        service.submit(request("/new.py", "", "y"));
        service.commit().unwrap();
        service.submit(request("/pending.py", "", "z"));

        let status = service.status(Duration::from_secs(24 * 3600)).unwrap();
        assert_eq!(status.documents, 2);
        assert_eq!(status.recent_documents, 1);
        assert_eq!(status.pending, 1);
        assert!(status.path.is_none());
    }
}
