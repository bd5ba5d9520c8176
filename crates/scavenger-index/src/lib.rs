//! Tantivy-based document index for scavenger.
//!
//! This crate is the indexing-and-retrieval core of the search appliance.
//! It handles:
//! - Typed document records and validation of incoming requests
//! - A durable store with buffered upserts and snapshot-isolated commits
//! - Query compilation over one or several fields, with literal escaping
//! - Highlighted excerpts that never fabricate text
//! - A recency gate that prevents redundant re-indexing
//! - Filesystem ingestion and remote-account synchronization
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use scavenger_index::{IndexRequest, IndexStore, SearchRequest, SearchService, StoreOptions};
//!
//! let store = IndexStore::create_in_ram(&StoreOptions::default()).unwrap();
//! let service = SearchService::new(Arc::new(store));
//!
//! let status = service.submit(IndexRequest {
//!     key: Some("/a.py".into()),
//!     name: Some(String::new()),
//!     description: Some(String::new()),
//!     data: Some("def dijkstra(): pass".into()),
//!     file_extension: Some("py".into()),
//!     data_source: Some("disk".into()),
//! });
//! assert_eq!(status.code(), 0);
//! service.commit().unwrap();
//!
//! let request = SearchRequest {
//!     fields: vec!["data".into()],
//!     ..SearchRequest::new("dijkstra")
//! };
//! let response = service.search(&request).unwrap();
//! assert_eq!(response.total_hits, 1);
//! assert_eq!(response.documents[0].key, "/a.py");
//! ```

#![warn(missing_docs)]

mod analyzer;
mod attributes;
mod clock;
mod discovery;
mod engine;
mod error;
mod fingerprint;
mod highlight;
mod indexer;
mod query;
mod recency;
mod record;
mod remote;
mod schema;
mod service;
mod snapshot;
mod store;

pub use analyzer::{
    AnalyzedToken, NO_STEMMER, SCAVENGER_TOKENIZER, STOP_WORDS, analyze, build_analyzer,
    build_analyzer_from_name, parse_language,
};
pub use attributes::{MAX_ATTRIBUTE_SPAN, extract_attribute};
pub use clock::{Clock, ManualClock, SystemClock};
pub use discovery::{DiscoveredFile, discover_files};
pub use engine::{QueryEngine, RankedHit, RankedResults, resolve_fields};
pub use error::{ErrorKind, IndexError};
pub use fingerprint::{
    AnalyzerFingerprint, SCHEMA_VERSION, fingerprint_path, read_stored_fingerprint,
    write_fingerprint,
};
pub use highlight::{DEFAULT_POST_TAG, DEFAULT_PRE_TAG, HighlightEngine};
pub use indexer::{IndexStats, Indexer, ProgressReporter, SilentReporter};
pub use query::{CompileError, QueryCompiler, QueryError, QueryErrorKind, QueryExpr, parse as parse_query};
pub use recency::{DEFAULT_RECENCY_WINDOW, RecencyGate};
pub use record::{DocumentRecord, IndexRequest, StoredDocument, UpsertStatus, ValidationError};
pub use remote::{RemoteError, RemoteItem, RemoteSource, RemoteSync, SyncStats};
pub use schema::{FieldKind, IndexField, IndexSchema, names};
pub use service::{SearchHit, SearchRequest, SearchResponse, SearchService, ServiceStatus};
pub use snapshot::{InternalId, Snapshot, Version};
pub use store::{IndexStore, StoreOptions};
