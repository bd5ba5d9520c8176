//! Immutable, point-in-time views of the index.
//!
//! A [`Snapshot`] pins the segments that were published by one commit.
//! Commits that land while it is held do not change what it returns.

use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};
use tantivy::{
    DocAddress, Searcher, TantivyDocument, Term,
    collector::TopDocs,
    query::TermQuery,
    schema::{Field, IndexRecordOption, Value},
};

use crate::{
    IndexError,
    record::{DocumentRecord, StoredDocument},
    schema::IndexSchema,
};

/// Identifies a published snapshot; increases with every commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Version(pub u64);

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of a document inside one snapshot, written `<segment>.<doc>`.
///
/// Ids are not stable across commits; re-resolve by key instead of caching
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InternalId {
    /// Segment ordinal within the snapshot.
    pub segment: u32,
    /// Document number within the segment.
    pub doc: u32,
}

impl From<DocAddress> for InternalId {
    fn from(address: DocAddress) -> Self {
        Self {
            segment: address.segment_ord,
            doc: address.doc_id,
        }
    }
}

impl From<InternalId> for DocAddress {
    fn from(id: InternalId) -> Self {
        Self::new(id.segment, id.doc)
    }
}

impl fmt::Display for InternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.segment, self.doc)
    }
}

impl FromStr for InternalId {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IndexError::InvalidId(s.to_string());
        let (segment, doc) = s.split_once('.').ok_or_else(invalid)?;
        Ok(Self {
            segment: segment.parse().map_err(|_| invalid())?,
            doc: doc.parse().map_err(|_| invalid())?,
        })
    }
}

impl Serialize for InternalId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A consistent read view pinned to one commit.
#[derive(Clone)]
pub struct Snapshot {
    /// Tantivy searcher holding the pinned segments.
    searcher: Searcher,
    /// Field handles.
    schema: IndexSchema,
    /// Commit that produced this view.
    version: Version,
}

impl Snapshot {
    /// Wraps a freshly reloaded searcher.
    pub(crate) fn new(searcher: Searcher, schema: IndexSchema, version: Version) -> Self {
        Self {
            searcher,
            schema,
            version,
        }
    }

    /// The commit this snapshot reflects.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Number of live documents.
    pub fn count(&self) -> u64 {
        self.searcher.num_docs()
    }

    /// The underlying Tantivy searcher.
    pub(crate) fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    /// Field handles for this snapshot.
    pub(crate) fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    /// Looks up a document by internal id.
    ///
    /// Ids that point past the end of a segment, or at a deleted document,
    /// resolve to `None`.
    pub fn get(&self, id: InternalId) -> Result<Option<StoredDocument>, IndexError> {
        let Some(segment) = self.searcher.segment_readers().get(id.segment as usize) else {
            return Ok(None);
        };
        if id.doc >= segment.max_doc() {
            return Ok(None);
        }
        if segment
            .alive_bitset()
            .is_some_and(|alive| alive.is_deleted(id.doc))
        {
            return Ok(None);
        }
        self.load(id).map(Some)
    }

    /// Looks up the live document with exactly this key.
    pub fn get_by_key(&self, key: &str) -> Result<Option<StoredDocument>, IndexError> {
        let query = TermQuery::new(
            Term::from_field_text(self.schema.key, key),
            IndexRecordOption::Basic,
        );
        let top_docs = self
            .searcher
            .search(&query, &TopDocs::with_limit(1))
            .map_err(|e| IndexError::read(&e))?;
        match top_docs.first() {
            Some((_, address)) => self.load((*address).into()).map(Some),
            None => Ok(None),
        }
    }

    /// Reads the stored fields of a document known to exist.
    pub(crate) fn load(&self, id: InternalId) -> Result<StoredDocument, IndexError> {
        let doc: TantivyDocument = self
            .searcher
            .doc(id.into())
            .map_err(|e| IndexError::read(&e))?;

        Ok(StoredDocument {
            id,
            record: DocumentRecord {
                key: text_field(&doc, self.schema.key),
                name: text_field(&doc, self.schema.name),
                description: text_field(&doc, self.schema.description),
                data: text_field(&doc, self.schema.data),
                file_extension: text_field(&doc, self.schema.file_extension),
                data_source: text_field(&doc, self.schema.data_source),
            },
            modified_epoch_time: doc
                .get_first(self.schema.modified_epoch_time)
                .and_then(|v| v.as_i64())
                .unwrap_or_default(),
        })
    }

    /// Reads only the stored `data` field of a document.
    pub(crate) fn load_data(&self, id: InternalId) -> Result<String, IndexError> {
        let doc: TantivyDocument = self
            .searcher
            .doc(id.into())
            .map_err(|e| IndexError::read(&e))?;
        Ok(text_field(&doc, self.schema.data))
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("version", &self.version)
            .field("docs", &self.count())
            .finish()
    }
}

/// Extracts a stored text field, empty when absent.
fn text_field(doc: &TantivyDocument, field: Field) -> String {
    doc.get_first(field)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}
