//! Document records and the request shape they are built from.
//!
//! A [`DocumentRecord`] is strongly typed: every field is present. Callers at
//! the service boundary hand over an [`IndexRequest`] whose fields are all
//! optional; converting it with `TryFrom` is the single validation point.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{IndexError, schema::names, snapshot::InternalId};

/// Reasons a record is rejected before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was absent from the request.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    /// The key is empty, so the record could never be replaced or deleted.
    #[error("document key must not be empty")]
    EmptyKey,
}

/// One indexed unit: a file or remote item with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    /// Unique external identifier, usually an absolute path.
    pub key: String,
    /// Display name; may be empty.
    pub name: String,
    /// Display description; may be empty.
    pub description: String,
    /// Full textual content.
    pub data: String,
    /// File extension tag, without the dot.
    pub file_extension: String,
    /// Tag naming where the record came from.
    pub data_source: String,
}

impl DocumentRecord {
    /// Checks the invariants the type system cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.key.is_empty() {
            return Err(ValidationError::EmptyKey);
        }
        Ok(())
    }
}

/// Wire shape of an upsert request; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRequest {
    /// Unique external identifier.
    pub key: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Display description.
    pub description: Option<String>,
    /// Full textual content.
    pub data: Option<String>,
    /// File extension tag.
    pub file_extension: Option<String>,
    /// Source tag.
    pub data_source: Option<String>,
}

impl TryFrom<IndexRequest> for DocumentRecord {
    type Error = ValidationError;

    fn try_from(request: IndexRequest) -> Result<Self, Self::Error> {
        /// Unwraps a required field or names it in the error.
        fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
            value.ok_or(ValidationError::MissingField(field))
        }

        let record = Self {
            key: required(request.key, names::KEY)?,
            name: required(request.name, names::NAME)?,
            description: required(request.description, names::DESCRIPTION)?,
            data: required(request.data, names::DATA)?,
            file_extension: required(request.file_extension, names::FILE_EXTENSION)?,
            data_source: required(request.data_source, names::DATA_SOURCE)?,
        };
        record.validate()?;
        Ok(record)
    }
}

impl From<DocumentRecord> for IndexRequest {
    fn from(record: DocumentRecord) -> Self {
        Self {
            key: Some(record.key),
            name: Some(record.name),
            description: Some(record.description),
            data: Some(record.data),
            file_extension: Some(record.file_extension),
            data_source: Some(record.data_source),
        }
    }
}

/// A record as read back from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    /// Internal id, valid only within the snapshot it was read from.
    pub id: InternalId,
    /// The stored fields.
    #[serde(flatten)]
    pub record: DocumentRecord,
    /// Upsert time in seconds since the epoch.
    pub modified_epoch_time: i64,
}

/// Outcome code of an upsert at the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertStatus {
    /// The record was buffered.
    Success,
    /// The store failed to buffer the record.
    StoreFailure,
    /// The record was rejected before anything was written.
    ValidationFailure,
}

impl UpsertStatus {
    /// Numeric code: 0 success, 1 store failure, 2 validation failure.
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::StoreFailure => 1,
            Self::ValidationFailure => 2,
        }
    }

    /// Maps an upsert outcome onto a status.
    pub fn from_result<T>(result: &Result<T, IndexError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(IndexError::Validation(_)) => Self::ValidationFailure,
            Err(_) => Self::StoreFailure,
        }
    }
}

impl fmt::Display for UpsertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
