//! Error types for the scavenger-index crate.

use std::{io, path::PathBuf};

use scavenger_query::QueryError;
use thiserror::Error;

use crate::{record::ValidationError, remote::RemoteError};

/// Errors that can occur when working with the document index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A record failed validation; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Failed to open or create the index.
    #[error("failed to open index at {path}: {message}")]
    OpenIndex {
        /// Path to the index directory.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Failed to write to the index.
    #[error("failed to write to index: {0}")]
    Write(String),

    /// Failed to commit changes to the index.
    #[error("failed to commit index: {0}")]
    Commit(String),

    /// A failed commit could not be undone; the buffered operations are gone.
    #[error("failed to restore {dropped} buffered operations after a failed commit: {message}")]
    PendingLost {
        /// Operations dropped from the buffer.
        dropped: usize,
        /// Error that stopped the restore.
        message: String,
    },

    /// Failed to read from a snapshot.
    #[error("failed to read index: {0}")]
    Read(String),

    /// The query text could not be parsed or compiled.
    #[error("{0}")]
    Query(#[from] QueryError),

    /// The index on disk was built with a different analyzer.
    #[error(
        "index at {path} was built with analyzer {found}, current settings give {expected}; \
         delete the index directory and re-ingest"
    )]
    AnalyzerMismatch {
        /// Path to the index directory.
        path: PathBuf,
        /// Fingerprint of the configured analyzer.
        expected: String,
        /// Fingerprint stored beside the index.
        found: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A remote source failed to list or fetch its items.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A writer lock was poisoned by a panicking thread.
    #[error("index writer lock poisoned")]
    LockPoisoned,

    /// Invalid stemmer language.
    #[error("unsupported stemmer language: {0}")]
    InvalidLanguage(String),

    /// A field name outside the document contract.
    #[error("unknown field: {0}")]
    InvalidField(String),

    /// A malformed internal document id.
    #[error("invalid document id '{0}'; expected '<segment>.<doc>'")]
    InvalidId(String),
}

/// Broad error classes reported across the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller error in a record or argument; never retried.
    Validation,
    /// I/O or durability failure; safe to retry.
    Store,
    /// Malformed structured query; surfaced, not retried.
    QuerySyntax,
}

impl IndexError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_)
            | Self::InvalidLanguage(_)
            | Self::InvalidField(_)
            | Self::InvalidId(_) => ErrorKind::Validation,
            Self::Query(_) => ErrorKind::QuerySyntax,
            Self::OpenIndex { .. }
            | Self::Write(_)
            | Self::Commit(_)
            | Self::PendingLost { .. }
            | Self::Read(_)
            | Self::AnalyzerMismatch { .. }
            | Self::Io(_)
            | Self::Remote(_)
            | Self::LockPoisoned => ErrorKind::Store,
        }
    }

    /// True when retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Store
            && !matches!(self, Self::AnalyzerMismatch { .. } | Self::PendingLost { .. })
    }

    /// Creates an `OpenIndex` error from a path and Tantivy error.
    pub(crate) fn open_index(path: PathBuf, source: &tantivy::TantivyError) -> Self {
        Self::OpenIndex {
            path,
            message: source.to_string(),
        }
    }

    /// Creates a `Write` error from a Tantivy error.
    pub(crate) fn write(source: &tantivy::TantivyError) -> Self {
        Self::Write(source.to_string())
    }

    /// Creates a `Commit` error from a Tantivy error.
    pub(crate) fn commit(source: &tantivy::TantivyError) -> Self {
        Self::Commit(source.to_string())
    }

    /// Creates a `Read` error from a Tantivy error.
    pub(crate) fn read(source: &tantivy::TantivyError) -> Self {
        Self::Read(source.to_string())
    }
}
