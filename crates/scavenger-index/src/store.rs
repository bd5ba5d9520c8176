//! The durable document store.
//!
//! [`IndexStore`] owns the Tantivy index, its single writer and the reader
//! that publishes snapshots. Upserts and deletes are buffered in the writer
//! and mirrored into a journal; [`IndexStore::commit`] is the only point where
//! they become durable and visible. If a commit fails the writer is rolled
//! back and the journal replayed, so the buffered operations stay pending
//! for a retry.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, RwLock},
};

use scavenger_config::IndexSettings;
use tantivy::{
    Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term,
    directory::MmapDirectory, tokenizer::TextAnalyzer,
};
use tracing::{debug, error, info, warn};

use crate::{
    IndexError,
    analyzer::{SCAVENGER_TOKENIZER, build_analyzer_from_name},
    clock::{Clock, SystemClock},
    fingerprint::{AnalyzerFingerprint, read_stored_fingerprint, write_fingerprint},
    record::{DocumentRecord, StoredDocument},
    schema::IndexSchema,
    snapshot::{InternalId, Snapshot, Version},
};

/// Default heap size for the index writer (50 MB).
const DEFAULT_HEAP_SIZE: usize = 50_000_000;

/// Placeholder location reported for in-memory indexes.
const IN_MEMORY: &str = ":memory:";

/// Settings that shape how a store is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Stemmer language, or "none".
    pub stemmer: String,
    /// Writer memory budget in bytes.
    pub writer_heap_bytes: usize,
}

impl StoreOptions {
    /// Builds options from the `[index]` configuration section.
    pub fn from_settings(settings: &IndexSettings) -> Self {
        Self {
            stemmer: settings.stemmer.clone(),
            writer_heap_bytes: settings.writer_heap_mb.saturating_mul(1_000_000),
        }
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            stemmer: String::from("none"),
            writer_heap_bytes: DEFAULT_HEAP_SIZE,
        }
    }
}

/// A buffered operation, kept so it can be replayed after a failed commit.
#[derive(Debug, Clone)]
enum PendingOp {
    /// Delete-then-add of a whole record.
    Upsert {
        /// Record key.
        key: String,
        /// Fully built document.
        doc: TantivyDocument,
    },
    /// Tombstone for every document under a key.
    Delete {
        /// Record key.
        key: String,
    },
}

/// Writer plus the journal of what it has buffered since the last commit.
struct WriterState {
    /// The underlying Tantivy writer.
    writer: IndexWriter,
    /// Operations buffered since the last successful commit.
    journal: Vec<PendingOp>,
}

/// Durable inverted index plus stored fields, keyed by document key.
///
/// All mutation goes through one writer guarded by a mutex, so the store can
/// be shared across threads. Readers take a [`Snapshot`] and never observe
/// uncommitted operations.
///
/// Each buffered upsert is held twice until the next commit: once in the
/// writer and once in the replay journal. Large ingestion batches should
/// commit periodically to bound that memory.
pub struct IndexStore {
    /// Schema with field handles.
    schema: IndexSchema,
    /// Analyzer registered for the text fields.
    analyzer: TextAnalyzer,
    /// Reader reloaded after each commit.
    reader: IndexReader,
    /// The single writer and its journal.
    writer: Mutex<WriterState>,
    /// Most recently published snapshot.
    published: RwLock<Snapshot>,
    /// Time source for `modifiedEpochTime`.
    clock: Arc<dyn Clock>,
    /// Index directory, or `None` for an in-memory index.
    path: Option<PathBuf>,
}

impl IndexStore {
    /// Opens or creates an index at the given path.
    ///
    /// A non-empty index built with a different analyzer is refused with
    /// [`IndexError::AnalyzerMismatch`].
    pub fn open(path: &Path, options: &StoreOptions) -> Result<Self, IndexError> {
        let analyzer = build_analyzer_from_name(&options.stemmer)?;
        let schema = IndexSchema::new();

        fs::create_dir_all(path)?;

        let dir = MmapDirectory::open(path).map_err(|e| {
            let err: tantivy::TantivyError = e.into();
            IndexError::open_index(path.to_path_buf(), &err)
        })?;

        let index = Index::open_or_create(dir, schema.schema().clone())
            .map_err(|e| IndexError::open_index(path.to_path_buf(), &e))?;

        let store = Self::from_index(index, schema, analyzer, options, Some(path.to_path_buf()))?;
        store.check_fingerprint(path, &options.stemmer)?;
        Ok(store)
    }

    /// Creates an empty index held entirely in memory.
    pub fn create_in_ram(options: &StoreOptions) -> Result<Self, IndexError> {
        let analyzer = build_analyzer_from_name(&options.stemmer)?;
        let schema = IndexSchema::new();
        let index = Index::create_in_ram(schema.schema().clone());
        Self::from_index(index, schema, analyzer, options, None)
    }

    /// Replaces the time source used for `modifiedEpochTime`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Wires up tokenizer, writer and reader around an opened index.
    fn from_index(
        index: Index,
        schema: IndexSchema,
        analyzer: TextAnalyzer,
        options: &StoreOptions,
        path: Option<PathBuf>,
    ) -> Result<Self, IndexError> {
        let location = path.clone().unwrap_or_else(|| PathBuf::from(IN_MEMORY));

        index
            .tokenizers()
            .register(SCAVENGER_TOKENIZER, analyzer.clone());

        let writer = index
            .writer(options.writer_heap_bytes)
            .map_err(|e| IndexError::open_index(location.clone(), &e))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| IndexError::open_index(location.clone(), &e))?;

        let opstamp = index
            .load_metas()
            .map_err(|e| IndexError::open_index(location, &e))?
            .opstamp;
        let snapshot = Snapshot::new(reader.searcher(), schema.clone(), Version(opstamp));

        Ok(Self {
            schema,
            analyzer,
            reader,
            writer: Mutex::new(WriterState {
                writer,
                journal: Vec::new(),
            }),
            published: RwLock::new(snapshot),
            clock: Arc::new(SystemClock),
            path,
        })
    }

    /// Compares the stored analyzer fingerprint with the configured one.
    ///
    /// An empty index adopts the configured analyzer.
    fn check_fingerprint(&self, path: &Path, stemmer: &str) -> Result<(), IndexError> {
        let expected = AnalyzerFingerprint::new(stemmer).hash_string();
        if let Some(found) = read_stored_fingerprint(path) {
            if found == expected {
                return Ok(());
            }
            if self.count()? > 0 {
                return Err(IndexError::AnalyzerMismatch {
                    path: path.to_path_buf(),
                    expected,
                    found,
                });
            }
        }
        debug!(path = %path.display(), fingerprint = %expected, "recording analyzer");
        write_fingerprint(path, &expected)?;
        Ok(())
    }

    /// Buffers a replacement of every document under `record.key`.
    ///
    /// `modifiedEpochTime` is stamped from the store's clock. Nothing is
    /// visible to readers until [`commit`](Self::commit).
    pub fn upsert(&self, record: &DocumentRecord) -> Result<(), IndexError> {
        record.validate()?;
        let doc = self.build_document(record);

        let mut state = self.lock_writer()?;
        state.writer.delete_term(self.key_term(&record.key));
        state
            .writer
            .add_document(doc.clone())
            .map_err(|e| IndexError::write(&e))?;
        state.journal.push(PendingOp::Upsert {
            key: record.key.clone(),
            doc,
        });
        debug!(key = %record.key, "buffered upsert");
        Ok(())
    }

    /// Buffers a tombstone for every document under `key`.
    pub fn delete(&self, key: &str) -> Result<(), IndexError> {
        let mut state = self.lock_writer()?;
        state.writer.delete_term(self.key_term(key));
        state.journal.push(PendingOp::Delete {
            key: key.to_string(),
        });
        debug!(key, "buffered delete");
        Ok(())
    }

    /// Publishes all buffered operations as a new snapshot.
    ///
    /// On failure the buffered operations remain pending and the error is
    /// returned; calling `commit` again retries them.
    pub fn commit(&self) -> Result<Version, IndexError> {
        let mut state = self.lock_writer()?;
        match state.writer.commit() {
            Ok(opstamp) => {
                let operations = state.journal.len();
                state.journal.clear();

                self.reader.reload().map_err(|e| IndexError::commit(&e))?;
                let snapshot =
                    Snapshot::new(self.reader.searcher(), self.schema.clone(), Version(opstamp));
                *self
                    .published
                    .write()
                    .map_err(|_| IndexError::LockPoisoned)? = snapshot;

                info!(version = opstamp, operations, "committed index");
                Ok(Version(opstamp))
            }
            Err(err) => {
                warn!(error = %err, pending = state.journal.len(), "commit failed; restoring buffered operations");
                Self::restore(&mut state, &self.schema)?;
                Err(IndexError::commit(&err))
            }
        }
    }

    /// Discards every operation buffered since the last commit.
    ///
    /// Returns how many operations were dropped.
    pub fn rollback(&self) -> Result<usize, IndexError> {
        let mut state = self.lock_writer()?;
        state
            .writer
            .rollback()
            .map_err(|e| IndexError::commit(&e))?;
        let dropped = state.journal.len();
        state.journal.clear();
        info!(dropped, "rolled back index");
        Ok(dropped)
    }

    /// Number of operations buffered since the last commit.
    pub fn pending(&self) -> Result<usize, IndexError> {
        Ok(self.lock_writer()?.journal.len())
    }

    /// Returns the most recently published snapshot.
    pub fn snapshot(&self) -> Result<Snapshot, IndexError> {
        self.published
            .read()
            .map(|snapshot| snapshot.clone())
            .map_err(|_| IndexError::LockPoisoned)
    }

    /// Looks up a document by internal id in the latest snapshot.
    pub fn get(&self, id: InternalId) -> Result<Option<StoredDocument>, IndexError> {
        self.snapshot()?.get(id)
    }

    /// Looks up a document by key in the latest snapshot.
    pub fn get_by_key(&self, key: &str) -> Result<Option<StoredDocument>, IndexError> {
        self.snapshot()?.get_by_key(key)
    }

    /// Number of live documents in the latest snapshot.
    pub fn count(&self) -> Result<u64, IndexError> {
        Ok(self.snapshot()?.count())
    }

    /// Schema with field handles.
    pub fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    /// A copy of the analyzer used for the text fields.
    pub fn analyzer(&self) -> TextAnalyzer {
        self.analyzer.clone()
    }

    /// The store's time source.
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Index directory, or `None` for an in-memory index.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of segments in the latest snapshot.
    pub fn segment_count(&self) -> Result<usize, IndexError> {
        Ok(self.snapshot()?.searcher().segment_readers().len())
    }

    /// Builds the stored and analyzed representation of a record.
    fn build_document(&self, record: &DocumentRecord) -> TantivyDocument {
        let mut doc = TantivyDocument::new();
        doc.add_text(self.schema.key, &record.key);
        doc.add_text(self.schema.path, &record.key);
        doc.add_text(self.schema.name, &record.name);
        doc.add_text(self.schema.description, &record.description);
        doc.add_text(self.schema.data, &record.data);
        doc.add_text(self.schema.file_extension, &record.file_extension);
        doc.add_text(self.schema.data_source, &record.data_source);
        doc.add_i64(self.schema.modified_epoch_time, self.clock.now_epoch_secs());
        doc
    }

    /// Exact-match term on the raw key field.
    fn key_term(&self, key: &str) -> Term {
        Term::from_field_text(self.schema.key, key)
    }

    /// Acquires the writer.
    fn lock_writer(&self) -> Result<MutexGuard<'_, WriterState>, IndexError> {
        self.writer.lock().map_err(|_| IndexError::LockPoisoned)
    }

    /// Rolls the writer back and replays the journal into it.
    ///
    /// If either step fails the writer is emptied along with the journal, so
    /// a later commit can never publish a partial replay.
    fn restore(state: &mut WriterState, schema: &IndexSchema) -> Result<(), IndexError> {
        let WriterState { writer, journal } = &mut *state;
        let replayed = match writer.rollback() {
            Ok(_) => Self::replay(writer, journal, schema),
            Err(e) => Err(IndexError::commit(&e)),
        };
        match replayed {
            Ok(()) => {
                debug!(replayed = journal.len(), "replayed buffered operations");
                Ok(())
            }
            Err(err) => Err(Self::abandon(state, &err)),
        }
    }

    /// Re-buffers every journaled operation into a freshly rolled-back writer.
    fn replay(
        writer: &IndexWriter,
        journal: &[PendingOp],
        schema: &IndexSchema,
    ) -> Result<(), IndexError> {
        for op in journal {
            match op {
                PendingOp::Upsert { key, doc } => {
                    writer.delete_term(Term::from_field_text(schema.key, key));
                    writer
                        .add_document(doc.clone())
                        .map_err(|e| IndexError::write(&e))?;
                }
                PendingOp::Delete { key } => {
                    writer.delete_term(Term::from_field_text(schema.key, key));
                }
            }
        }
        Ok(())
    }

    /// Drops everything buffered after a restore failed.
    fn abandon(state: &mut WriterState, cause: &IndexError) -> IndexError {
        let dropped = state.journal.len();
        state.journal.clear();
        if let Err(e) = state.writer.rollback() {
            error!(error = %e, "writer rollback failed after an aborted restore");
        }
        error!(dropped, error = %cause, "buffered operations lost");
        IndexError::PendingLost {
            dropped,
            message: cause.to_string(),
        }
    }
}
