//! Filesystem ingestion.
//!
//! The [`Indexer`] turns a file or directory into [`DocumentRecord`]s:
//! 1. Discover files passing the ingest filters
//! 2. Read each file and extract its `Title` and `Description` attributes
//! 3. Let the caller adjust the record
//! 4. Upsert it, retrying store failures a bounded number of times
//! 5. Commit once at the end

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use scavenger_config::{ExcludePatterns, IngestSettings};
use tracing::{info, warn};

use crate::{
    IndexError,
    attributes::extract_attribute,
    discovery::{DiscoveredFile, discover_files},
    record::DocumentRecord,
    snapshot::Version,
    store::IndexStore,
};

/// Statistics from an ingestion run.
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    /// Number of files that passed discovery.
    pub files_discovered: usize,
    /// Number of files upserted.
    pub files_indexed: usize,
    /// Number of files that could not be read or stored.
    pub files_failed: usize,
    /// Failures encountered (file path, error message).
    pub errors: Vec<(PathBuf, String)>,
    /// Version published by the final commit, if one was needed.
    pub version: Option<Version>,
}

impl IndexStats {
    /// Returns true if no errors occurred.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Callback for reporting ingestion progress.
pub trait ProgressReporter {
    /// Called when starting to process a file.
    fn on_file_start(&mut self, path: &Path, current: usize, total: usize);

    /// Called when a file was upserted.
    fn on_file_done(&mut self, path: &Path);

    /// Called when a file could not be indexed.
    fn on_file_error(&mut self, path: &Path, error: &str);

    /// Called when ingestion is complete.
    fn on_complete(&mut self, stats: &IndexStats);
}

/// A no-op progress reporter for silent ingestion.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn on_file_start(&mut self, _path: &Path, _current: usize, _total: usize) {}
    fn on_file_done(&mut self, _path: &Path) {}
    fn on_file_error(&mut self, _path: &Path, _error: &str) {}
    fn on_complete(&mut self, _stats: &IndexStats) {}
}

/// Ingests files from the local filesystem into a store.
pub struct Indexer {
    /// Destination store.
    store: Arc<IndexStore>,
    /// Filters, source tag and retry budget.
    settings: IngestSettings,
    /// Compiled exclude globs.
    patterns: ExcludePatterns,
}

impl Indexer {
    /// Creates an indexer writing to `store`.
    pub fn new(store: Arc<IndexStore>, settings: IngestSettings, patterns: ExcludePatterns) -> Self {
        Self {
            store,
            settings,
            patterns,
        }
    }

    /// The store this indexer writes to.
    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    /// Ingests `path`, a file or a directory, and commits once.
    pub fn index_path<R: ProgressReporter>(
        &self,
        path: &Path,
        reporter: &mut R,
    ) -> Result<IndexStats, IndexError> {
        self.index_path_with(path, reporter, |_| {})
    }

    /// Ingests `path`, passing every record through `adjust` before upsert.
    ///
    /// Per-file failures are recorded in the returned stats and never abort
    /// the run. A failing final commit is returned as an error; the buffered
    /// documents then stay pending in the store.
    pub fn index_path_with<R, F>(
        &self,
        path: &Path,
        reporter: &mut R,
        mut adjust: F,
    ) -> Result<IndexStats, IndexError>
    where
        R: ProgressReporter,
        F: FnMut(&mut DocumentRecord),
    {
        let root = fs::canonicalize(path)?;
        let files = discover_files(&root, &self.settings, &self.patterns)?;
        let mut stats = IndexStats {
            files_discovered: files.len(),
            ..Default::default()
        };

        let total = files.len();
        for (idx, file) in files.iter().enumerate() {
            reporter.on_file_start(&file.abs_path, idx + 1, total);
            let result = self.read_record(file).and_then(|mut record| {
                adjust(&mut record);
                self.with_retries("upsert", || self.store.upsert(&record))
            });
            match result {
                Ok(()) => {
                    stats.files_indexed += 1;
                    reporter.on_file_done(&file.abs_path);
                }
                Err(e) => {
                    let message = e.to_string();
                    warn!(path = %file.abs_path.display(), error = %message, "failed to index file");
                    stats.files_failed += 1;
                    stats.errors.push((file.abs_path.clone(), message.clone()));
                    reporter.on_file_error(&file.abs_path, &message);
                }
            }
        }

        if stats.files_indexed > 0 {
            stats.version = Some(self.with_retries("commit", || self.store.commit())?);
        }
        info!(
            root = %root.display(),
            indexed = stats.files_indexed,
            failed = stats.files_failed,
            "ingestion complete"
        );
        reporter.on_complete(&stats);
        Ok(stats)
    }

    /// Reads a discovered file into a record.
    ///
    /// The key is the absolute path. `name` and `description` come from the
    /// `Title` and `Description` attributes and default to the key.
    fn read_record(&self, file: &DiscoveredFile) -> Result<DocumentRecord, IndexError> {
        let data = fs::read_to_string(&file.abs_path)?;
        let key = file.abs_path.to_string_lossy().into_owned();
        let name = extract_attribute(&data, "Title").unwrap_or_else(|| key.clone());
        let description = extract_attribute(&data, "Description").unwrap_or_else(|| key.clone());
        Ok(DocumentRecord {
            key,
            name,
            description,
            data,
            file_extension: file.extension.clone(),
            data_source: self.settings.data_source.clone(),
        })
    }

    /// Runs `op`, retrying retryable failures up to the configured budget.
    fn with_retries<T>(
        &self,
        what: &str,
        mut op: impl FnMut() -> Result<T, IndexError>,
    ) -> Result<T, IndexError> {
        let mut attempt = 0;
        loop {
            match op() {
                Err(e) if e.is_retryable() && attempt < self.settings.max_store_retries => {
                    attempt += 1;
                    warn!(operation = what, attempt, error = %e, "retrying store operation");
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;

    use tempfile::TempDir;

    use super::*;
    use crate::{StoreOptions, engine::QueryEngine, schema::IndexField};

    /// Test reporter that records all events.
    #[derive(Default)]
    struct TestReporter {
        events: RefCell<Vec<String>>,
    }

    impl ProgressReporter for TestReporter {
        fn on_file_start(&mut self, _path: &Path, current: usize, total: usize) {
            self.events
                .borrow_mut()
                .push(format!("start ({current}/{total})"));
        }

        fn on_file_done(&mut self, path: &Path) {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            self.events.borrow_mut().push(format!("done: {name}"));
        }

        fn on_file_error(&mut self, path: &Path, _error: &str) {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            self.events.borrow_mut().push(format!("error: {name}"));
        }

        fn on_complete(&mut self, stats: &IndexStats) {
            self.events.borrow_mut().push(format!(
                "complete: {} indexed, {} failed",
                stats.files_indexed, stats.files_failed
            ));
        }
    }

    fn indexer(settings: IngestSettings) -> Indexer {
        let store = Arc::new(IndexStore::create_in_ram(&StoreOptions::default()).unwrap());
        Indexer::new(store, settings, ExcludePatterns::empty())
    }

    fn key_of(path: &Path) -> String {
        fs::canonicalize(path)
            .unwrap()
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn indexes_directory_with_one_commit() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.py"), "def dijkstra(): pass").unwrap();
        fs::write(temp.path().join("b.rs"), "fn heap() {}").unwrap();
        fs::write(temp.path().join("c.md"), "# not whitelisted").unwrap();

        let indexer = indexer(IngestSettings::default());
        let mut reporter = TestReporter::default();
        let stats = indexer.index_path(temp.path(), &mut reporter).unwrap();

        assert_eq!(stats.files_indexed, 2);
        assert!(stats.is_success());
        assert_eq!(indexer.store().count().unwrap(), 2);
        assert_eq!(indexer.store().pending().unwrap(), 0);
        assert_eq!(
            reporter.events.into_inner(),
            vec![
                "start (1/2)",
                "done: a.py",
                "start (2/2)",
                "done: b.rs",
                "complete: 2 indexed, 0 failed",
            ]
        );
    }

    #[test]
    fn record_fields_follow_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("graph.py");
        fs::write(
            &file,
            "# Title - Graph search;\n# Description - Shortest paths;\ndef dijkstra(): pass\n",
        )
        .unwrap();
        fs::write(temp.path().join("plain.py"), "pass").unwrap();

        let indexer = indexer(IngestSettings::default());
        indexer.index_path(temp.path(), &mut SilentReporter).unwrap();

        let doc = indexer.store().get_by_key(&key_of(&file)).unwrap().unwrap();
        assert_eq!(doc.record.name, "Graph search");
        assert_eq!(doc.record.description, "Shortest paths");
        assert_eq!(doc.record.file_extension, "py");
        assert_eq!(doc.record.data_source, "disk");
        assert!(doc.record.data.contains("dijkstra"));

        let plain_key = key_of(&temp.path().join("plain.py"));
        let plain = indexer.store().get_by_key(&plain_key).unwrap().unwrap();
        assert_eq!(plain.record.name, plain_key);
        assert_eq!(plain.record.description, plain_key);
    }

    #[test]
    fn non_utf8_files_are_recorded_not_fatal() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("bad.c"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
        fs::write(temp.path().join("good.c"), "int main() {}").unwrap();

        let indexer = indexer(IngestSettings::default());
        let mut reporter = TestReporter::default();
        let stats = indexer.index_path(temp.path(), &mut reporter).unwrap();

        assert_eq!(stats.files_indexed, 1);
        assert_eq!(stats.files_failed, 1);
        assert!(!stats.is_success());
        assert!(stats.errors[0].0.ends_with("bad.c"));
        assert!(reporter.events.borrow().contains(&"error: bad.c".to_string()));
    }

    #[test]
    fn adjuster_runs_before_upsert() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("lib.rs"), "pub fn graph() {}").unwrap();

        let indexer = indexer(IngestSettings::default());
        indexer
            .index_path_with(temp.path(), &mut SilentReporter, |record| {
                record.data_source = "github_repo".to_string();
                record.description = "widget toolkit".to_string();
            })
            .unwrap();

        let key = key_of(&temp.path().join("lib.rs"));
        let doc = indexer.store().get_by_key(&key).unwrap().unwrap();
        assert_eq!(doc.record.data_source, "github_repo");
        assert_eq!(doc.record.description, "widget toolkit");
    }

    #[test]
    fn reindexing_replaces_documents() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.py");
        fs::write(&file, "old contents").unwrap();

        let indexer = indexer(IngestSettings::default());
        indexer.index_path(temp.path(), &mut SilentReporter).unwrap();
        fs::write(&file, "new contents").unwrap();
        indexer.index_path(&file, &mut SilentReporter).unwrap();

        assert_eq!(indexer.store().count().unwrap(), 1);
        let engine = QueryEngine::new(indexer.store());
        let snapshot = indexer.store().snapshot().unwrap();
        let old = engine
            .search(&snapshot, "old", &[IndexField::Data], 10, false)
            .unwrap();
        assert_eq!(old.total_hits, 0);
    }

    #[test]
    fn empty_directory_needs_no_commit() {
        let temp = TempDir::new().unwrap();
        let indexer = indexer(IngestSettings::default());
        let stats = indexer.index_path(temp.path(), &mut SilentReporter).unwrap();
        assert_eq!(stats.files_discovered, 0);
        assert!(stats.version.is_none());
    }

    #[test]
    fn configured_source_tag_is_used() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Main.java"), "class Main {}").unwrap();

        let settings = IngestSettings {
            data_source: "laptop".to_string(),
            ..IngestSettings::default()
        };
        let indexer = indexer(settings);
        indexer.index_path(temp.path(), &mut SilentReporter).unwrap();

        let key = key_of(&temp.path().join("Main.java"));
        let doc = indexer.store().get_by_key(&key).unwrap().unwrap();
        assert_eq!(doc.record.data_source, "laptop");
        assert_eq!(doc.record.file_extension, "java");
    }
}
