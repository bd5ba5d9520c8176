//! Synchronization of remote accounts.
//!
//! A [`RemoteSource`] lists items (repositories, snippets) and materializes
//! one of them into a local directory. [`RemoteSync`] fetches every item that
//! is not recently indexed, ingests it and removes the local copy again.
//! Listing and fetching, including any network or version-control work, live
//! behind the trait.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    IndexError,
    indexer::{Indexer, SilentReporter},
    recency::RecencyGate,
};

/// Failure reported by a [`RemoteSource`].
#[derive(Debug, Error)]
#[error("{source_name}: {message}")]
pub struct RemoteError {
    /// Name of the failing source.
    pub source_name: String,
    /// What went wrong.
    pub message: String,
}

impl RemoteError {
    /// Creates an error for `source_name`.
    pub fn new(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

/// One fetchable unit of a remote account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    /// Item category, such as `repo` or `gist`.
    pub kind: String,
    /// Identifier unique within the kind.
    pub id: String,
    /// Description that replaces per-file descriptions when non-empty.
    pub description: Option<String>,
}

/// A remote account that can list and materialize items.
pub trait RemoteSource {
    /// Short source name, used in local paths and `dataSource` tags.
    fn name(&self) -> &str;

    /// Lists the items currently available.
    fn items(&self) -> Result<Vec<RemoteItem>, RemoteError>;

    /// Writes the files of `item` into the empty directory `dest`.
    fn fetch(&self, item: &RemoteItem, dest: &Path) -> Result<(), RemoteError>;
}

/// Outcome of one synchronization run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Items fetched and ingested.
    pub synced: usize,
    /// Items skipped because they were indexed recently.
    pub skipped: usize,
    /// Items whose fetch or ingestion failed.
    pub failed: usize,
    /// Files upserted across all synced items.
    pub files_indexed: usize,
}

/// Drives a [`RemoteSource`] through the local indexer.
pub struct RemoteSync {
    /// Ingests fetched items.
    indexer: Indexer,
    /// Skips recently indexed items.
    gate: RecencyGate,
    /// Recency window.
    window: Duration,
}

impl RemoteSync {
    /// Creates a sync that skips items indexed within `window`.
    pub fn new(indexer: Indexer, window: Duration) -> Self {
        let gate = RecencyGate::new(indexer.store().clone());
        Self {
            indexer,
            gate,
            window,
        }
    }

    /// Synchronizes every item of `source`, staging fetches under `workspace_root`.
    ///
    /// Each item lives at `<root>/<source>/<kind>/<id>` while it is ingested
    /// and is tagged with `dataSource = "<source>_<kind>"`. Failures of single
    /// items are counted and logged; only a failure to list items is returned.
    pub fn run(
        &self,
        source: &dyn RemoteSource,
        workspace_root: &Path,
    ) -> Result<SyncStats, IndexError> {
        fs::create_dir_all(workspace_root)?;
        let root = fs::canonicalize(workspace_root)?;
        let items = source.items()?;
        let mut stats = SyncStats::default();

        for item in &items {
            let local = item_path(&root, source.name(), item);
            if self.is_recent(&local) {
                debug!(source = source.name(), kind = %item.kind, id = %item.id, "skipping recently indexed item");
                stats.skipped += 1;
                continue;
            }
            match self.sync_item(source, item, &local) {
                Ok(files) => {
                    stats.synced += 1;
                    stats.files_indexed += files;
                }
                Err(e) => {
                    warn!(source = source.name(), kind = %item.kind, id = %item.id, error = %e, "failed to sync item");
                    stats.failed += 1;
                }
            }
            if let Err(e) = remove_dir(&local) {
                warn!(path = %local.display(), error = %e, "failed to remove staged item");
            }
        }

        info!(
            source = source.name(),
            synced = stats.synced,
            skipped = stats.skipped,
            failed = stats.failed,
            "remote sync complete"
        );
        Ok(stats)
    }

    /// Whether the gate reports `local` as recently indexed; errors count as "no".
    fn is_recent(&self, local: &Path) -> bool {
        let key = local.to_string_lossy();
        self.gate
            .is_recently_indexed(&key, self.window)
            .unwrap_or_else(|e| {
                warn!(path = %key, error = %e, "recency check failed");
                false
            })
    }

    /// Fetches and ingests one item, returning the number of files indexed.
    fn sync_item(
        &self,
        source: &dyn RemoteSource,
        item: &RemoteItem,
        local: &Path,
    ) -> Result<usize, IndexError> {
        remove_dir(local)?;
        fs::create_dir_all(local)?;
        source.fetch(item, local)?;

        let data_source = format!("{}_{}", source.name(), item.kind);
        let description = item.description.as_deref().filter(|d| !d.is_empty());
        let stats = self
            .indexer
            .index_path_with(local, &mut SilentReporter, |record| {
                record.data_source.clone_from(&data_source);
                if let Some(description) = description {
                    record.description = description.to_string();
                }
            })?;
        Ok(stats.files_indexed)
    }
}

/// Staging directory for `item`.
fn item_path(root: &Path, source: &str, item: &RemoteItem) -> PathBuf {
    root.join(source).join(&item.kind).join(&item.id)
}

/// Removes a directory tree, treating a missing directory as success.
fn remove_dir(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
