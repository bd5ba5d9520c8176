//! Skipping of sources that were indexed recently.

use std::{sync::Arc, time::Duration};

use tracing::debug;

use crate::{
    IndexError, engine::QueryEngine, record::StoredDocument, schema::IndexField,
    snapshot::Snapshot, store::IndexStore,
};

/// Window used when none is configured.
pub const DEFAULT_RECENCY_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Path hits examined when looking for a key under a directory prefix.
const PREFIX_CANDIDATES: usize = 10;

/// Answers whether a key was indexed within a time window.
///
/// Only committed documents count: an upsert that never reached a commit
/// leaves the gate closed, so the source is simply indexed again.
pub struct RecencyGate {
    /// Store queried for the latest snapshot and the current time.
    store: Arc<IndexStore>,
    /// Engine compiling the literal path query.
    engine: QueryEngine,
}

impl RecencyGate {
    /// Creates a gate over `store`.
    pub fn new(store: Arc<IndexStore>) -> Self {
        let engine = QueryEngine::new(&store);
        Self { store, engine }
    }

    /// Whether `key`, or the best literal match under it in the `path`
    /// field, was modified no longer than `window` ago.
    ///
    /// `key` may be a full key or a directory prefix of one. The analyzed
    /// path drops separators and stop words, so a path hit only counts when
    /// its key is `key` itself or lies beneath `key/`.
    pub fn is_recently_indexed(&self, key: &str, window: Duration) -> Result<bool, IndexError> {
        let snapshot = self.store.snapshot()?;
        let document = match snapshot.get_by_key(key)? {
            Some(document) => document,
            None => match self.contained_match(&snapshot, key)? {
                Some(document) => document,
                None => {
                    debug!(key, "recency: no match");
                    return Ok(false);
                }
            },
        };

        let now = self.store.clock().now_epoch_secs();
        let age = now.saturating_sub(document.modified_epoch_time);
        let window_secs = i64::try_from(window.as_secs()).unwrap_or(i64::MAX);
        let recent = age <= window_secs;
        debug!(
            key,
            matched = %document.record.key,
            age_secs = age,
            recent,
            "recency"
        );
        Ok(recent)
    }

    /// Best literal path match whose key lies beneath `prefix`.
    fn contained_match(
        &self,
        snapshot: &Snapshot,
        prefix: &str,
    ) -> Result<Option<StoredDocument>, IndexError> {
        let results = self.engine.search(
            snapshot,
            prefix,
            &[IndexField::Path],
            PREFIX_CANDIDATES,
            true,
        )?;
        for hit in &results.hits {
            let Some(document) = snapshot.get(hit.id)? else {
                continue;
            };
            if is_contained(&document.record.key, prefix) {
                return Ok(Some(document));
            }
            debug!(prefix, rejected = %document.record.key, "recency: path hit outside prefix");
        }
        Ok(None)
    }
}

/// Whether `key` names a document under the directory `prefix`.
fn is_contained(key: &str, prefix: &str) -> bool {
    let dir = prefix.trim_end_matches('/');
    key.strip_prefix(dir)
        .is_some_and(|rest| rest.starts_with('/') && rest.len() > 1)
}
