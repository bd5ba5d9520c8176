//! File discovery for ingestion.
//!
//! Walks an ingestion root and returns the files that should be indexed,
//! applying the extension whitelist, hidden-file policy, exclude globs and
//! size cutoff. Symlinks are never followed.

use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use scavenger_config::{ExcludePatterns, IngestSettings};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::IndexError;

/// A file selected for ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Absolute path to the file.
    pub abs_path: PathBuf,
    /// Path relative to the ingestion root.
    pub rel_path: PathBuf,
    /// Extension without the dot.
    pub extension: String,
    /// Size in bytes at discovery time.
    pub size: u64,
}

/// Discovers the files under `root` that pass the ingest filters.
///
/// A `root` that is itself a file is returned alone when its extension is
/// whitelisted and it fits the size cutoff. Results are sorted by path.
pub fn discover_files(
    root: &Path,
    settings: &IngestSettings,
    patterns: &ExcludePatterns,
) -> Result<Vec<DiscoveredFile>, IndexError> {
    let metadata = fs::metadata(root)?;
    if metadata.is_file() {
        let rel_path = root
            .file_name()
            .map_or_else(|| root.to_path_buf(), PathBuf::from);
        return Ok(accept(root, rel_path, metadata.len(), settings)
            .into_iter()
            .collect());
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| keep_entry(e, root, settings, patterns));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        // Symlinks report their own type since links are not followed.
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(rel_path) = entry.path().strip_prefix(root) else {
            continue;
        };
        let size = match entry.metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                debug!(path = %entry.path().display(), error = %e, "skipping file without metadata");
                continue;
            }
        };
        files.extend(accept(entry.path(), rel_path.to_path_buf(), size, settings));
    }

    Ok(files)
}

/// Whether the walker should yield (and descend into) `entry`.
fn keep_entry(
    entry: &DirEntry,
    root: &Path,
    settings: &IngestSettings,
    patterns: &ExcludePatterns,
) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    if !settings.include_hidden && is_hidden(entry.file_name()) {
        return false;
    }
    entry
        .path()
        .strip_prefix(root)
        .is_ok_and(|rel| !patterns.is_excluded(rel))
}

/// Applies the extension whitelist and size cutoff to one file.
fn accept(
    path: &Path,
    rel_path: PathBuf,
    size: u64,
    settings: &IngestSettings,
) -> Option<DiscoveredFile> {
    let extension = path.extension().and_then(OsStr::to_str)?;
    if !settings
        .extensions
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    {
        return None;
    }
    if size > settings.max_file_size {
        debug!(path = %path.display(), size, "skipping oversized file");
        return None;
    }
    Some(DiscoveredFile {
        abs_path: path.to_path_buf(),
        rel_path,
        extension: extension.to_string(),
        size,
    })
}

/// Checks if a filename represents a hidden file (starts with '.').
fn is_hidden(name: &OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}
