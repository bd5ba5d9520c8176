//! Analyzer fingerprints for index compatibility checks.
//!
//! Terms in the index are only reachable by queries analyzed the same way.
//! The store writes a fingerprint of the analyzer settings beside the index
//! and refuses to open a non-empty index whose fingerprint differs.
//!
//! Settings that affect the fingerprint:
//! - Schema version (internal, bumped when field definitions change)
//! - Stemmer language
//! - Stop word list

use std::{
    fs,
    hash::{Hash, Hasher},
    io,
    path::{Path, PathBuf},
};

use siphasher::sip::SipHasher24;

use crate::analyzer::STOP_WORDS;

/// Current schema version. Bump this when index field definitions change.
pub const SCHEMA_VERSION: u32 = 1;

/// File name of the stored fingerprint inside the index directory.
const FINGERPRINT_FILE: &str = "analyzer_fingerprint";

/// Settings that decide which terms the analyzer produces.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct AnalyzerFingerprint {
    /// Schema version - changes when index structure changes.
    pub schema_version: u32,
    /// Normalized stemmer setting.
    pub stemmer: String,
    /// Stop words removed at analysis time.
    pub stop_words: Vec<&'static str>,
}

impl AnalyzerFingerprint {
    /// Fingerprint for the given stemmer setting.
    pub fn new(stemmer: &str) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            stemmer: stemmer.to_lowercase(),
            stop_words: STOP_WORDS.to_vec(),
        }
    }

    /// Computes a hash of the analyzer settings.
    pub fn compute_hash(&self) -> u64 {
        let mut hasher = SipHasher24::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Computes a hash and returns it as a hex string.
    pub fn hash_string(&self) -> String {
        format!("{:016x}", self.compute_hash())
    }
}

/// Returns the path of the fingerprint file for an index.
pub fn fingerprint_path(index_dir: &Path) -> PathBuf {
    index_dir.join(FINGERPRINT_FILE)
}

/// Reads the stored fingerprint from an index directory.
///
/// Returns `None` if the file doesn't exist or can't be read.
pub fn read_stored_fingerprint(index_dir: &Path) -> Option<String> {
    fs::read_to_string(fingerprint_path(index_dir))
        .ok()
        .map(|s| s.trim().to_string())
}

/// Writes a fingerprint into an index directory.
pub fn write_fingerprint(index_dir: &Path, fingerprint: &str) -> io::Result<()> {
    fs::create_dir_all(index_dir)?;
    fs::write(fingerprint_path(index_dir), fingerprint)
}
