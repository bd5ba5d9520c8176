//! Exclude pattern compilation and matching.
//!
//! Compiles the `[ingest] exclude` globs into a single matcher used while
//! walking an ingestion root.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::ConfigError;

/// Compiled exclude globs.
#[derive(Debug, Clone)]
pub struct ExcludePatterns {
    /// All patterns combined into one set.
    set: GlobSet,
}

impl ExcludePatterns {
    /// Compiles a list of glob patterns.
    pub fn compile(patterns: &[String]) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(compile_glob(pattern)?);
        }
        let set = builder.build().map_err(|e| ConfigError::InvalidPattern {
            pattern: String::from("<combined exclude patterns>"),
            source: e,
        })?;
        Ok(Self { set })
    }

    /// Returns a matcher that excludes nothing.
    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
        }
    }

    /// Checks whether a path, relative to the ingestion root, is excluded.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        self.set.is_match(relative)
    }

    /// Number of compiled patterns.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// True when no patterns were configured.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

/// Compiles a single glob pattern.
pub(crate) fn compile_glob(pattern: &str) -> Result<Glob, ConfigError> {
    Glob::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source: e,
    })
}
