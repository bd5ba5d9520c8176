//! Configuration file parsing.
//!
//! Parses individual `.scavenger.toml` files into intermediate `RawConfig`
//! structures that preserve the optional nature of all fields before merging.

use std::{fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};
#[cfg(test)]
use toml::de::Error as TomlError;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional to support partial configs that will be merged.
/// This mirrors the TOML schema exactly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    /// When true, stop discovery here - ignore parent and global configs.
    pub root: Option<bool>,
    /// Index location and analysis settings.
    pub index: Option<RawIndexSettings>,
    /// Query defaults.
    pub search: Option<RawSearchSettings>,
    /// Highlight fragment settings.
    pub highlight: Option<RawHighlightSettings>,
    /// Filesystem and remote ingestion settings.
    pub ingest: Option<RawIngestSettings>,
}

/// Raw `[index]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawIndexSettings {
    /// Index directory; relative paths are resolved against the config file.
    pub path: Option<String>,
    /// Stemming language, or "none".
    pub stemmer: Option<String>,
    /// Writer memory budget in megabytes.
    pub writer_heap_mb: Option<usize>,
}

/// Raw `[search]` section.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawSearchSettings {
    /// Maximum results per query.
    pub limit: Option<usize>,
    /// Default fields; a single string or a list.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub fields: Option<Vec<String>>,
    /// Treat query text literally by default.
    pub literal: Option<bool>,
}

/// Raw `[highlight]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawHighlightSettings {
    /// Fragments per document.
    pub fragments: Option<usize>,
    /// Maximum fragment length in characters.
    pub fragment_length: Option<usize>,
    /// Marker inserted before each matched term.
    pub pre_tag: Option<String>,
    /// Marker inserted after each matched term.
    pub post_tag: Option<String>,
}

/// Raw `[ingest]` section.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawIngestSettings {
    /// Extension whitelist, without dots.
    pub extensions: Option<Vec<String>>,
    /// Files larger than this many bytes are skipped.
    pub max_file_size: Option<u64>,
    /// Whether to descend into hidden files and directories.
    pub include_hidden: Option<bool>,
    /// Glob patterns for paths to skip; a single string or a list.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub exclude: Option<Vec<String>>,
    /// `dataSource` tag for filesystem ingestion.
    pub data_source: Option<String>,
    /// Recency window for skipping re-ingestion.
    pub recency_window_hours: Option<u64>,
    /// Bounded retries for store errors during ingestion.
    pub max_store_retries: Option<u32>,
}

/// Parses a configuration file from disk.
///
/// Returns a `RawConfig` with all fields as optionals, ready for merging.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses configuration from a TOML string without path context.
#[cfg(test)]
pub fn parse_config(contents: &str) -> Result<RawConfig, TomlError> {
    toml::from_str(contents)
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}
