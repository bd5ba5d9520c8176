//! Configuration system for scavenger.
//!
//! scavenger uses TOML configuration files named `.scavenger.toml`. Configuration is resolved
//! by walking up the directory tree from the current working directory, collecting any
//! `.scavenger.toml` files found, then loading `~/.scavenger.toml` as the global config with
//! lowest precedence. Every field has a default, so an empty or missing config is valid.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod patterns;
mod resolve;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::path::{Path, PathBuf};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawConfig, RawHighlightSettings, RawIndexSettings, RawIngestSettings, RawSearchSettings,
    parse_config_file, parse_config_str,
};
pub use patterns::ExcludePatterns;
pub use resolve::{default_index_dir, resolve_path};
use serde::Serialize;
pub use templates::{global_template, local_template};
pub use validate::{ConfigWarning, KNOWN_FIELDS, KNOWN_STEMMERS};
use validate::validate_config;

/// Top-level merged configuration for scavenger.
///
/// This represents the fully resolved configuration after merging all discovered
/// `.scavenger.toml` files according to precedence rules.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Config {
    /// Index location and analysis settings.
    pub index: IndexSettings,
    /// Query defaults.
    pub search: SearchSettings,
    /// Highlight fragment settings.
    pub highlight: HighlightSettings,
    /// Ingestion settings.
    pub ingest: IngestSettings,
    /// Directory containing the most specific config file.
    #[serde(skip)]
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.scavenger.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Returns the index directory: the configured path, or `~/.scavenger/index`.
    pub fn index_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.index.path {
            Some(path) => Ok(path.clone()),
            None => default_index_dir(),
        }
    }

    /// Compiles the ingestion exclude globs.
    pub fn exclude_patterns(&self) -> Result<ExcludePatterns, ConfigError> {
        ExcludePatterns::compile(&self.ingest.exclude)
    }

    /// Validates the configuration and returns any warnings.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective settings to TOML format.
    ///
    /// The output uses the same layout as a `.scavenger.toml` file.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// `[index]` settings.
#[derive(Debug, Clone, Serialize)]
pub struct IndexSettings {
    /// Resolved index directory, if configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Stemming language, or "none" to disable stemming.
    pub stemmer: String,
    /// Writer memory budget in megabytes.
    pub writer_heap_mb: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            path: None,
            stemmer: String::from("none"),
            writer_heap_mb: 50,
        }
    }
}

/// `[search]` settings.
#[derive(Debug, Clone, Serialize)]
pub struct SearchSettings {
    /// Maximum results per query.
    pub limit: usize,
    /// Fields searched when a request names none.
    pub fields: Vec<String>,
    /// Treat query text literally unless asked otherwise.
    pub literal: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            limit: 20,
            fields: ["path", "name", "description", "data"]
                .into_iter()
                .map(String::from)
                .collect(),
            literal: false,
        }
    }
}

/// `[highlight]` settings.
#[derive(Debug, Clone, Serialize)]
pub struct HighlightSettings {
    /// Fragments per document; zero disables highlighting.
    pub fragments: usize,
    /// Maximum fragment length in characters.
    pub fragment_length: usize,
    /// Marker inserted before each matched term.
    pub pre_tag: String,
    /// Marker inserted after each matched term.
    pub post_tag: String,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            fragments: 3,
            fragment_length: 100,
            pre_tag: String::from("<b>"),
            post_tag: String::from("</b>"),
        }
    }
}

/// `[ingest]` settings.
#[derive(Debug, Clone, Serialize)]
pub struct IngestSettings {
    /// Extension whitelist, without dots.
    pub extensions: Vec<String>,
    /// Files larger than this many bytes are skipped.
    pub max_file_size: u64,
    /// Whether to descend into hidden files and directories.
    pub include_hidden: bool,
    /// Glob patterns, relative to the ingestion root, for paths to skip.
    pub exclude: Vec<String>,
    /// `dataSource` tag stamped on filesystem documents.
    pub data_source: String,
    /// Sources indexed within this many hours are not re-ingested.
    pub recency_window_hours: u64,
    /// Bounded retries for store errors during ingestion.
    pub max_store_retries: u32,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            extensions: ["c", "cpp", "py", "java", "kt", "rs"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_file_size: 1024 * 1024,
            include_hidden: false,
            exclude: Vec::new(),
            data_source: String::from("disk"),
            recency_window_hours: 24,
            max_store_retries: 3,
        }
    }
}
