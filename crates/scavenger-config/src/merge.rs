//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`,
//! applying precedence rules and resolving paths.

use std::path::{Path, PathBuf};

use crate::{
    Config, ConfigError, HighlightSettings, IndexSettings, IngestSettings, SearchSettings,
    parse::{
        RawConfig, RawHighlightSettings, RawIndexSettings, RawIngestSettings, RawSearchSettings,
    },
    resolve::resolve_path,
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

impl ParsedConfig {
    /// Directory containing the config file.
    fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to CWD),
/// lowest precedence last (global config). Every field, lists included, takes the value from
/// the highest-precedence file that sets it.
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    // Lowest precedence first so closer files overwrite.
    for parsed in configs.iter().rev() {
        let raw = &parsed.config;
        if let Some(index) = &raw.index {
            apply_index(&mut config.index, index, parsed.dir())?;
        }
        if let Some(search) = &raw.search {
            apply_search(&mut config.search, search);
        }
        if let Some(highlight) = &raw.highlight {
            apply_highlight(&mut config.highlight, highlight);
        }
        if let Some(ingest) = &raw.ingest {
            apply_ingest(&mut config.ingest, ingest);
        }
    }

    config.config_root = configs.first().map(|c| c.dir().to_path_buf());
    Ok(config)
}

/// Applies a raw `[index]` section; the path resolves against `config_dir`.
fn apply_index(
    result: &mut IndexSettings,
    raw: &RawIndexSettings,
    config_dir: &Path,
) -> Result<(), ConfigError> {
    if let Some(path) = &raw.path {
        result.path = Some(resolve_path(path, config_dir)?);
    }
    if let Some(v) = &raw.stemmer {
        result.stemmer.clone_from(v);
    }
    if let Some(v) = raw.writer_heap_mb {
        result.writer_heap_mb = v;
    }
    Ok(())
}

/// Applies a raw `[search]` section.
fn apply_search(result: &mut SearchSettings, raw: &RawSearchSettings) {
    if let Some(v) = raw.limit {
        result.limit = v;
    }
    if let Some(v) = &raw.fields {
        result.fields.clone_from(v);
    }
    if let Some(v) = raw.literal {
        result.literal = v;
    }
}

/// Applies a raw `[highlight]` section.
fn apply_highlight(result: &mut HighlightSettings, raw: &RawHighlightSettings) {
    if let Some(v) = raw.fragments {
        result.fragments = v;
    }
    if let Some(v) = raw.fragment_length {
        result.fragment_length = v;
    }
    if let Some(v) = &raw.pre_tag {
        result.pre_tag.clone_from(v);
    }
    if let Some(v) = &raw.post_tag {
        result.post_tag.clone_from(v);
    }
}

/// Applies a raw `[ingest]` section.
fn apply_ingest(result: &mut IngestSettings, raw: &RawIngestSettings) {
    if let Some(v) = &raw.extensions {
        result.extensions = v
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .collect();
    }
    if let Some(v) = raw.max_file_size {
        result.max_file_size = v;
    }
    if let Some(v) = raw.include_hidden {
        result.include_hidden = v;
    }
    if let Some(v) = &raw.exclude {
        result.exclude.clone_from(v);
    }
    if let Some(v) = &raw.data_source {
        result.data_source.clone_from(v);
    }
    if let Some(v) = raw.recency_window_hours {
        result.recency_window_hours = v;
    }
    if let Some(v) = raw.max_store_retries {
        result.max_store_retries = v;
    }
}
