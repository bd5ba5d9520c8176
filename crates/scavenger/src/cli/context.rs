//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
    time::Duration,
};

use scavenger_config::Config;
use scavenger_index::{IndexStore, SearchService, StoreOptions};
use tracing::debug;

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (default when no config files exist).
    pub config: Config,
    /// Count of `-v` flags.
    pub verbose: u8,
    /// Index directory given on the command line.
    index_override: Option<PathBuf>,
    /// Store opened for this invocation.
    store: Option<Arc<IndexStore>>,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    pub fn load(index_override: Option<PathBuf>, verbose: u8) -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = load_config_or_failure(&cwd)?;
        Ok(Self {
            cwd,
            config,
            verbose,
            index_override,
            store: None,
        })
    }

    /// Loads only the current directory, skipping configuration parsing.
    ///
    /// Used by `init`, which must work even when an existing config is invalid.
    pub fn load_cwd_only(index_override: Option<PathBuf>, verbose: u8) -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        Ok(Self {
            cwd,
            config: Config::default(),
            verbose,
            index_override,
            store: None,
        })
    }

    /// Resolves the index directory: `--index`, then config, then the default.
    pub fn index_dir(&self) -> Result<PathBuf, ExitCode> {
        if let Some(dir) = &self.index_override {
            return Ok(self.cwd.join(dir));
        }
        self.config.index_dir().map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        })
    }

    /// Returns the store, opening (and creating) the index on first use.
    pub fn store(&mut self) -> Result<Arc<IndexStore>, ExitCode> {
        if let Some(store) = &self.store {
            return Ok(Arc::clone(store));
        }
        let dir = self.index_dir()?;
        let options = StoreOptions::from_settings(&self.config.index);
        debug!(path = %dir.display(), stemmer = %options.stemmer, "opening index");
        let store = IndexStore::open(&dir, &options).map(Arc::new).map_err(|e| {
            eprintln!("error: failed to open index: {e}");
            ExitCode::FAILURE
        })?;
        self.store = Some(Arc::clone(&store));
        Ok(store)
    }

    /// Returns a search service over the store, using the configured markers.
    pub fn service(&mut self) -> Result<SearchService, ExitCode> {
        let store = self.store()?;
        let highlight = &self.config.highlight;
        Ok(SearchService::new(store).with_tags(&highlight.pre_tag, &highlight.post_tag))
    }

    /// The configured recency window.
    pub fn recency_window(&self) -> Duration {
        hours(self.config.ingest.recency_window_hours)
    }
}

/// Converts whole hours to a duration.
pub fn hours(h: u64) -> Duration {
    Duration::from_secs(h.saturating_mul(3600))
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Loads configuration from the provided directory or exits with an error.
fn load_config_or_failure(cwd: &Path) -> Result<Config, ExitCode> {
    Config::load(cwd).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
