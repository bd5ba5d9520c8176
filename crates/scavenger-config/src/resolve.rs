//! Path resolution for configured locations.
//!
//! Resolves relative and tilde-prefixed paths to absolute paths. Unlike
//! input paths, configured output locations such as the index directory may
//! not exist yet, so nothing here touches the filesystem.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::ConfigError;

/// Name of the per-user data directory under the home directory.
const DATA_DIR_NAME: &str = ".scavenger";

/// Resolves a configured path against the directory of the file that set it.
///
/// - Tilde paths (`~/idx`) expand to the home directory
/// - Relative paths (`./idx`, `../shared`) join onto `config_dir`
/// - Absolute paths are returned unchanged
pub fn resolve_path(path: &str, config_dir: &Path) -> Result<PathBuf, ConfigError> {
    let expanded = expand_tilde(path)?;
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(config_dir.join(expanded))
    }
}

/// Returns the default index directory, `~/.scavenger/index`.
pub fn default_index_dir() -> Result<PathBuf, ConfigError> {
    Ok(home_dir()?.join(DATA_DIR_NAME).join("index"))
}

/// Expands a leading `~` to the home directory.
fn expand_tilde(path: &str) -> Result<PathBuf, ConfigError> {
    if path == "~" {
        return home_dir();
    }

    if let Some(rest) = path.strip_prefix("~/") {
        return Ok(home_dir()?.join(rest));
    }

    Ok(PathBuf::from(path))
}

/// Returns the home directory.
fn home_dir() -> Result<PathBuf, ConfigError> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDirectory)
}
