//! Configuration file discovery.
//!
//! Discovers `.scavenger.toml` files by walking up the directory tree from a
//! starting point, then appending the global `~/.scavenger.toml` if present.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::parse::is_root_config;

/// The configuration filename.
pub const CONFIG_FILENAME: &str = ".scavenger.toml";

/// Discovers all configuration files relevant to the given directory.
///
/// Returns paths in precedence order: closest to `cwd` first, the global file
/// last. Walking stops early at a file with `root = true`, in which case the
/// global file is not consulted either.
pub fn discover_config_files(cwd: &Path) -> Vec<PathBuf> {
    let mut configs = Vec::new();
    let mut found_root = false;

    let mut current = Some(cwd);
    while let Some(dir) = current {
        let config_path = dir.join(CONFIG_FILENAME);
        if config_path.is_file() {
            let is_root = is_root_config(&config_path);
            configs.push(config_path);
            if is_root {
                found_root = true;
                break;
            }
        }
        current = dir.parent();
    }

    if !found_root
        && let Some(global_path) = global_config_path()
        && global_path.is_file()
        && !configs.contains(&global_path)
    {
        configs.push(global_path);
    }

    configs
}

/// Returns the path to the global configuration file (`~/.scavenger.toml`).
///
/// Returns `None` if the home directory cannot be determined.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILENAME))
}

/// Checks if a path is the global configuration file.
pub fn is_global_config(path: &Path) -> bool {
    global_config_path().is_some_and(|global| path == global)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestDir;

    /// Drops the global config from a discovery result so tests are not
    /// sensitive to the developer's home directory.
    fn local_only(configs: Vec<PathBuf>) -> Vec<PathBuf> {
        configs
            .into_iter()
            .filter(|c| !is_global_config(c))
            .collect()
    }

    #[test]
    fn finds_nothing_in_empty_tree() {
        let dir = TestDir::new();
        let deep = dir.create_dir("src/algorithms/graph");
        assert!(local_only(discover_config_files(&deep)).is_empty());
    }

    #[test]
    fn closest_config_comes_first() {
        let dir = TestDir::new();
        let outer = dir.create_config_at_root();
        let inner = dir.create_config("projects/scavenger");
        let cwd = dir.create_dir("projects/scavenger/src");

        let configs = local_only(discover_config_files(&cwd));
        assert_eq!(configs, vec![inner, outer]);
    }

    #[test]
    fn root_marker_stops_the_walk() {
        let dir = TestDir::new();
        dir.create_config_at_root();
        let marked = dir.create_root_config("work");
        let cwd = dir.create_dir("work/notes");

        assert_eq!(discover_config_files(&cwd), vec![marked]);
    }

    #[test]
    fn directory_named_like_config_is_ignored() {
        let dir = TestDir::new();
        dir.create_dir(CONFIG_FILENAME);
        assert!(local_only(discover_config_files(dir.path())).is_empty());
    }
}
