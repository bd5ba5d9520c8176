//! Implementation of `scavenger index`.

use std::{path::Path, process::ExitCode};

use scavenger_index::{IndexStats, Indexer, ProgressReporter};

use crate::cli::{
    args::IndexCommand,
    context::CommandContext,
    output::{dim, success, warning},
};

/// Prints per-file progress to stderr.
struct ConsoleReporter {
    /// Print every file, not only failures.
    verbose: bool,
}

impl ProgressReporter for ConsoleReporter {
    fn on_file_start(&mut self, path: &Path, current: usize, total: usize) {
        if self.verbose {
            eprintln!("{} {}", dim(&format!("[{current}/{total}]")), path.display());
        }
    }

    fn on_file_done(&mut self, _path: &Path) {}

    fn on_file_error(&mut self, path: &Path, error: &str) {
        eprintln!("{} {}: {error}", warning("skipped"), path.display());
    }

    fn on_complete(&mut self, stats: &IndexStats) {
        eprintln!(
            "{} {} of {} files indexed, {} failed",
            success("done:"),
            stats.files_indexed,
            stats.files_discovered,
            stats.files_failed
        );
    }
}

/// Ingests a file or directory tree with one commit at the end.
pub fn run(ctx: &mut CommandContext, cmd: &IndexCommand) -> ExitCode {
    let patterns = match ctx.config.exclude_patterns() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut settings = ctx.config.ingest.clone();
    if let Some(source) = &cmd.source {
        settings.data_source.clone_from(source);
    }
    let store = match ctx.store() {
        Ok(s) => s,
        Err(code) => return code,
    };

    let path = ctx.cwd.join(&cmd.path);
    let indexer = Indexer::new(store, settings, patterns);
    match indexer.index_path(&path, &mut ConsoleReporter {
        verbose: ctx.verbose > 0,
    }) {
        Ok(stats) if stats.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: indexing failed: {e}");
            ExitCode::FAILURE
        }
    }
}
