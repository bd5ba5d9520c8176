//! scavenger: personal document search.
//!
//! Indexes local source files and records submitted by sync jobs into a
//! tantivy index, and answers structured or literal queries with ranked,
//! highlighted results.

mod cli;

use std::{io, process::ExitCode};

use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use crate::cli::{
    CommandContext,
    args::{Commands, parse_cli},
    commands,
};

fn main() -> ExitCode {
    let cli = parse_cli();
    init_tracing(cli.verbose);

    let ctx = if matches!(cli.command, Commands::Init(_)) {
        CommandContext::load_cwd_only(cli.index, cli.verbose)
    } else {
        CommandContext::load(cli.index, cli.verbose)
    };
    let mut ctx = match ctx {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    commands::run(cli.command, &mut ctx)
}

/// Installs a stderr subscriber; `RUST_LOG` overrides the `-v` level.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
