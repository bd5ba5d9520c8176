//! Implementation of `scavenger recent`.

use std::process::ExitCode;

use crate::cli::{
    args::RecentCommand,
    context::{CommandContext, hours},
};

/// Prints `true` when the key was indexed within the window, else `false`.
pub fn run(ctx: &mut CommandContext, cmd: &RecentCommand) -> ExitCode {
    let window = cmd.hours.map_or_else(|| ctx.recency_window(), hours);
    let service = match ctx.service() {
        Ok(s) => s,
        Err(code) => return code,
    };
    match service.is_recently_indexed(&cmd.key, window) {
        Ok(recent) => {
            println!("{recent}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
