//! Implementation of `scavenger delete`.

use std::process::ExitCode;

use crate::cli::{args::DeleteCommand, context::CommandContext, output::success};

/// Removes a document by key and commits.
pub fn run(ctx: &mut CommandContext, cmd: &DeleteCommand) -> ExitCode {
    let service = match ctx.service() {
        Ok(s) => s,
        Err(code) => return code,
    };
    if let Err(e) = service.delete(&cmd.key).and_then(|()| service.commit()) {
        eprintln!("error: delete failed: {e}");
        return ExitCode::FAILURE;
    }
    println!("{} {}", success("Deleted"), cmd.key);
    ExitCode::SUCCESS
}
