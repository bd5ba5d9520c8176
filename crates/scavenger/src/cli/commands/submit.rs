//! Implementation of `scavenger submit`.

use std::{
    fs,
    io::{self, Read},
    process::ExitCode,
};

use scavenger_index::{IndexRequest, UpsertStatus};

use crate::cli::{args::SubmitCommand, context::CommandContext};

/// Upserts one JSON request and prints its status code.
///
/// The exit status is non-zero unless the upsert (and commit) succeeded.
pub fn run(ctx: &mut CommandContext, cmd: &SubmitCommand) -> ExitCode {
    let input = match &cmd.file {
        Some(path) => fs::read_to_string(path),
        None => read_stdin(),
    };
    let input = match input {
        Ok(input) => input,
        Err(e) => {
            eprintln!("error: failed to read request: {e}");
            return ExitCode::FAILURE;
        }
    };
    let request: IndexRequest = match serde_json::from_str(&input) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("error: invalid request JSON: {e}");
            return ExitCode::FAILURE;
        }
    };

    let service = match ctx.service() {
        Ok(s) => s,
        Err(code) => return code,
    };

    let mut status = service.submit(request);
    if status == UpsertStatus::Success
        && !cmd.no_commit
        && let Err(e) = service.commit()
    {
        eprintln!("error: commit failed: {e}");
        status = UpsertStatus::from_result(&Err::<(), _>(e));
    }

    println!("{}", status.code());
    if status == UpsertStatus::Success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Reads all of stdin.
fn read_stdin() -> io::Result<String> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    Ok(input)
}
