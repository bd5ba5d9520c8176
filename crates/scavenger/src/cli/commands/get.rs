//! Implementation of `scavenger get`.

use std::process::ExitCode;

use scavenger_index::{IndexError, SearchService, StoredDocument};

use crate::cli::{
    args::GetCommand,
    context::CommandContext,
    output::{print_document, print_json},
};

/// Retrieves a document by internal id, falling back to a key lookup.
pub fn run(ctx: &mut CommandContext, cmd: &GetCommand) -> ExitCode {
    let service = match ctx.service() {
        Ok(s) => s,
        Err(code) => return code,
    };

    let doc = match lookup(&service, &cmd.id) {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            eprintln!("error: not found: {}", cmd.id);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("error: failed to retrieve document: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cmd.json {
        return print_json(&doc);
    }
    print_document(&doc);
    ExitCode::SUCCESS
}

/// Resolves `id` as `<segment>.<doc>` when it parses as one, else as a key.
fn lookup(service: &SearchService, id: &str) -> Result<Option<StoredDocument>, IndexError> {
    match service.get(id) {
        Err(IndexError::InvalidId(_)) => service.get_by_key(id),
        other => other,
    }
}
