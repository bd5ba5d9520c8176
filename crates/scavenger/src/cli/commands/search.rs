//! Implementation of `scavenger search`.

use std::process::ExitCode;

use scavenger_index::SearchRequest;

use crate::cli::{
    args::SearchCommand,
    context::CommandContext,
    output::{Markers, print_json, print_search_response},
};

/// Searches the index and prints ranked documents with highlights.
pub fn run(ctx: &mut CommandContext, cmd: &SearchCommand) -> ExitCode {
    let request = build_request(ctx, cmd);
    let service = match ctx.service() {
        Ok(s) => s,
        Err(code) => return code,
    };

    let response = match service.search(&request) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: search failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cmd.json {
        return print_json(&response);
    }
    let highlight = &ctx.config.highlight;
    print_search_response(
        &response,
        &Markers {
            pre: &highlight.pre_tag,
            post: &highlight.post_tag,
        },
    );
    ExitCode::SUCCESS
}

/// Applies command-line overrides to the configured search defaults.
fn build_request(ctx: &CommandContext, cmd: &SearchCommand) -> SearchRequest {
    let search = &ctx.config.search;
    let highlight = &ctx.config.highlight;
    SearchRequest {
        query: cmd.query.clone(),
        fields: if cmd.fields.is_empty() {
            search.fields.clone()
        } else {
            cmd.fields.clone()
        },
        limit: cmd.limit.unwrap_or(search.limit),
        escape_literal: cmd.literal || search.literal,
        fragments: cmd.fragments.unwrap_or(highlight.fragments),
        fragment_length: cmd.fragment_length.unwrap_or(highlight.fragment_length),
        include_data: cmd.data,
    }
}
