//! Command implementations and dispatch.

pub mod config;
pub mod delete;
pub mod get;
pub mod index;
pub mod init;
pub mod recent;
pub mod search;
pub mod status;
pub mod submit;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &mut CommandContext) -> ExitCode {
    match command {
        Commands::Init(cmd) => init::run(ctx, &cmd),
        Commands::Index(cmd) => index::run(ctx, &cmd),
        Commands::Submit(cmd) => submit::run(ctx, &cmd),
        Commands::Delete(cmd) => delete::run(ctx, &cmd),
        Commands::Search(cmd) => search::run(ctx, &cmd),
        Commands::Get(cmd) => get::run(ctx, &cmd),
        Commands::Recent(cmd) => recent::run(ctx, &cmd),
        Commands::Status => status::run(ctx),
        Commands::Config => config::run(ctx),
    }
}
