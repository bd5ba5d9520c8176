//! Clap argument definitions for the `scavenger` CLI.

use std::{env, path::PathBuf, process::exit};

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand, error::ErrorKind};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "scavenger")]
#[command(about = "Personal document search over local files and synced accounts")]
pub struct Cli {
    /// Index directory, overriding the configured one
    #[arg(long, global = true, value_name = "DIR")]
    pub index: Option<PathBuf>,

    /// Log verbosity (-v for info, -vv for debug); RUST_LOG takes precedence
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for `scavenger init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global ~/.scavenger.toml instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `scavenger index`.
#[derive(Args, Debug, Clone)]
pub struct IndexCommand {
    /// File or directory to ingest
    pub path: PathBuf,

    /// dataSource tag for ingested documents [default: from config]
    #[arg(long)]
    pub source: Option<String>,
}

/// Arguments for `scavenger submit`.
#[derive(Args, Debug, Clone)]
pub struct SubmitCommand {
    /// JSON request file; reads stdin when omitted
    pub file: Option<PathBuf>,

    /// Leave the upsert buffered instead of committing
    #[arg(long)]
    pub no_commit: bool,
}

/// Arguments for `scavenger delete`.
#[derive(Args, Debug, Clone)]
pub struct DeleteCommand {
    /// Key of the document to remove
    pub key: String,
}

/// Arguments for `scavenger search`.
#[derive(Args, Debug, Clone)]
pub struct SearchCommand {
    /// Query text
    pub query: String,

    /// Maximum results [default: 20]
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Field to search (repeatable) [default: path, name, description, data]
    #[arg(short = 'f', long = "field")]
    pub fields: Vec<String>,

    /// Match the query text literally instead of parsing it
    #[arg(long)]
    pub literal: bool,

    /// Highlighted fragments per document [default: 3]
    #[arg(long)]
    pub fragments: Option<usize>,

    /// Maximum fragment length in characters [default: 100]
    #[arg(long)]
    pub fragment_length: Option<usize>,

    /// Include the full document text
    #[arg(long)]
    pub data: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `scavenger get`.
#[derive(Args, Debug, Clone)]
pub struct GetCommand {
    /// Internal id (`<segment>.<doc>`) or document key
    pub id: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `scavenger recent`.
#[derive(Args, Debug, Clone)]
pub struct RecentCommand {
    /// Document key or directory prefix
    pub key: String,

    /// Recency window in hours [default: 24]
    #[arg(long)]
    pub hours: Option<u64>,
}

/// Supported `scavenger` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize scavenger configuration in the current directory
    Init(InitCommand),

    /// Ingest a file or directory tree
    Index(IndexCommand),

    /// Upsert one JSON document request
    #[command(after_help = "\
REQUEST FORMAT:
  {\"key\": \"/a.py\", \"name\": \"\", \"description\": \"\",
   \"data\": \"def dijkstra(): pass\", \"fileExtension\": \"py\",
   \"dataSource\": \"disk\"}

  Prints the status code: 0 success, 1 store failure, 2 validation failure.")]
    Submit(SubmitCommand),

    /// Remove a document by key
    Delete(DeleteCommand),

    /// Search the index
    #[command(after_help = "\
QUERY SYNTAX:
  term              Term may appear (clauses are OR-combined)
  +term             Term must appear
  -term / NOT term  Term must NOT appear
  a AND b           Both terms
  \"phrase\"          Exact phrase match
  term~ / term~1    Fuzzy match (edit distance, default 2)
  te*m / te?m       Wildcards
  term^2            Boost
  (expr)            Grouping

FIELD QUERIES:
  path:  name:  description:  data:
  key:  fileExtension:  dataSource:

EXAMPLES:
  scavenger search dijkstra
  scavenger search 'data:heap -fileExtension:java'
  scavenger search --literal 'foo*'")]
    Search(SearchCommand),

    /// Retrieve a document by id or key
    Get(GetCommand),

    /// Report whether a key was indexed recently
    Recent(RecentCommand),

    /// Show index statistics
    Status,

    /// Show effective configuration settings
    Config,
}

/// Parses CLI arguments, printing a compact command list for top-level `--help`.
pub fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if e.kind() == ErrorKind::DisplayHelp && env::args().len() <= 2 {
                print_command_help();
                exit(0);
            }
            e.exit();
        }
    }
}

/// Prints the command list with one line per subcommand.
fn print_command_help() {
    let cmd = Cli::command();
    let about = cmd.get_about().map(|s| s.to_string()).unwrap_or_default();

    println!("{about}");
    println!();
    println!("Usage: scavenger [OPTIONS] <COMMAND>");
    println!();
    println!("Commands:");
    for sub in cmd.get_subcommands() {
        let name = sub.get_name();
        if name == "help" {
            continue;
        }
        let about = sub.get_about().map(|s| s.to_string()).unwrap_or_default();
        println!("  {name:10} {about}");
    }
    println!(
        "  {:<10} Print this message or the help of the given subcommand(s)",
        "help"
    );
    println!();
    println!("Options:");
    println!("      --index <DIR>  Index directory, overriding the configured one");
    println!("  -v, --verbose...   Log verbosity");
    println!("  -h, --help         Print help");
}

#[cfg(test)]
mod tests {
    use clap::Command;
    use scavenger_config::{HighlightSettings, SearchSettings};

    use super::*;

    /// Gets help text for a subcommand's argument.
    fn get_arg_help(cmd: &Command, subcmd: &str, arg: &str) -> String {
        cmd.get_subcommands()
            .find(|c| c.get_name() == subcmd)
            .and_then(|c| c.get_arguments().find(|a| a.get_id() == arg))
            .and_then(|a| a.get_help().map(|h| h.to_string()))
            .unwrap_or_default()
    }

    /// Catches drift between config defaults and the help strings.
    #[test]
    fn help_defaults_match_config() {
        let cmd = Cli::command();
        let search = SearchSettings::default();
        let highlight = HighlightSettings::default();

        for (arg, value) in [
            ("limit", search.limit),
            ("fragments", highlight.fragments),
            ("fragment_length", highlight.fragment_length),
        ] {
            let help = get_arg_help(&cmd, "search", arg);
            assert!(
                help.contains(&format!("[default: {value}]")),
                "search --{arg} help should mention {value}: {help}"
            );
        }
        let fields = get_arg_help(&cmd, "search", "fields");
        assert!(fields.contains(&search.fields.join(", ")), "{fields}");
    }

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["scavenger", "status", "--index", "/tmp/idx", "-vv"]).unwrap();
        assert_eq!(cli.index, Some(PathBuf::from("/tmp/idx")));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn search_fields_repeat() {
        let cli = Cli::try_parse_from([
            "scavenger", "search", "heap", "--field", "data", "-f", "name", "--literal",
        ])
        .unwrap();
        let Commands::Search(cmd) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(cmd.fields, vec!["data", "name"]);
        assert!(cmd.literal);
        assert_eq!(cmd.limit, None);
    }
}
