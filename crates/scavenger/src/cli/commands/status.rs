//! Implementation of `scavenger status`.

use std::process::ExitCode;

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use scavenger_config::{discover_config_files, global_config_path};

use crate::cli::{
    context::CommandContext,
    output::{dim, subheader, warning},
};

/// Shows config files, index statistics and configuration warnings.
pub fn run(ctx: &mut CommandContext) -> ExitCode {
    let config_files = discover_config_files(&ctx.cwd);
    println!("{}", subheader("Config files:"));
    if config_files.is_empty() {
        let global = global_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "~/.scavenger.toml".to_string());
        println!("   {}", dim(&format!("(none; defaults apply, see {global})")));
    }
    for path in &config_files {
        println!("   {}", path.display());
    }
    println!();

    let window = ctx.recency_window();
    let hours = ctx.config.ingest.recency_window_hours;
    let service = match ctx.service() {
        Ok(s) => s,
        Err(code) => return code,
    };
    let status = match service.status(window) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: failed to read index status: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("{}", subheader("Index:"));
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Property", "Value"]);
    let path = status
        .path
        .as_ref()
        .map_or_else(|| "(in memory)".to_string(), |p| p.display().to_string());
    for (property, value) in [
        ("path".to_string(), path),
        ("version".to_string(), status.version.to_string()),
        ("documents".to_string(), status.documents.to_string()),
        (
            format!("indexed in last {hours}h"),
            status.recent_documents.to_string(),
        ),
        ("pending".to_string(), status.pending.to_string()),
        ("segments".to_string(), status.segments.to_string()),
    ] {
        table.add_row(vec![Cell::new(property), Cell::new(value)]);
    }
    println!("{table}");
    println!();

    let warnings = ctx.config.validate();
    if warnings.is_empty() {
        println!("No issues found.");
        return ExitCode::SUCCESS;
    }
    println!("{}", subheader(&format!("Warnings ({}):", warnings.len())));
    for w in &warnings {
        println!("   {}", warning(&w.to_string()));
    }
    ExitCode::FAILURE
}
