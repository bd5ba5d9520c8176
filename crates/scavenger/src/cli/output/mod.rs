//! Rendering and JSON serialization for CLI output.

use std::process::ExitCode;

pub use scavenger_highlight::{dim, header, subheader, success, warning};
use scavenger_highlight::{indent_content, render_fragment};
use scavenger_index::{SearchHit, SearchResponse, StoredDocument};
use serde::Serialize;

/// Marker pair used to render highlight fragments.
pub struct Markers<'a> {
    /// Opening marker.
    pub pre: &'a str,
    /// Closing marker.
    pub post: &'a str,
}

/// Prints `value` as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Prints a search response as text.
pub fn print_search_response(response: &SearchResponse, markers: &Markers<'_>) {
    if response.documents.is_empty() {
        println!("{}", dim("No results found."));
        return;
    }
    for hit in &response.documents {
        print!("{}", format_hit(hit, markers));
        println!();
    }
    println!(
        "{}",
        dim(&format!(
            "─── {} of {} hits, {} documents ───",
            response.documents.len(),
            response.total_hits,
            response.total_documents
        ))
    );
}

/// Formats one hit: header line, metadata, fragments and optional data.
fn format_hit(hit: &SearchHit, markers: &Markers<'_>) -> String {
    let mut out = format!("─── {} ───\n", header(&hit.key));
    if !hit.name.is_empty() && hit.name != hit.key {
        out.push_str(&format!("{}\n", subheader(&hit.name)));
    }
    out.push_str(&format!(
        "{}\n",
        dim(&format!(
            "id {}, {}, {}, score {:.2}",
            hit.id, hit.data_source, hit.file_extension, hit.score
        ))
    ));
    if let Some(fragments) = &hit.highlights {
        for fragment in fragments {
            let line = render_fragment(&fragment.replace('\n', " "), markers.pre, markers.post);
            out.push_str(&format!("  … {line}\n"));
        }
    }
    if let Some(data) = &hit.data {
        out.push('\n');
        out.push_str(&indent_content(data));
        out.push('\n');
    }
    out
}

/// Prints a stored document as text.
pub fn print_document(doc: &StoredDocument) {
    let record = &doc.record;
    println!("─── {} ───", header(&record.key));
    for (label, value) in [
        ("id", doc.id.to_string()),
        ("name", record.name.clone()),
        ("description", record.description.clone()),
        ("fileExtension", record.file_extension.clone()),
        ("dataSource", record.data_source.clone()),
        ("modifiedEpochTime", doc.modified_epoch_time.to_string()),
    ] {
        println!("{} {value}", dim(&format!("{label}:")));
    }
    println!();
    println!("{}", record.data);
}
