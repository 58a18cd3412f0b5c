//! CLI command handlers.
//!
//! One file per subcommand plus the shared printing helpers they all use.

pub mod batch;
pub mod config;
pub mod files;
pub mod health;
pub mod list;
pub mod logs;
pub mod run;
pub mod status;
pub mod validate;

use serde::Serialize;
use tabled::Tabled;
use tabled::settings::Style;

/// Report a failed operation to stderr. Callers exit(1) after this.
pub fn print_error(context: &str, err: &dyn std::fmt::Display) {
    eprintln!("Error {}: {}", context, err);
}

/// Progress and narration lines. They go to stdout normally; under JSON
/// output they move to stderr so stdout carries exactly one JSON document.
pub fn print_progress(json: bool, line: &str) {
    if json {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            print_error("serializing output to JSON", &e);
            std::process::exit(1);
        }
    }
}

/// Render rows as a table with a count footer.
pub fn display_table_with_count<T: Tabled>(rows: &[T], label: &str) {
    let mut table = tabled::Table::new(rows);
    table.with(Style::psql());
    println!("{}", table);
    println!("\n{} {}", rows.len(), label);
}

/// Human file size with one decimal (B/KB/MB/GB/TB).
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} TB", size)
}

/// RFC 3339 timestamp as `YYYY-MM-DD HH:MM:SS` local wall time; the raw
/// string is shown when parsing fails.
pub fn format_timestamp(ts: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => ts.to_string(),
    }
}

/// Timestamp columns are optional on the wire; render missing ones as N/A.
pub fn format_opt_timestamp(ts: Option<&str>) -> String {
    ts.map(format_timestamp).unwrap_or_else(|| "N/A".to_string())
}
