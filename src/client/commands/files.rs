//! `wrapi files` - list result artifacts, optionally downloading them.

use std::path::Path;

use tabled::Tabled;

use crate::client::api::{self, Configuration};
use crate::client::commands::{
    display_table_with_count, format_size, print_error, print_json, print_progress,
};
use crate::models::SimulationFile;

#[derive(Tabled)]
struct FileTableRow {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "URL")]
    url: String,
}

pub fn handle_files(config: &Configuration, id: &str, download: Option<&Path>, format: &str) {
    match api::get_simulation_files(config, id) {
        Ok(files) => {
            if format == "json" {
                print_json(&files);
            } else if files.is_empty() {
                println!("No files found.");
            } else {
                let rows: Vec<FileTableRow> = files
                    .iter()
                    .map(|f| FileTableRow {
                        kind: f.kind.to_string(),
                        size: format_size(f.size.unwrap_or(0)),
                        url: f.url.clone(),
                    })
                    .collect();
                display_table_with_count(&rows, "files");
            }
            if let Some(dir) = download {
                if files.is_empty() {
                    return;
                }
                download_all(config, &files, dir, format == "json");
            }
        }
        Err(e) => {
            print_error("listing files", &e);
            std::process::exit(1);
        }
    }
}

/// Download every artifact into `dir`, named by the last URL path segment.
/// Individual failures are reported but do not stop the remaining downloads.
pub fn download_all(config: &Configuration, files: &[SimulationFile], dir: &Path, json: bool) {
    print_progress(json, &format!("\nDownloading to {}/", dir.display()));
    let mut failures = 0;
    for file in files {
        let dest = dir.join(file.file_name());
        match api::download_file(config, &file.url, &dest) {
            Ok(bytes) => {
                print_progress(
                    json,
                    &format!("  {} ({})", file.file_name(), format_size(bytes)),
                );
            }
            Err(e) => {
                print_error(&format!("downloading {}", file.file_name()), &e);
                failures += 1;
            }
        }
    }
    if failures > 0 {
        std::process::exit(1);
    }
}
