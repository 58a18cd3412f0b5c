//! `wrapi logs` - print engine log lines, oldest first.

use crate::client::api::{self, Configuration};
use crate::client::commands::{format_timestamp, print_error, print_json};

pub fn handle_logs(config: &Configuration, id: &str, limit: usize, format: &str) {
    match api::get_simulation_logs(config, id, limit) {
        Ok(logs) => {
            if format == "json" {
                print_json(&logs);
                return;
            }
            if logs.is_empty() {
                println!("No logs found.");
                return;
            }
            println!("Simulation logs (showing {}):", logs.len());
            // The API returns newest first
            for log in logs.iter().rev() {
                println!("[{}] {}", format_timestamp(&log.timestamp), log.message);
            }
        }
        Err(e) => {
            print_error("getting logs", &e);
            std::process::exit(1);
        }
    }
}
