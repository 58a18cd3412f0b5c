//! `wrapi health` - check API availability. Works without a token.

use crate::client::api::{self, Configuration};
use crate::client::commands::{print_error, print_json};

pub fn handle_health(config: &Configuration, format: &str) {
    match api::health(config) {
        Ok(()) => {
            if format == "json" {
                print_json(&serde_json::json!({"healthy": true, "url": config.base_path}));
            } else {
                println!("API is healthy: {}", config.base_path);
            }
        }
        Err(e) => {
            if format == "json" {
                print_json(&serde_json::json!({"healthy": false, "url": config.base_path}));
            } else {
                print_error("checking API health", &e);
            }
            std::process::exit(1);
        }
    }
}
