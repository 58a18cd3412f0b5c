//! `wrapi status` - show details for one simulation.

use crate::client::api::{self, Configuration};
use crate::client::commands::{format_opt_timestamp, format_timestamp, print_error, print_json};

pub fn handle_status(config: &Configuration, id: &str, format: &str) {
    match api::get_simulation(config, id) {
        Ok(simulation) => {
            if format == "json" {
                print_json(&simulation);
                return;
            }
            println!("Simulation details:");
            println!("  ID:      {}", simulation.id);
            println!(
                "  Type:    {} v{}",
                simulation.sim_type.engine_name(),
                simulation.version.as_deref().unwrap_or("N/A")
            );
            println!("  Label:   {}", simulation.label.as_deref().unwrap_or("N/A"));
            println!("  Status:  {}", simulation.status);
            println!("  Created: {}", format_timestamp(&simulation.created_at));
            if simulation.started_at.is_some() {
                println!(
                    "  Started: {}",
                    format_opt_timestamp(simulation.started_at.as_deref())
                );
            }
            if simulation.completed_at.is_some() {
                println!(
                    "  Completed: {}",
                    format_opt_timestamp(simulation.completed_at.as_deref())
                );
            }
            if simulation.ended_at.is_some() {
                println!(
                    "  Ended: {}",
                    format_opt_timestamp(simulation.ended_at.as_deref())
                );
            }
            if let Some(error) = &simulation.error {
                println!("  Error:   {}", error);
            }
        }
        Err(e) => {
            print_error("getting simulation", &e);
            std::process::exit(1);
        }
    }
}
