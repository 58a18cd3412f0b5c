//! `wrapi list` - table of recent simulations.

use tabled::Tabled;

use crate::client::api::{self, Configuration};
use crate::client::commands::{
    display_table_with_count, format_timestamp, print_error, print_json,
};
use crate::models::SimulationType;

#[derive(Tabled)]
struct SimulationTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    sim_type: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Created")]
    created: String,
}

pub fn handle_list(
    config: &Configuration,
    sim_type: Option<SimulationType>,
    limit: usize,
    format: &str,
) {
    match api::list_simulations(config, sim_type, limit) {
        Ok(simulations) => {
            if format == "json" {
                print_json(&simulations);
            } else if simulations.is_empty() {
                println!("No simulations found.");
            } else {
                let rows: Vec<SimulationTableRow> = simulations
                    .iter()
                    .map(|s| SimulationTableRow {
                        id: s.id.clone(),
                        sim_type: s.sim_type.engine_name(),
                        status: s.status.to_string(),
                        label: truncate(s.label.as_deref().unwrap_or("N/A"), 30),
                        created: format_timestamp(&s.created_at),
                    })
                    .collect();
                display_table_with_count(&rows, "simulations");
            }
        }
        Err(e) => {
            print_error("listing simulations", &e);
            std::process::exit(1);
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}
