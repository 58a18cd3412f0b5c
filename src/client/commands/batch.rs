//! `wrapi batch` - submit many inputs and poll them round-robin until every
//! one reaches a terminal state or the deadline passes.

use std::collections::HashSet;
use std::time::Instant;

use log::warn;
use tabled::Tabled;

use crate::client::api::{self, Configuration};
use crate::client::commands::{display_table_with_count, print_error, print_json, print_progress};
use crate::client::payload::{InputSource, UploadPayload};
use crate::client::poll::WaitOptions;
use crate::models::{CreateSimulationRequest, FileKind, SimulationStatus, SimulationType};

pub struct BatchArgs {
    pub inputs: Vec<String>,
    pub sim_type: SimulationType,
    pub wait: bool,
}

#[derive(serde::Serialize)]
struct BatchEntry {
    input: String,
    id: Option<String>,
    status: String,
}

#[derive(Tabled)]
struct BatchTableRow {
    #[tabled(rename = "Input")]
    input: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub fn handle_batch(
    config: &Configuration,
    args: &BatchArgs,
    wait_opts: &WaitOptions,
    format: &str,
) {
    let json = format == "json";
    if let Err(e) = api::health(config) {
        warn!("API health check failed ({}), proceeding anyway", e);
    }

    // Submissions are sequential; the remote engines do the parallel work.
    let mut entries: Vec<BatchEntry> = Vec::new();
    print_progress(
        json,
        &format!("Submitting {} simulations...", args.inputs.len()),
    );
    for input in &args.inputs {
        print_progress(json, &format!("  Submitting: {}", input));
        match submit_one(config, input, args.sim_type) {
            Ok((id, status)) => {
                print_progress(json, &format!("    ID: {}", id));
                entries.push(BatchEntry {
                    input: input.clone(),
                    id: Some(id),
                    status: status.to_string(),
                });
            }
            Err(e) => {
                print_error(&format!("submitting {}", input), &e);
                entries.push(BatchEntry {
                    input: input.clone(),
                    id: None,
                    status: "submit_failed".to_string(),
                });
            }
        }
    }

    if args.wait {
        poll_all(config, &mut entries, wait_opts, json);
    }

    let completed = entries.iter().filter(|e| e.status == "completed").count();
    let failed = entries
        .iter()
        .filter(|e| e.status == "failed" || e.status == "submit_failed")
        .count();
    let other = entries.len() - completed - failed;

    if json {
        print_json(&serde_json::json!({
            "completed": completed,
            "failed": failed,
            "other": other,
            "simulations": entries,
        }));
    } else {
        println!("\nBatch results:");
        let rows: Vec<BatchTableRow> = entries
            .iter()
            .map(|e| BatchTableRow {
                input: e.input.clone(),
                id: e.id.clone().unwrap_or_else(|| "-".to_string()),
                status: e.status.clone(),
            })
            .collect();
        display_table_with_count(&rows, "simulations");
        println!("Completed: {}  Failed: {}  Other: {}", completed, failed, other);
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

fn submit_one(
    config: &Configuration,
    input: &str,
    sim_type: SimulationType,
) -> Result<(String, SimulationStatus), Box<dyn std::error::Error>> {
    let source = InputSource::from_arg(input)?;
    let simulation = match &source {
        InputSource::Url(url) => {
            let request = CreateSimulationRequest {
                sim_type,
                input_file_uri: url.clone(),
                label: Some(url.rsplit('/').next().unwrap_or(url).to_string()),
            };
            api::create_simulation_from_url(config, &request)?
        }
        InputSource::LocalFile(path) => {
            let payload = UploadPayload::stage(path, &[])?;
            api::create_simulation_upload(
                config,
                sim_type,
                None,
                &payload.upload_name,
                &payload.path,
            )?
        }
    };
    Ok((simulation.id, simulation.status))
}

fn poll_all(config: &Configuration, entries: &mut [BatchEntry], wait_opts: &WaitOptions, json: bool) {
    let pending: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.id.is_some())
        .map(|(i, _)| i)
        .collect();
    if pending.is_empty() {
        return;
    }

    print_progress(
        json,
        &format!("\nWaiting for {} simulations to complete...", pending.len()),
    );
    let deadline = Instant::now() + wait_opts.timeout;
    let mut done: HashSet<usize> = HashSet::new();

    while done.len() < pending.len() && Instant::now() < deadline {
        for &i in &pending {
            if done.contains(&i) {
                continue;
            }
            let id = entries[i].id.clone().expect("pending entries have ids");
            match api::get_simulation(config, &id) {
                Ok(simulation) => {
                    entries[i].status = simulation.status.to_string();
                    if simulation.status.is_terminal() {
                        done.insert(i);
                        print_progress(
                            json,
                            &format!("  {}: {}", entries[i].input, entries[i].status),
                        );
                        if simulation.status == SimulationStatus::Completed {
                            print_report_url(config, &id, &entries[i].input, json);
                        }
                    }
                }
                Err(e) => {
                    warn!("polling {} failed: {}", id, e);
                }
            }
        }
        if done.len() < pending.len() {
            std::thread::sleep(wait_opts.poll_interval);
        }
    }

    let unfinished = pending.len() - done.len();
    if unfinished > 0 {
        eprintln!(
            "Timeout after {}s with {} simulations still running",
            wait_opts.timeout.as_secs(),
            unfinished
        );
    }
}

fn print_report_url(config: &Configuration, id: &str, input: &str, json: bool) {
    if let Ok(files) = api::get_simulation_files(config, id) {
        if let Some(report) = files.iter().find(|f| f.kind == FileKind::Report) {
            print_progress(json, &format!("    report: {} ({})", report.url, input));
        }
    }
}
