//! `wrapi run` - submit a simulation and optionally wait for it.

use std::path::PathBuf;

use log::warn;

use crate::client::api::{self, Configuration};
use crate::client::commands::files::download_all;
use crate::client::commands::{format_size, print_error, print_json, print_progress};
use crate::client::error_codes::scan_for_engine_errors;
use crate::client::payload::{InputSource, UploadPayload};
use crate::client::poll::{WaitOptions, WaitOutcome, wait_for_completion};
use crate::models::{CreateSimulationRequest, FileKind, Simulation, SimulationStatus, SimulationType};

pub struct RunArgs {
    pub input: String,
    pub sim_type: SimulationType,
    pub label: Option<String>,
    pub aux: Vec<PathBuf>,
    pub wait: bool,
    pub download: Option<PathBuf>,
}

pub fn handle_run(config: &Configuration, args: &RunArgs, wait_opts: &WaitOptions, format: &str) {
    let json = format == "json";
    if let Err(e) = api::health(config) {
        warn!("API health check failed ({}), proceeding anyway", e);
    }

    let source = match InputSource::from_arg(&args.input) {
        Ok(source) => source,
        Err(e) => {
            print_error("reading input", &e);
            std::process::exit(1);
        }
    };
    let label = args.label.clone().unwrap_or_else(|| {
        format!("{} - {}", args.sim_type.engine_name(), source.label_stem())
    });

    print_progress(
        json,
        &format!("Starting {} simulation...", args.sim_type.engine_name()),
    );
    print_progress(json, &format!("  Input: {}", args.input));
    print_progress(json, &format!("  Label: {}", label));

    let simulation = match submit(config, args, &source, &label, json) {
        Ok(simulation) => simulation,
        Err(e) => {
            print_error("creating simulation", &e);
            std::process::exit(1);
        }
    };

    print_progress(json, "\nSimulation created");
    print_progress(json, &format!("  ID: {}", simulation.id));
    print_progress(json, &format!("  Status: {}", simulation.status));

    if !args.wait {
        if json {
            print_json(&simulation);
        } else {
            println!("\nTo check status: wrapi status {}", simulation.id);
            println!("To view logs:    wrapi logs {}", simulation.id);
            println!("To get files:    wrapi files {}", simulation.id);
        }
        return;
    }

    print_progress(
        json,
        &format!(
            "\nWaiting for completion (timeout: {}s, polling every {}s)...",
            wait_opts.timeout.as_secs(),
            wait_opts.poll_interval.as_secs()
        ),
    );
    let outcome = wait_for_completion(config, &simulation.id, wait_opts, &mut |ts, msg| {
        print_progress(json, &format!("  [{}] {}", ts, msg));
    });

    match outcome {
        Ok(WaitOutcome::Finished(simulation)) => {
            report_final(config, &simulation, args, json);
            if json {
                print_json(&simulation);
            }
            if simulation.status == SimulationStatus::Failed {
                std::process::exit(1);
            }
        }
        Ok(WaitOutcome::TimedOut(last_seen)) => {
            let last_status = last_seen
                .map(|s| s.status.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            eprintln!(
                "Timeout waiting for simulation after {}s (last status: {})",
                wait_opts.timeout.as_secs(),
                last_status
            );
            eprintln!("Check later with: wrapi status {}", simulation.id);
            if json {
                print_json(&serde_json::json!({
                    "id": simulation.id,
                    "status": last_status,
                    "timed_out": true,
                }));
            }
            std::process::exit(1);
        }
        Err(e) => {
            print_error("waiting for simulation", &e);
            std::process::exit(1);
        }
    }
}

fn submit(
    config: &Configuration,
    args: &RunArgs,
    source: &InputSource,
    label: &str,
    json: bool,
) -> Result<Simulation, Box<dyn std::error::Error>> {
    match source {
        InputSource::Url(url) => {
            let request = CreateSimulationRequest {
                sim_type: args.sim_type,
                input_file_uri: url.clone(),
                label: Some(label.to_string()),
            };
            Ok(api::create_simulation_from_url(config, &request)?)
        }
        InputSource::LocalFile(path) => {
            if !args.aux.is_empty() {
                let names: Vec<String> =
                    args.aux.iter().map(|p| p.display().to_string()).collect();
                print_progress(json, &format!("  Auxiliary files: {}", names.join(", ")));
            }
            // The payload guard keeps any staged archive alive until the
            // POST below has completed.
            let payload = UploadPayload::stage(path, &args.aux)?;
            Ok(api::create_simulation_upload(
                config,
                args.sim_type,
                Some(label),
                &payload.upload_name,
                &payload.path,
            )?)
        }
    }
}

fn report_final(config: &Configuration, simulation: &Simulation, args: &RunArgs, json: bool) {
    match simulation.status {
        SimulationStatus::Completed => {
            print_progress(json, "\nSimulation completed successfully");
            // Give the server a moment to register result artifacts.
            std::thread::sleep(std::time::Duration::from_secs(2));
            match api::get_simulation_files(config, &simulation.id) {
                Ok(files) if !files.is_empty() => {
                    print_progress(json, "\nResult files:");
                    for file in &files {
                        print_progress(
                            json,
                            &format!(
                                "  [{:<10}] {:>10}  {}",
                                file.kind.to_string(),
                                format_size(file.size.unwrap_or(0)),
                                file.url
                            ),
                        );
                    }
                    if let Some(dir) = &args.download {
                        download_all(config, &files, dir, json);
                    }
                }
                Ok(_) => {
                    print_progress(
                        json,
                        "  (Files still uploading, use 'wrapi files' to check later)",
                    );
                }
                Err(e) => {
                    print_error("listing result files", &e);
                }
            }
        }
        SimulationStatus::Failed => {
            eprintln!("\nSimulation failed");
            let mut failure_text = String::new();
            if let Some(error) = &simulation.error {
                eprintln!("  {}", error);
                failure_text.push_str(error);
            }
            if let Ok(logs) = api::get_simulation_logs(config, &simulation.id, 50) {
                for log in logs {
                    failure_text.push('\n');
                    failure_text.push_str(&log.message);
                }
            }
            print_engine_hints(&failure_text);
            match api::get_simulation_files(config, &simulation.id) {
                Ok(files) => {
                    if let Some(report) = files.iter().find(|f| f.kind == FileKind::Report) {
                        eprintln!("\nCheck the report file for error details:");
                        eprintln!("  {}", report.url);
                    }
                }
                Err(e) => {
                    print_error("listing result files", &e);
                }
            }
        }
        _ => {}
    }
}

/// Append knowledge-base hints for engine error codes mentioned in failure
/// text. The text itself has already been shown verbatim.
fn print_engine_hints(text: &str) {
    for m in scan_for_engine_errors(text) {
        if let Some(known) = m.known {
            eprintln!(
                "  {} error {}: {}",
                m.engine, m.code, known.description
            );
            eprintln!("    hint: {}", known.hint);
        }
    }
}
