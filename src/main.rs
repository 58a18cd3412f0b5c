//! wrapi - command-line client for the WRM cloud simulation API.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, builder::styling};
use env_logger::Builder;
use log::LevelFilter;

use wrapi::client::Configuration;
use wrapi::client::commands::batch::{BatchArgs, handle_batch};
use wrapi::client::commands::config::{ConfigArgs, handle_config};
use wrapi::client::commands::files::handle_files;
use wrapi::client::commands::health::handle_health;
use wrapi::client::commands::list::handle_list;
use wrapi::client::commands::logs::handle_logs;
use wrapi::client::commands::run::{RunArgs, handle_run};
use wrapi::client::commands::status::handle_status;
use wrapi::client::commands::validate::handle_validate;
use wrapi::client::poll::WaitOptions;
use wrapi::config::WrapiConfig;
use wrapi::models::SimulationType;

const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::Green.on_default().bold())
    .usage(styling::AnsiColor::Green.on_default().bold())
    .literal(styling::AnsiColor::Cyan.on_default().bold())
    .placeholder(styling::AnsiColor::Cyan.on_default());

#[derive(Parser)]
#[command(name = "wrapi")]
#[command(version)]
#[command(about = "Command-line client for the WRM cloud simulation API (SWMM / EPANET)")]
#[command(styles = STYLES)]
#[command(after_long_help = "\
EXAMPLES:
    # Run a SWMM simulation from a local file and wait for it
    wrapi run model.inp --type swmm --wait

    # Run from a URL
    wrapi run https://example.com/model.inp --type epanet

    # Run with auxiliary data files (rainfall, temperature)
    wrapi run model.inp --type swmm --aux rainfall.dat temp.dat

    # Check status and fetch results
    wrapi status 550e8400-e29b-41d4-a716-446655440000
    wrapi files 550e8400-e29b-41d4-a716-446655440000 --download ./results

    # Recent simulations as JSON
    wrapi -f json list --type swmm -n 10

    # Store the API token
    wrapi config --token YOUR_API_TOKEN
")]
struct Cli {
    /// API base URL
    #[arg(long, env = "WRAPI_URL")]
    url: Option<String>,

    /// API bearer token
    #[arg(long, env = "WRAPI_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Output format (table, json)
    #[arg(short = 'f', long, global = true)]
    format: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a simulation from a local file or URL
    #[command(after_long_help = "\
EXAMPLES:
    # Submit and return immediately
    wrapi run model.inp --type swmm --label \"My Storm Model\"

    # Wait for completion, streaming engine logs
    wrapi run model.inp --type swmm --wait --timeout 1200

    # Download results when done
    wrapi run model.inp --type swmm --wait --download ./results
")]
    Run {
        /// Input file path or http(s) URL
        input: String,
        /// Simulation type
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        sim_type: SimulationType,
        /// Simulation label
        #[arg(short, long)]
        label: Option<String>,
        /// Auxiliary data files packaged alongside the input
        #[arg(short, long, num_args = 1..)]
        aux: Vec<PathBuf>,
        /// Wait for completion, streaming engine logs
        #[arg(short, long)]
        wait: bool,
        /// Wait timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Seconds between status polls
        #[arg(long)]
        poll_interval: Option<u64>,
        /// Download result files into this directory after completion
        #[arg(short, long)]
        download: Option<PathBuf>,
    },
    /// Submit many inputs, then poll them all to completion
    #[command(after_long_help = "\
EXAMPLES:
    # Submit a set of models and wait for all of them
    wrapi batch storm1.inp storm2.inp storm3.inp --type swmm --wait
")]
    Batch {
        /// Input file paths or http(s) URLs
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<String>,
        /// Simulation type
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        sim_type: SimulationType,
        /// Poll all submissions until each reaches a terminal state
        #[arg(short, long)]
        wait: bool,
        /// Wait timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Seconds between status polls
        #[arg(long)]
        poll_interval: Option<u64>,
    },
    /// Show simulation details
    Status {
        /// Simulation ID
        id: String,
    },
    /// Print engine log lines, oldest first
    Logs {
        /// Simulation ID
        id: String,
        /// Number of log lines to fetch
        #[arg(short = 'n', long, default_value_t = 50)]
        limit: usize,
    },
    /// List result artifacts, optionally downloading them
    Files {
        /// Simulation ID
        id: String,
        /// Download all files into this directory
        #[arg(short, long)]
        download: Option<PathBuf>,
    },
    /// List recent simulations
    List {
        /// Filter by simulation type
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        sim_type: Option<SimulationType>,
        /// Number of simulations to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
    /// Lint input files locally before submission
    #[command(after_long_help = "\
EXAMPLES:
    # Check a model for common submission-killing mistakes
    wrapi validate model.inp

    # Lint a whole directory of models, machine-readable
    wrapi -f json validate models/*.inp
")]
    Validate {
        /// Input files to check
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
    },
    /// Check API availability (no token required)
    Health,
    /// Inspect or update the user configuration file
    #[command(after_long_help = "\
EXAMPLES:
    # Save the API token to the user config file
    wrapi config --token YOUR_API_TOKEN

    # Write a commented default config file
    wrapi config --init

    # Show the effective configuration
    wrapi config --show
")]
    Config {
        /// Show the effective configuration
        #[arg(short, long)]
        show: bool,
        /// Save this API token to the user config file
        #[arg(long)]
        token: Option<String>,
        /// Save this API URL to the user config file
        #[arg(long)]
        url: Option<String>,
        /// Write a commented default config file
        #[arg(long)]
        init: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let mut config = match WrapiConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    };

    // CLI flags (and their env vars, via clap) override config files.
    if let Some(url) = &cli.url {
        config.client.api_url = url.clone();
    }
    if let Some(token) = &cli.token {
        config.client.api_token = Some(token.clone());
    }
    if let Some(format) = &cli.format {
        config.client.format = format.clone();
    }
    if let Some(log_level) = &cli.log_level {
        config.client.log_level = log_level.clone();
    }

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Invalid configuration: {}", error);
        }
        std::process::exit(1);
    }

    init_logger(&config.client.log_level);

    let format = config.client.format.clone();
    let mut api_config = Configuration::new();
    api_config.base_path = config.client.api_url.trim_end_matches('/').to_string();
    api_config.bearer_access_token = config.client.api_token.clone();

    match &cli.command {
        Commands::Run {
            input,
            sim_type,
            label,
            aux,
            wait,
            timeout,
            poll_interval,
            download,
        } => {
            let wait_opts = wait_options(&config, *timeout, *poll_interval);
            let args = RunArgs {
                input: input.clone(),
                sim_type: *sim_type,
                label: label.clone(),
                aux: aux.clone(),
                wait: *wait,
                download: download.clone().or_else(|| config.run.download_dir.clone()),
            };
            handle_run(&api_config, &args, &wait_opts, &format);
        }
        Commands::Batch {
            inputs,
            sim_type,
            wait,
            timeout,
            poll_interval,
        } => {
            let wait_opts = wait_options(&config, *timeout, *poll_interval);
            let args = BatchArgs {
                inputs: inputs.clone(),
                sim_type: *sim_type,
                wait: *wait,
            };
            handle_batch(&api_config, &args, &wait_opts, &format);
        }
        Commands::Status { id } => handle_status(&api_config, id, &format),
        Commands::Logs { id, limit } => handle_logs(&api_config, id, *limit, &format),
        Commands::Files { id, download } => {
            handle_files(&api_config, id, download.as_deref(), &format)
        }
        Commands::List { sim_type, limit } => {
            handle_list(&api_config, *sim_type, *limit, &format)
        }
        Commands::Validate { inputs } => handle_validate(inputs, &format),
        Commands::Health => handle_health(&api_config, &format),
        Commands::Config {
            show,
            token,
            url,
            init,
        } => {
            let args = ConfigArgs {
                show: *show,
                token: token.clone(),
                url: url.clone(),
                init: *init,
            };
            handle_config(&config, &args, &format);
        }
    }
}

fn wait_options(config: &WrapiConfig, timeout: Option<u64>, poll_interval: Option<u64>) -> WaitOptions {
    WaitOptions {
        timeout: Duration::from_secs(timeout.unwrap_or(config.run.timeout)),
        poll_interval: Duration::from_secs(poll_interval.unwrap_or(config.run.poll_interval)),
    }
}

/// Initialize stderr logging. `RUST_LOG` still wins when set.
fn init_logger(log_level: &str) {
    let level = match log_level {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    let mut builder = Builder::from_default_env();
    if std::env::var("RUST_LOG").is_err() {
        builder.filter_level(level);
    }
    builder.init();
}
