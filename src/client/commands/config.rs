//! `wrapi config` - inspect or update the user configuration file.

use std::fs;

use crate::client::commands::{print_error, print_json};
use crate::config::{ConfigPaths, WrapiConfig, mask_token};

pub struct ConfigArgs {
    pub show: bool,
    pub token: Option<String>,
    pub url: Option<String>,
    pub init: bool,
}

pub fn handle_config(effective: &WrapiConfig, args: &ConfigArgs, format: &str) {
    let paths = ConfigPaths::new();

    if args.init {
        let Some(path) = paths.user.clone() else {
            print_error(
                "initializing config",
                &"could not determine the user config directory",
            );
            std::process::exit(1);
        };
        if path.exists() {
            eprintln!("Config file already exists: {}", path.display());
            std::process::exit(1);
        }
        if let Some(dir) = path.parent() {
            if let Err(e) = fs::create_dir_all(dir) {
                print_error("initializing config", &e);
                std::process::exit(1);
            }
        }
        if let Err(e) = fs::write(&path, WrapiConfig::generate_default_config()) {
            print_error("initializing config", &e);
            std::process::exit(1);
        }
        println!("Wrote default config to {}", path.display());
        return;
    }

    if args.token.is_some() || args.url.is_some() {
        // Updates apply to the user file only; system and local files are
        // left alone.
        let user_files: Vec<std::path::PathBuf> = paths.user.iter().cloned().collect();
        let mut user_config = match WrapiConfig::load_from_files(&user_files) {
            Ok(config) => config,
            Err(e) => {
                print_error("loading user config", &e);
                std::process::exit(1);
            }
        };
        if let Some(token) = &args.token {
            user_config.client.api_token = Some(token.clone());
        }
        if let Some(url) = &args.url {
            user_config.client.api_url = url.clone();
        }
        match user_config.save_user(&paths) {
            Ok(path) => {
                if args.token.is_some() {
                    println!("API token saved to {}", path.display());
                }
                if let Some(url) = &args.url {
                    println!("API URL saved: {}", url);
                }
            }
            Err(e) => {
                print_error("saving config", &e);
                std::process::exit(1);
            }
        }
        if !args.show {
            return;
        }
    }

    // Default action (and --show): print the effective configuration.
    if format == "json" {
        let mut masked = effective.clone();
        if let Some(token) = &masked.client.api_token {
            masked.client.api_token = Some(mask_token(token));
        }
        print_json(&masked);
        return;
    }

    println!("Current configuration:");
    let existing = paths.existing_paths();
    if existing.is_empty() {
        println!("  Config files: none (using defaults)");
    } else {
        println!("  Config files:");
        for path in existing {
            println!("    {}", path.display());
        }
    }
    println!("  API URL: {}", effective.client.api_url);
    println!(
        "  Token:   {}",
        effective
            .client
            .api_token
            .as_deref()
            .map(mask_token)
            .unwrap_or_else(|| "Not set".to_string())
    );
    println!("  Format:  {}", effective.client.format);
    println!("  Log level: {}", effective.client.log_level);
    println!("  Poll interval: {}s", effective.run.poll_interval);
    println!("  Timeout: {}s", effective.run.timeout);
    if let Some(dir) = &effective.run.download_dir {
        println!("  Download dir: {}", dir.display());
    }
}
