//! Layered TOML configuration for the wrapi CLI.
//!
//! Configuration is merged from three locations, later entries winning per
//! field: the system file (`/etc/wrapi/config.toml`), the user file
//! (`<config_dir>/wrapi/config.toml`), and a local `wrapi.toml` in the
//! current directory. CLI flags and the `WRAPI_URL`/`WRAPI_TOKEN` environment
//! variables override everything here.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default API base URL (production).
pub const DEFAULT_API_URL: &str = "https://wrm.neer.ai";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not determine the user config directory")]
    NoUserConfigDir,
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Client connection and output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the WRM API
    pub api_url: String,

    /// Bearer token for the API
    pub api_token: Option<String>,

    /// Output format for list-like commands (table, json)
    pub format: String,

    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            format: "table".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Settings for `run`/`batch` polling and downloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Seconds between status polls while waiting for completion
    pub poll_interval: u64,

    /// Overall wait timeout in seconds
    pub timeout: u64,

    /// Directory result artifacts are downloaded into
    pub download_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            poll_interval: 15,
            timeout: 600,
            download_dir: None,
        }
    }
}

/// Root configuration for the wrapi CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapiConfig {
    pub client: ClientConfig,
    pub run: RunConfig,
}

/// The three candidate config file locations, lowest priority first.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub system: PathBuf,
    pub user: Option<PathBuf>,
    pub local: PathBuf,
}

impl ConfigPaths {
    pub fn new() -> Self {
        Self {
            system: PathBuf::from("/etc/wrapi/config.toml"),
            user: dirs::config_dir().map(|d| d.join("wrapi").join("config.toml")),
            local: PathBuf::from("wrapi.toml"),
        }
    }

    /// Candidate paths in priority order (lowest first).
    pub fn all_paths(&self) -> Vec<&PathBuf> {
        let mut paths = vec![&self.system];
        if let Some(user) = &self.user {
            paths.push(user);
        }
        paths.push(&self.local);
        paths
    }

    /// The subset of candidate paths that exist on disk, priority order kept.
    pub fn existing_paths(&self) -> Vec<&PathBuf> {
        self.all_paths().into_iter().filter(|p| p.exists()).collect()
    }

    /// Directory containing the user config file.
    pub fn user_config_dir(&self) -> Option<&Path> {
        self.user.as_deref().and_then(|p| p.parent())
    }
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::new()
    }
}

impl WrapiConfig {
    /// Load from the standard locations, merging system -> user -> local.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_paths(&ConfigPaths::new())
    }

    pub fn load_with_paths(paths: &ConfigPaths) -> Result<Self, ConfigError> {
        let files: Vec<PathBuf> = paths.existing_paths().into_iter().cloned().collect();
        Self::load_from_files(&files)
    }

    /// Load and merge the given files in order; later files override earlier
    /// ones per field. Missing files are skipped, so an empty list (or a list
    /// of nonexistent paths) yields the defaults.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut merged = toml::Value::Table(toml::map::Map::new());

        for path in files {
            if !path.exists() {
                continue;
            }
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            let value: toml::Value =
                toml::from_str(&content).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?;
            merge_toml(&mut merged, value);
        }

        // Round-trip through the merged table; serde(default) fills the gaps.
        let config: WrapiConfig = merged.try_into().map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<merged>"),
            source,
        })?;
        Ok(config)
    }

    /// Check field values, collecting every problem instead of stopping at
    /// the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.client.api_url.trim().is_empty() {
            errors.push("client.api_url must not be empty".to_string());
        }
        if self.client.format != "table" && self.client.format != "json" {
            errors.push(format!(
                "client.format must be 'table' or 'json', got '{}'",
                self.client.format
            ));
        }
        if self.run.poll_interval == 0 {
            errors.push("run.poll_interval must be greater than 0".to_string());
        }
        if self.run.timeout == 0 {
            errors.push("run.timeout must be greater than 0".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// A commented default config file, written by `wrapi config --init`.
    pub fn generate_default_config() -> String {
        format!(
            r#"# wrapi configuration file
#
# Search order (later files override earlier ones, per field):
#   /etc/wrapi/config.toml
#   <user config dir>/wrapi/config.toml
#   ./wrapi.toml
# CLI flags and WRAPI_URL / WRAPI_TOKEN environment variables win over files.

[client]
# Base URL of the WRM API
api_url = "{DEFAULT_API_URL}"

# Bearer token for the API (prefer WRAPI_TOKEN or `wrapi config --token`)
# api_token = "..."

# Output format for list-like commands: "table" or "json"
format = "table"

# Log level: error, warn, info, debug, trace
log_level = "info"

[run]
# Seconds between status polls while waiting for completion
poll_interval = 15

# Overall wait timeout in seconds
timeout = 600

# Directory result artifacts are downloaded into
# download_dir = "results"
"#
        )
    }

    /// Write this config to the user config file, creating directories as
    /// needed. Returns the path written.
    pub fn save_user(&self, paths: &ConfigPaths) -> Result<PathBuf, ConfigError> {
        let path = paths.user.clone().ok_or(ConfigError::NoUserConfigDir)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                path: path.clone(),
                source,
            })?;
        }
        let toml_str = self.to_toml()?;
        fs::write(&path, toml_str).map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Recursive table merge; `overlay` wins for scalar and array values.
fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base_slot, overlay_value) => *base_slot = overlay_value,
    }
}

/// Mask a token for display, keeping only the last four characters.
/// Counts characters, not bytes, so multi-byte tokens never split.
pub fn mask_token(token: &str) -> String {
    let chars = token.chars().count();
    if chars <= 4 {
        "****".to_string()
    } else {
        let tail: String = token.chars().skip(chars - 4).collect();
        format!("{}{}", "*".repeat(chars - 4), tail)
    }
}
