//! Blocking HTTP wrapper for the WRM REST API.
//!
//! One function per endpoint. All calls are synchronous; the CLI's
//! request/poll/sleep flow has no use for an async runtime.

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Duration;

use log::debug;
use reqwest::StatusCode;
use reqwest::blocking::multipart;

use crate::models::{
    CreateSimulationRequest, LogEntry, LogsResponse, Simulation, SimulationFile, SimulationType,
};

/// Timeout for `GET /health`; the endpoint either answers fast or not at all.
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("simulation not found: {0}")]
    NotFound(String),
    #[error("API returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error(
        "no API token configured; set WRAPI_TOKEN or run `wrapi config --token <TOKEN>`"
    )]
    MissingToken,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// True for errors worth retrying: connection and timeout failures.
    /// HTTP-status errors are final answers from the server and are not.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}

/// Connection settings for the API, built in `main` from the merged config
/// and CLI flags.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub base_path: String,
    pub user_agent: Option<String>,
    pub bearer_access_token: Option<String>,
    pub client: reqwest::blocking::Client,
}

impl Configuration {
    pub fn new() -> Self {
        Self {
            base_path: crate::config::DEFAULT_API_URL.to_string(),
            user_agent: Some(format!("wrapi/{}", env!("CARGO_PKG_VERSION"))),
            bearer_access_token: None,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn token(&self) -> Result<&str, ApiError> {
        self.bearer_access_token
            .as_deref()
            .ok_or(ApiError::MissingToken)
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> Result<reqwest::blocking::RequestBuilder, ApiError> {
        let url = format!("{}{}", self.base_path, path);
        debug!("{} {}", method, url);
        let mut builder = self.client.request(method, url).bearer_auth(self.token()?);
        if let Some(user_agent) = &self.user_agent {
            builder = builder.header(reqwest::header::USER_AGENT, user_agent.clone());
        }
        Ok(builder)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn a non-success response into an `ApiError`, preserving the body
/// verbatim so engine messages reach the user unaltered.
fn error_for_status(response: reqwest::blocking::Response) -> ApiError {
    let status = response.status();
    let body = response.text().unwrap_or_default();
    ApiError::Status { status, body }
}

/// `GET /health`. No auth header, short timeout.
pub fn health(config: &Configuration) -> Result<(), ApiError> {
    let response = config
        .client
        .get(format!("{}/health", config.base_path))
        .timeout(HEALTH_CHECK_TIMEOUT)
        .send()?;
    if response.status().is_success() {
        Ok(())
    } else {
        Err(error_for_status(response))
    }
}

/// `POST /simulations` with a JSON body; the server fetches the input itself.
pub fn create_simulation_from_url(
    config: &Configuration,
    request: &CreateSimulationRequest,
) -> Result<Simulation, ApiError> {
    let response = config
        .request(reqwest::Method::POST, "/simulations")?
        .json(request)
        .send()?;
    if response.status() == StatusCode::CREATED {
        Ok(response.json()?)
    } else {
        Err(error_for_status(response))
    }
}

/// `POST /simulations` as multipart form data, uploading local content.
///
/// `upload_name` is the file name the server sees; it may differ from the
/// on-disk name when the payload was staged into a zip archive.
pub fn create_simulation_upload(
    config: &Configuration,
    sim_type: SimulationType,
    label: Option<&str>,
    upload_name: &str,
    path: &Path,
) -> Result<Simulation, ApiError> {
    let mut form = multipart::Form::new().text("type", sim_type.to_string());
    if let Some(label) = label {
        form = form.text("label", label.to_string());
    }
    let part = multipart::Part::file(path)?.file_name(upload_name.to_string());
    form = form.part("file", part);

    let response = config
        .request(reqwest::Method::POST, "/simulations")?
        .multipart(form)
        .send()?;
    if response.status() == StatusCode::CREATED {
        Ok(response.json()?)
    } else {
        Err(error_for_status(response))
    }
}

/// `GET /simulations/{id}`. A 404 becomes `ApiError::NotFound`.
pub fn get_simulation(config: &Configuration, id: &str) -> Result<Simulation, ApiError> {
    let response = config
        .request(reqwest::Method::GET, &format!("/simulations/{}", id))?
        .send()?;
    match response.status() {
        status if status.is_success() => Ok(response.json()?),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(id.to_string())),
        _ => Err(error_for_status(response)),
    }
}

/// `GET /simulations`, newest first. The server does not paginate; the
/// client truncates to `limit`.
pub fn list_simulations(
    config: &Configuration,
    sim_type: Option<SimulationType>,
    limit: usize,
) -> Result<Vec<Simulation>, ApiError> {
    let mut builder = config.request(reqwest::Method::GET, "/simulations")?;
    if let Some(sim_type) = sim_type {
        builder = builder.query(&[("type", sim_type.to_string())]);
    }
    let response = builder.send()?;
    if response.status().is_success() {
        let mut simulations: Vec<Simulation> = response.json()?;
        simulations.truncate(limit);
        Ok(simulations)
    } else {
        Err(error_for_status(response))
    }
}

/// `GET /simulations/{id}/logs?limit=N`. Entries come back newest first.
pub fn get_simulation_logs(
    config: &Configuration,
    id: &str,
    limit: usize,
) -> Result<Vec<LogEntry>, ApiError> {
    let response = config
        .request(reqwest::Method::GET, &format!("/simulations/{}/logs", id))?
        .query(&[("limit", limit)])
        .send()?;
    if response.status().is_success() {
        let body: LogsResponse = response.json()?;
        Ok(body.logs)
    } else {
        Err(error_for_status(response))
    }
}

/// `GET /simulations/{id}/files`.
pub fn get_simulation_files(
    config: &Configuration,
    id: &str,
) -> Result<Vec<SimulationFile>, ApiError> {
    let response = config
        .request(reqwest::Method::GET, &format!("/simulations/{}/files", id))?
        .send()?;
    if response.status().is_success() {
        Ok(response.json()?)
    } else {
        Err(error_for_status(response))
    }
}

/// Download a result artifact to `dest`, returning the bytes written.
///
/// Artifact URLs are absolute and may point at object storage on another
/// host; the bearer token is never sent to foreign hosts.
pub fn download_file(config: &Configuration, url: &str, dest: &Path) -> Result<u64, ApiError> {
    debug!("GET {} -> {}", url, dest.display());
    let mut response = config.client.get(url).send()?;
    if !response.status().is_success() {
        return Err(error_for_status(response));
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(dest)?;
    let bytes = io::copy(&mut response, &mut file)?;
    Ok(bytes)
}
