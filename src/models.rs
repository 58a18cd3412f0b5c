//! Wire types for the WRM simulation API.
//!
//! These mirror the JSON schema served by the remote API; the client does not
//! define this schema, it only consumes it.

use serde::{Deserialize, Serialize};

/// Engine selector accepted by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SimulationType {
    #[serde(rename = "swmm")]
    #[default]
    Swmm,
    #[serde(rename = "epanet")]
    Epanet,
    #[serde(rename = "hec_ras")]
    HecRas,
}

impl std::fmt::Display for SimulationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationType::Swmm => write!(f, "swmm"),
            SimulationType::Epanet => write!(f, "epanet"),
            SimulationType::HecRas => write!(f, "hec_ras"),
        }
    }
}

impl std::str::FromStr for SimulationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "swmm" => Ok(SimulationType::Swmm),
            "epanet" => Ok(SimulationType::Epanet),
            // The wire form uses an underscore; accept the flag spelling too.
            "hec_ras" | "hec-ras" => Ok(SimulationType::HecRas),
            _ => Err(format!(
                "Invalid simulation type: {}. Valid values are: swmm, epanet, hec-ras",
                s
            )),
        }
    }
}

impl SimulationType {
    /// Upper-case engine name for human output ("SWMM", "EPANET", "HEC_RAS").
    pub fn engine_name(&self) -> String {
        self.to_string().to_uppercase()
    }
}

/// Lifecycle state of a simulation.
///
/// The server may grow new states; unknown strings land in `Other` so a poll
/// loop in flight never aborts on deserialization. `Other` is non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SimulationStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
    Other(String),
}

impl SimulationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SimulationStatus::Completed | SimulationStatus::Failed
        )
    }
}

impl From<String> for SimulationStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => SimulationStatus::Pending,
            "running" => SimulationStatus::Running,
            "completed" => SimulationStatus::Completed,
            "failed" => SimulationStatus::Failed,
            _ => SimulationStatus::Other(s),
        }
    }
}

impl From<SimulationStatus> for String {
    fn from(status: SimulationStatus) -> Self {
        status.to_string()
    }
}

impl std::fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationStatus::Pending => write!(f, "pending"),
            SimulationStatus::Running => write!(f, "running"),
            SimulationStatus::Completed => write!(f, "completed"),
            SimulationStatus::Failed => write!(f, "failed"),
            SimulationStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A simulation record as returned by `GET /simulations/{id}`.
///
/// Timestamps are RFC 3339 strings; they are kept raw here and parsed
/// leniently only for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub id: String,
    #[serde(rename = "type")]
    pub sim_type: SimulationType,
    pub status: SimulationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Engine version reported by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
    /// Failure message from the engine, surfaced verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One engine log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// Envelope for `GET /simulations/{id}/logs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<LogEntry>,
}

/// Kind of result artifact. Open set; the server may add kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileKind {
    Report,
    Output,
    Log,
    Input,
    Other(String),
}

impl From<String> for FileKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "report" => FileKind::Report,
            "output" => FileKind::Output,
            "log" => FileKind::Log,
            "input" => FileKind::Input,
            _ => FileKind::Other(s),
        }
    }
}

impl From<FileKind> for String {
    fn from(kind: FileKind) -> Self {
        kind.to_string()
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::Report => write!(f, "report"),
            FileKind::Output => write!(f, "output"),
            FileKind::Log => write!(f, "log"),
            FileKind::Input => write!(f, "input"),
            FileKind::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A result artifact entry from `GET /simulations/{id}/files`.
///
/// `url` is absolute and may point at a different host than the API
/// (object storage); artifacts are fetched without the bearer header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationFile {
    #[serde(rename = "type")]
    pub kind: FileKind,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl SimulationFile {
    /// Last path segment of the artifact URL, used as the local file name.
    pub fn file_name(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }
}

/// JSON body for `POST /simulations` when the input is a remote URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSimulationRequest {
    #[serde(rename = "type")]
    pub sim_type: SimulationType,
    pub input_file_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}
