//! In-process mock of the WRM API for integration tests.
//!
//! The real server is an external third party; tests run against this axum
//! app instead, serving canned JSON over a random local port. Test code
//! seeds simulations, scripts status transitions, and inspects recorded
//! requests through `MockState`.

use std::collections::{HashMap, VecDeque};
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};

use axum::extract::{FromRequest, Multipart, Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use wrapi::client::Configuration;

pub const TEST_TOKEN: &str = "test-token";

#[derive(Default)]
pub struct Inner {
    next_id: u32,
    /// Simulations in insertion order; list endpoints reverse this.
    pub simulations: Vec<Value>,
    /// Log entries per simulation, newest first.
    pub logs: HashMap<String, Vec<Value>>,
    pub files: HashMap<String, Vec<Value>>,
    /// Statuses popped one per `GET /simulations/{id}`, front first.
    pub status_script: HashMap<String, VecDeque<String>>,
    /// Artifact bodies served under /artifacts/{name}.
    pub artifacts: HashMap<String, Vec<u8>>,
    /// Authorization header values seen on API requests.
    pub auth_headers: Vec<Option<String>>,
    /// (file_name, size) of multipart uploads received.
    pub uploads: Vec<(String, usize)>,
}

#[derive(Clone, Default)]
pub struct MockState(pub Arc<Mutex<Inner>>);

pub struct MockServer {
    pub base_url: String,
    pub state: MockState,
    _rt: tokio::runtime::Runtime,
}

impl MockServer {
    pub fn start() -> Self {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("failed to build tokio runtime");
        let state = MockState::default();
        let app = router(state.clone());
        let listener = rt
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .expect("failed to bind mock server");
        let addr = listener.local_addr().expect("listener has an address");
        rt.spawn(async move {
            axum::serve(listener, app).await.expect("mock server failed");
        });
        Self {
            base_url: format!("http://{}", addr),
            state,
            _rt: rt,
        }
    }

    /// Client configuration pointed at this server with the test token.
    pub fn configuration(&self) -> Configuration {
        let mut config = Configuration::new();
        config.base_path = self.base_url.clone();
        config.bearer_access_token = Some(TEST_TOKEN.to_string());
        config
    }

    /// Insert a simulation record directly; returns its id.
    pub fn seed_simulation(&self, sim_type: &str, status: &str, label: &str) -> String {
        let mut inner = self.state.0.lock().unwrap();
        inner.next_id += 1;
        let id = format!("00000000-0000-0000-0000-{:012}", inner.next_id);
        inner.simulations.push(json!({
            "id": id,
            "type": sim_type,
            "status": status,
            "label": label,
            "version": "5.2.4",
            "created_at": "2025-05-01T12:00:00Z",
        }));
        id
    }

    /// Queue statuses returned by successive `GET /simulations/{id}` calls.
    pub fn script_statuses(&self, id: &str, statuses: &[&str]) {
        let mut inner = self.state.0.lock().unwrap();
        inner
            .status_script
            .insert(id.to_string(), statuses.iter().map(|s| s.to_string()).collect());
    }

    pub fn add_log(&self, id: &str, timestamp: &str, message: &str) {
        let mut inner = self.state.0.lock().unwrap();
        let logs = inner.logs.entry(id.to_string()).or_default();
        // Newest first, as the real API serves them.
        logs.insert(0, json!({"timestamp": timestamp, "message": message}));
    }

    pub fn add_file(&self, id: &str, kind: &str, name: &str, body: &[u8]) {
        let url = format!("{}/artifacts/{}", self.base_url, name);
        let mut inner = self.state.0.lock().unwrap();
        inner.artifacts.insert(name.to_string(), body.to_vec());
        inner.files.entry(id.to_string()).or_default().push(json!({
            "type": kind,
            "url": url,
            "size": body.len(),
        }));
    }

    pub fn last_auth_header(&self) -> Option<String> {
        let inner = self.state.0.lock().unwrap();
        inner.auth_headers.last().cloned().flatten()
    }
}

fn router(state: MockState) -> Router {
    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .route("/simulations", get(list_simulations).post(create_simulation))
        .route("/simulations/{id}", get(get_simulation))
        .route("/simulations/{id}/logs", get(get_logs))
        .route("/simulations/{id}/files", get(get_files))
        .route("/artifacts/{name}", get(get_artifact))
        .with_state(state)
}

fn record_auth(state: &MockState, headers: &HeaderMap) -> bool {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let authorized = matches!(&auth, Some(v) if v == &format!("Bearer {}", TEST_TOKEN));
    state.0.lock().unwrap().auth_headers.push(auth);
    authorized
}

async fn create_simulation(
    State(state): State<MockState>,
    request: Request,
) -> impl IntoResponse {
    if !record_auth(&state, request.headers()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"})));
    }
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let (sim_type, label) = if content_type.starts_with("multipart/form-data") {
        let mut multipart = match Multipart::from_request(request, &()).await {
            Ok(multipart) => multipart,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "bad multipart body"})),
                );
            }
        };
        let mut sim_type = None;
        let mut label = None;
        while let Ok(Some(field)) = multipart.next_field().await {
            match field.name().unwrap_or("") {
                "type" => sim_type = field.text().await.ok(),
                "label" => label = field.text().await.ok(),
                "file" => {
                    let name = field.file_name().unwrap_or("").to_string();
                    let size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
                    state.0.lock().unwrap().uploads.push((name, size));
                }
                _ => {}
            }
        }
        (sim_type, label)
    } else {
        let bytes = match axum::body::to_bytes(request.into_body(), 1024 * 1024).await {
            Ok(bytes) => bytes,
            Err(_) => {
                return (StatusCode::BAD_REQUEST, Json(json!({"error": "bad body"})));
            }
        };
        let body: Value = match serde_json::from_slice(&bytes) {
            Ok(body) => body,
            Err(_) => {
                return (StatusCode::BAD_REQUEST, Json(json!({"error": "bad json"})));
            }
        };
        (
            body.get("type").and_then(Value::as_str).map(str::to_string),
            body.get("label").and_then(Value::as_str).map(str::to_string),
        )
    };

    let Some(sim_type) = sim_type else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "missing simulation type"})),
        );
    };

    let mut inner = state.0.lock().unwrap();
    inner.next_id += 1;
    let id = format!("00000000-0000-0000-0000-{:012}", inner.next_id);
    let simulation = json!({
        "id": id,
        "type": sim_type,
        "status": "pending",
        "label": label,
        "created_at": "2025-05-01T12:00:00Z",
    });
    inner.simulations.push(simulation.clone());
    (StatusCode::CREATED, Json(simulation))
}

async fn list_simulations(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if !record_auth(&state, &headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"})));
    }
    let inner = state.0.lock().unwrap();
    let mut simulations: Vec<Value> = inner.simulations.iter().rev().cloned().collect();
    if let Some(filter) = params.get("type") {
        simulations.retain(|s| s.get("type").and_then(Value::as_str) == Some(filter));
    }
    (StatusCode::OK, Json(Value::Array(simulations)))
}

async fn get_simulation(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if !record_auth(&state, &headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"})));
    }
    let mut inner = state.0.lock().unwrap();
    let next_status = inner
        .status_script
        .get_mut(&id)
        .and_then(|script| script.pop_front());
    let Some(simulation) = inner
        .simulations
        .iter_mut()
        .find(|s| s.get("id").and_then(Value::as_str) == Some(id.as_str()))
    else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("simulation not found: {}", id)})),
        );
    };
    if let Some(status) = next_status {
        simulation["status"] = Value::String(status);
    }
    (StatusCode::OK, Json(simulation.clone()))
}

async fn get_logs(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if !record_auth(&state, &headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"})));
    }
    let limit: usize = params
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(50);
    let inner = state.0.lock().unwrap();
    let logs: Vec<Value> = inner
        .logs
        .get(&id)
        .map(|logs| logs.iter().take(limit).cloned().collect())
        .unwrap_or_default();
    (StatusCode::OK, Json(json!({"logs": logs})))
}

async fn get_files(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if !record_auth(&state, &headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"})));
    }
    let inner = state.0.lock().unwrap();
    let files = inner.files.get(&id).cloned().unwrap_or_default();
    (StatusCode::OK, Json(Value::Array(files)))
}

async fn get_artifact(
    State(state): State<MockState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let inner = state.0.lock().unwrap();
    match inner.artifacts.get(&name) {
        Some(body) => (StatusCode::OK, body.clone()),
        None => (StatusCode::NOT_FOUND, Vec::new()),
    }
}

/// Run the wrapi binary against a mock server with an isolated config
/// environment, returning the raw process output.
#[allow(dead_code)]
pub fn run_cli(server: &MockServer, home: &std::path::Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wrapi"))
        .args(args)
        .current_dir(home)
        .env("WRAPI_URL", &server.base_url)
        .env("WRAPI_TOKEN", TEST_TOKEN)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .output()
        .expect("failed to run wrapi binary")
}

/// Run the binary with `-f json` prepended and parse stdout as JSON.
#[allow(dead_code)]
pub fn run_cli_with_json(
    server: &MockServer,
    home: &std::path::Path,
    args: &[&str],
) -> Result<Value, String> {
    let mut full_args = vec!["-f", "json"];
    full_args.extend_from_slice(args);
    let output = run_cli(server, home, &full_args);
    if !output.status.success() {
        return Err(format!(
            "wrapi exited with {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    serde_json::from_slice(&output.stdout)
        .map_err(|e| format!("stdout is not JSON ({}): {}", e, String::from_utf8_lossy(&output.stdout)))
}
