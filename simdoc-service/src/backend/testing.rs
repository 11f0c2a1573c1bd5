//! In-process fake search backend for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use super::BackendClient;
use crate::config::BackendConfig;

#[derive(Clone)]
enum Behavior {
    Json,
    Failing(StatusCode, String),
    Slow(Duration),
    Garbage,
}

/// Canned responses served on the backend's REST paths
#[derive(Clone)]
pub(crate) struct FakeBackend {
    behavior: Behavior,
    health: Value,
    resolve: Value,
    search: Value,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            behavior: Behavior::Json,
            health: json!({ "status": "ok", "simulators_available": ["cantera", "pybamm"] }),
            resolve: json!({
                "matches": [{
                    "id": "cantera/cantera",
                    "name": "Cantera",
                    "description": "Chemical kinetics, thermodynamics, and transport",
                    "trust_score": 9,
                    "versions": ["3.0", "2.6"],
                    "default_version": "3.0"
                }]
            }),
            search: json!({
                "query": "flame",
                "snippets": [{
                    "title": "Freely propagating flame",
                    "source_url": "https://cantera.org/examples/flame.html",
                    "description": "Adiabatic flame speed of methane/air",
                    "relevance_score": 0.91,
                    "language": "python",
                    "code": "import cantera as ct"
                }],
                "total_tokens": 420
            }),
        }
    }
}

impl FakeBackend {
    pub fn failing(status: StatusCode, message: &str) -> Self {
        Self {
            behavior: Behavior::Failing(status, message.to_string()),
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            behavior: Behavior::Slow(delay),
            ..Default::default()
        }
    }

    pub fn garbage() -> Self {
        Self {
            behavior: Behavior::Garbage,
            ..Default::default()
        }
    }

    pub fn with_resolve(mut self, body: Value) -> Self {
        self.resolve = body;
        self
    }

    pub fn with_search(mut self, body: Value) -> Self {
        self.search = body;
        self
    }

    /// Serve on an ephemeral port and return a client pointed at it
    pub async fn spawn(self) -> (Arc<BackendClient>, Recorded) {
        let recorded = Recorded {
            base_url: String::new(),
            resolves: Arc::new(Mutex::new(Vec::new())),
            searches: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        };
        let state = Arc::new(FakeState {
            backend: self,
            recorded: recorded.clone(),
        });

        let app = Router::new()
            .route("/api/v1/health", get(health_handler))
            .route("/api/v1/resolve", post(resolve_handler))
            .route("/api/v1/search", post(search_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let recorded = Recorded {
            base_url: format!("http://{}", addr),
            ..recorded
        };
        (client_for(&recorded.base_url, 5), recorded)
    }
}

/// Request bodies the fake backend received
#[derive(Clone)]
pub(crate) struct Recorded {
    base_url: String,
    resolves: Arc<Mutex<Vec<Value>>>,
    searches: Arc<Mutex<Vec<Value>>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl Recorded {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn resolves(&self) -> Vec<Value> {
        self.resolves.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<Value> {
        self.searches.lock().unwrap().clone()
    }

    /// Most requests the fake was handling at the same moment
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

struct FakeState {
    backend: FakeBackend,
    recorded: Recorded,
}

async fn respond(state: &FakeState, body: &Value) -> Response {
    let recorded = &state.recorded;
    let now = recorded.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    recorded.peak_in_flight.fetch_max(now, Ordering::SeqCst);

    let response = match &state.backend.behavior {
        Behavior::Json => Json(body.clone()).into_response(),
        Behavior::Failing(status, message) => (*status, message.clone()).into_response(),
        Behavior::Slow(delay) => {
            tokio::time::sleep(*delay).await;
            Json(body.clone()).into_response()
        }
        Behavior::Garbage => (StatusCode::OK, "<html>not json</html>").into_response(),
    };

    recorded.in_flight.fetch_sub(1, Ordering::SeqCst);
    response
}

async fn health_handler(State(state): State<Arc<FakeState>>) -> Response {
    respond(&state, &state.backend.health).await
}

async fn resolve_handler(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Response {
    state.recorded.resolves.lock().unwrap().push(body);
    respond(&state, &state.backend.resolve).await
}

async fn search_handler(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Response {
    state.recorded.searches.lock().unwrap().push(body);
    respond(&state, &state.backend.search).await
}

pub(crate) fn client_for(base_url: &str, timeout_secs: u64) -> Arc<BackendClient> {
    let config = BackendConfig {
        base_url: base_url.to_string(),
        timeout_secs,
        ..Default::default()
    };
    Arc::new(BackendClient::new(&config).unwrap())
}

/// Address of a port nothing is listening on
pub(crate) async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
