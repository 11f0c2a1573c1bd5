//! SSE transport.
//!
//! A client opens `GET /sse` and receives an `endpoint` event naming the
//! URL to POST its JSON-RPC messages to. Responses are delivered back as
//! `message` events on that same stream.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
    routing::{get, post},
};
use dashmap::DashMap;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{McpState, dispatch_raw};

/// Responses a session may have queued before its stream is read
const SESSION_QUEUE_CAPACITY: usize = 64;

/// Shared state for the SSE endpoints
struct SseState {
    mcp: Arc<McpState>,
    sessions: DashMap<String, mpsc::Sender<String>>,
    messages_path: String,
    shutdown: CancellationToken,
}

/// Removes a session once its event stream is dropped
struct SessionGuard {
    state: Arc<SseState>,
    session_id: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.state.sessions.remove(&self.session_id);
        info!(session_id = %self.session_id, "MCP client disconnected");
    }
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    session_id: String,
}

/// Build the MCP router, nested under `base_path`
pub fn mcp_router(state: Arc<McpState>, base_path: &str, shutdown: CancellationToken) -> Router {
    let prefix = base_path.trim_end_matches('/');
    let sse_state = Arc::new(SseState {
        mcp: state,
        sessions: DashMap::new(),
        messages_path: format!("{}/messages", prefix),
        shutdown,
    });

    let routes = Router::new()
        .route("/sse", get(sse_handler))
        .route("/messages", post(message_handler))
        .route("/messages/", post(message_handler))
        .route("/health", get(health_handler))
        .with_state(sse_state);

    let routes = if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(prefix, routes)
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes.layer(TraceLayer::new_for_http()).layer(cors)
}

/// Open an event stream for a new session
async fn sse_handler(
    State(state): State<Arc<SseState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = Uuid::new_v4().simple().to_string();
    let (tx, rx) = mpsc::channel::<String>(SESSION_QUEUE_CAPACITY);
    state.sessions.insert(session_id.clone(), tx);

    info!(session_id = %session_id, "MCP client connected");

    let endpoint = format!("{}?session_id={}", state.messages_path, session_id);
    let shutdown = state.shutdown.clone();
    let guard = SessionGuard {
        state,
        session_id,
    };

    let first = stream::once(async move {
        Ok::<_, Infallible>(Event::default().event("endpoint").data(endpoint))
    });
    let messages = ReceiverStream::new(rx).map(move |message| {
        let _session = &guard;
        Ok::<_, Infallible>(Event::default().event("message").data(message))
    });

    let stream = first
        .chain(messages)
        .take_until(shutdown.cancelled_owned());

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(30)))
}

/// Accept a JSON-RPC message for a session; the reply goes out on its stream
async fn message_handler(
    State(state): State<Arc<SseState>>,
    Query(query): Query<SessionQuery>,
    body: Bytes,
) -> StatusCode {
    let Some(tx) = state
        .sessions
        .get(&query.session_id)
        .map(|entry| entry.value().clone())
    else {
        warn!(session_id = %query.session_id, "Message for unknown MCP session");
        return StatusCode::NOT_FOUND;
    };

    let raw = String::from_utf8_lossy(&body).into_owned();
    let mcp = state.mcp.clone();
    let session_id = query.session_id;

    tokio::spawn(async move {
        if let Some(response) = dispatch_raw(&mcp, &raw).await {
            match serde_json::to_string(&response) {
                Ok(json) => {
                    deliver(&tx, &session_id, json);
                }
                Err(e) => warn!(error = %e, "Failed to serialize MCP response"),
            }
        }
    });

    StatusCode::ACCEPTED
}

/// Queue a response on a session stream, dropping it if the client is not
/// keeping up
fn deliver(tx: &mpsc::Sender<String>, session_id: &str, message: String) -> bool {
    match tx.try_send(message) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            warn!(session_id = %session_id, "Session queue full, dropping response");
            false
        }
        Err(TrySendError::Closed(_)) => {
            debug!(session_id = %session_id, "Session closed before response was sent");
            false
        }
    }
}

/// Report backend health
async fn health_handler(State(state): State<Arc<SseState>>) -> Response {
    match state.mcp.backend.check_health().await {
        Ok(health) => Json(health).into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "unavailable",
                "error": e.to_string()
            })),
        )
            .into_response(),
    }
}
