//! MCP server: JSON-RPC dispatch shared by the SSE and stdio transports.

mod handlers;
mod sse;
mod stdio;
mod tools;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::backend::BackendClient;
use crate::resolver::SimulatorResolver;
use crate::retriever::SnippetRetriever;

pub use sse::mcp_router;
pub use stdio::serve_stdio;

pub(crate) const PROTOCOL_VERSION: &str = "2024-11-05";
pub(crate) const SERVER_NAME: &str = "simdocs";
pub(crate) const INSTRUCTIONS: &str = "SimDoc provides search capabilities for scientific \
    simulation documentation including PyBaMM, Cantera, and other simulators.";

/// MCP server state
pub struct McpState {
    pub backend: Arc<BackendClient>,
    pub resolver: SimulatorResolver,
    pub retriever: SnippetRetriever,
}

impl McpState {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self {
            resolver: SimulatorResolver::new(backend.clone()),
            retriever: SnippetRetriever::new(backend.clone()),
            backend,
        }
    }
}

/// Handle one JSON-RPC message. Notifications produce no response.
pub(crate) async fn dispatch(state: &McpState, request: McpRequest) -> Option<McpResponse> {
    debug!(method = %request.method, "MCP request received");

    let Some(id) = request.id else {
        debug!(method = %request.method, "MCP notification ignored");
        return None;
    };

    let result = match request.method.as_str() {
        "initialize" => handlers::handle_initialize(),
        "ping" => Ok(serde_json::json!({})),
        "tools/list" => handlers::handle_tools_list(),
        "tools/call" => tools::handle_tool_call(state, request.params).await,
        _ => Err(McpError::method_not_found(&request.method)),
    };

    Some(McpResponse::from_result(id, result))
}

/// Parse a raw frame, answering malformed JSON with a parse error
pub(crate) async fn dispatch_raw(state: &McpState, raw: &str) -> Option<McpResponse> {
    match serde_json::from_str::<McpRequest>(raw) {
        Ok(request) => dispatch(state, request).await,
        Err(e) => Some(McpResponse::from_result(
            serde_json::Value::Null,
            Err(McpError {
                code: -32700,
                message: format!("Parse error: {}", e),
            }),
        )),
    }
}

// MCP Protocol Types

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct McpRequest {
    #[allow(dead_code)] // Protocol marker, not validated
    #[serde(default)]
    jsonrpc: String,
    #[serde(default)]
    id: Option<serde_json::Value>,
    method: String,
    #[serde(default)]
    params: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct McpResponse {
    jsonrpc: String,
    id: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<McpError>,
}

impl McpResponse {
    fn from_result(id: serde_json::Value, result: Result<serde_json::Value, McpError>) -> Self {
        match result {
            Ok(data) => Self {
                jsonrpc: "2.0".to_string(),
                id,
                result: Some(data),
                error: None,
            },
            Err(error) => Self {
                jsonrpc: "2.0".to_string(),
                id,
                result: None,
                error: Some(error),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct McpError {
    code: i32,
    message: String,
}

impl McpError {
    fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {}", method),
        }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::FakeBackend;

    async fn state() -> McpState {
        let (client, _) = FakeBackend::default().spawn().await;
        McpState::new(client)
    }

    fn to_json(response: Option<McpResponse>) -> serde_json::Value {
        serde_json::to_value(response.expect("expected a response")).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let state = state().await;
        let response = dispatch_raw(
            &state,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        )
        .await;
        let json = to_json(response);

        assert_eq!(json["id"], 1);
        assert_eq!(json["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(json["result"]["serverInfo"]["name"], "simdocs");
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn test_notification_has_no_response() {
        let state = state().await;
        let response = dispatch_raw(
            &state,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        )
        .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let state = state().await;
        let json = to_json(
            dispatch_raw(&state, r#"{"jsonrpc":"2.0","id":"a","method":"resources/list"}"#).await,
        );
        assert_eq!(json["error"]["code"], -32601);
        assert_eq!(json["id"], "a");
    }

    #[tokio::test]
    async fn test_parse_error() {
        let state = state().await;
        let json = to_json(dispatch_raw(&state, "{not json").await);
        assert_eq!(json["error"]["code"], -32700);
        assert_eq!(json["id"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_tools_list() {
        let state = state().await;
        let json = to_json(
            dispatch_raw(&state, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await,
        );
        let names: Vec<_> = json["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["resolve_simulator_id", "get_simulator_docs"]);
    }
}
