//! MCP tool call handler.
//!
//! Backend failures and bad arguments never become JSON-RPC errors here:
//! they are returned as `Error: <message>` tool text the agent can read and
//! act on.

use std::str::FromStr;

use tracing::error;

use super::{McpError, McpState};
use crate::error::{ServiceError, ServiceResult};
use crate::format::{format_resolution, format_snippets};
use crate::models::DEFAULT_TOKEN_BUDGET;
use crate::tools::ToolName;

/// Handle tools/call request
pub async fn handle_tool_call(
    state: &McpState,
    params: Option<serde_json::Value>,
) -> Result<serde_json::Value, McpError> {
    let params = params.ok_or_else(|| McpError::invalid_params("Missing params"))?;

    let name = params
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpError::invalid_params("Missing tool name"))?;

    let tool = ToolName::from_str(name)
        .map_err(|_| McpError::invalid_params(format!("Unknown tool: {}", name)))?;

    let arguments = params
        .get("arguments")
        .cloned()
        .unwrap_or(serde_json::json!({}));

    let text = match tool {
        ToolName::ResolveSimulatorId => execute_resolve_simulator_id(state, &arguments).await,
        ToolName::GetSimulatorDocs => execute_get_simulator_docs(state, &arguments).await,
    };

    Ok(serde_json::json!({
        "content": [{
            "type": "text",
            "text": text
        }]
    }))
}

async fn execute_resolve_simulator_id(state: &McpState, arguments: &serde_json::Value) -> String {
    let outcome: ServiceResult<String> = async {
        let name = required_str(arguments, "name")?;
        let result = state.resolver.resolve_simulator(name).await?;
        Ok::<_, ServiceError>(format_resolution(&result))
    }
    .await;

    outcome.unwrap_or_else(|e| {
        let name = arguments.get("name").and_then(|v| v.as_str()).unwrap_or("");
        error!(
            name = %name,
            status = ?e.status(),
            transport = e.is_transport(),
            error = %e,
            "Error resolving simulator"
        );
        e.tool_message()
    })
}

async fn execute_get_simulator_docs(state: &McpState, arguments: &serde_json::Value) -> String {
    let outcome: ServiceResult<String> = async {
        let simulator_id = required_str(arguments, "simulator_id")?;
        let topic = optional_str(arguments, "topic")?;
        let tokens = token_budget(arguments)?;

        let batch = state
            .retriever
            .get_docs(simulator_id, topic, tokens)
            .await?;
        Ok::<_, ServiceError>(format_snippets(&batch))
    }
    .await;

    outcome.unwrap_or_else(|e| {
        let simulator_id = arguments
            .get("simulator_id")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        error!(
            simulator_id = %simulator_id,
            status = ?e.status(),
            transport = e.is_transport(),
            error = %e,
            "Error fetching docs"
        );
        e.tool_message()
    })
}

fn required_str<'a>(arguments: &'a serde_json::Value, key: &str) -> ServiceResult<&'a str> {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ServiceError::invalid_request(format!("'{}' must be a string", key)))
}

fn optional_str<'a>(arguments: &'a serde_json::Value, key: &str) -> ServiceResult<Option<&'a str>> {
    match arguments.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ServiceError::invalid_request(format!(
            "'{}' must be a string",
            key
        ))),
    }
}

fn token_budget(arguments: &serde_json::Value) -> ServiceResult<u64> {
    match arguments.get("tokens") {
        None | Some(serde_json::Value::Null) => Ok(DEFAULT_TOKEN_BUDGET),
        Some(value) => value
            .as_u64()
            .filter(|&t| t > 0)
            .ok_or_else(|| ServiceError::invalid_request("'tokens' must be a positive integer")),
    }
}
