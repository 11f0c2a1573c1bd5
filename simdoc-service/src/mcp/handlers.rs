//! MCP message handlers.
//!
//! Handlers for initialize and tools/list requests.

use super::{INSTRUCTIONS, McpError, PROTOCOL_VERSION, SERVER_NAME};
use crate::tools::mcp_definitions;

/// Handle initialize request
pub fn handle_initialize() -> Result<serde_json::Value, McpError> {
    Ok(serde_json::json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": false }
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        },
        "instructions": INSTRUCTIONS
    }))
}

/// Handle tools/list request
pub fn handle_tools_list() -> Result<serde_json::Value, McpError> {
    Ok(serde_json::json!({ "tools": mcp_definitions() }))
}
