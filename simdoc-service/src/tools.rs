//! Tool registry for the MCP server.
//!
//! Tool names are derived from enum variants via strum so the dispatcher and
//! the `tools/list` output cannot drift apart.

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::models::DEFAULT_TOKEN_BUDGET;

/// All tool names as an exhaustive enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ToolName {
    ResolveSimulatorId,
    GetSimulatorDocs,
}

impl ToolName {
    pub fn description(&self) -> &'static str {
        match self {
            ToolName::ResolveSimulatorId => {
                "Resolve a simulator name to a structured ID with metadata. \
                 Returns ranked matches with trust scores, versions, and descriptions. \
                 Use this before get_simulator_docs to find the correct simulator ID."
            }
            ToolName::GetSimulatorDocs => {
                "Get code snippets and documentation for a specific simulator. \
                 Returns attributed code examples with source URLs and descriptions. \
                 You must call resolve_simulator_id first to get the simulator ID."
            }
        }
    }

    pub fn input_schema(&self) -> serde_json::Value {
        match self {
            ToolName::ResolveSimulatorId => serde_json::json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Simulator name to search for (e.g., 'cantera', 'pybamm')"
                    }
                },
                "required": ["name"]
            }),
            ToolName::GetSimulatorDocs => serde_json::json!({
                "type": "object",
                "properties": {
                    "simulator_id": {
                        "type": "string",
                        "description": "Simulator ID (e.g., 'cantera/cantera', 'pybamm/PyBaMM')"
                    },
                    "topic": {
                        "type": "string",
                        "description": "Optional topic to focus the search (e.g., 'flame', 'reactor', 'battery')",
                        "default": ""
                    },
                    "tokens": {
                        "type": "integer",
                        "description": format!("Maximum tokens to return (default: {})", DEFAULT_TOKEN_BUDGET),
                        "default": DEFAULT_TOKEN_BUDGET,
                        "minimum": 1
                    }
                },
                "required": ["simulator_id"]
            }),
        }
    }

    pub fn definition(&self) -> McpToolDefinition {
        McpToolDefinition {
            name: self.to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// MCP tool definition structure (for `tools/list` output)
#[derive(Debug, Clone, Serialize)]
pub struct McpToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Definitions for every tool, in declaration order
pub fn mcp_definitions() -> Vec<McpToolDefinition> {
    ToolName::iter().map(|tool| tool.definition()).collect()
}
