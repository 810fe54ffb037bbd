//! Tool Types
//!
//! Serializable shapes shared by the registry and the protocol server.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{Tool, ToolError};

/// Tool listing entry, as advertised by `tools/list`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema for the argument object
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Describe a registered tool
    pub fn from_tool(tool: &dyn Tool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            input_schema: tool.parameters_schema(),
        }
    }
}

/// Structured error handed back to the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolFailure {
    /// Machine-readable kind (`invalid_argument`, `upstream_error`, ...)
    pub kind: String,
    /// Human-readable message; upstream codes are kept verbatim
    pub message: String,
}

impl From<&ToolError> for ToolFailure {
    fn from(err: &ToolError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.message(),
        }
    }
}

impl ToolFailure {
    pub fn to_json(&self) -> Value {
        json!({ "error": self })
    }
}
