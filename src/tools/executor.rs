//! Tool Executor
//!
//! Looks a tool up, checks the argument object against the tool's declared
//! `required` list and runs it. No timeout or retry is layered on top; the
//! upstream client owns its own timeout.

use super::{Result, Tool, ToolDefinition, ToolError, ToolRegistry};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Tool execution context
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Request ID for tracing
    pub request_id: String,
}

impl ExecutionContext {
    /// Create a context with a caller-supplied request id
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }

    /// Create a context with a fresh random request id
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }
}

/// Tool executor with validation and logging
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    /// Create a new tool executor
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Execute a tool by name with parameters
    pub async fn execute(
        &self,
        tool_name: &str,
        params: Value,
        context: &ExecutionContext,
    ) -> Result<Value> {
        let start = Instant::now();

        let tool = self
            .registry
            .get(tool_name)
            .ok_or_else(|| ToolError::NotFound(tool_name.to_string()))?;

        // A missing argument object is an empty one
        let params = if params.is_null() {
            Value::Object(Default::default())
        } else {
            params
        };
        validate_params(tool.as_ref(), &params)?;

        debug!(
            request_id = %context.request_id,
            tool = tool_name,
            "Starting tool execution"
        );

        let result = tool.execute(params).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(
                request_id = %context.request_id,
                tool = tool_name,
                elapsed_ms,
                "Tool execution completed"
            ),
            Err(e) => warn!(
                request_id = %context.request_id,
                tool = tool_name,
                elapsed_ms,
                kind = e.kind(),
                error = %e,
                "Tool execution failed"
            ),
        }
        result
    }

    /// Definitions of all available tools
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

/// Check that params is an object carrying every schema-required field
fn validate_params(tool: &dyn Tool, params: &Value) -> Result<()> {
    if !params.is_object() {
        return Err(ToolError::InvalidArgument(
            "arguments must be an object".to_string(),
        ));
    }

    let schema = tool.parameters_schema();
    if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
        for field in required.iter().filter_map(|f| f.as_str()) {
            if params.get(field).map_or(true, Value::is_null) {
                return Err(ToolError::InvalidArgument(format!(
                    "missing required parameter: {field}"
                )));
            }
        }
    }

    Ok(())
}
