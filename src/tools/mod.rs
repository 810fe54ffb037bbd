//! Tool Calling Framework
//!
//! Registry and execution engine for the agent-callable tools. Every tool
//! takes a JSON argument object and returns a JSON result or a [`ToolError`].

pub mod args;
pub mod executor;
pub mod registry;
pub mod slack;
pub mod types;

pub use executor::*;
pub use registry::*;
pub use types::*;

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::slack::SlackError;

/// Errors that can occur when working with tools
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Upstream code or fault message, verbatim
    #[error("Slack API error: {0}")]
    Upstream(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::NotFound(_) => "not_found",
            ToolError::InvalidArgument(_) => "invalid_argument",
            ToolError::Upstream(_) => "upstream_error",
            ToolError::Serialization(_) => "serialization_error",
        }
    }

    /// The message without the kind prefix
    pub fn message(&self) -> String {
        match self {
            ToolError::NotFound(name) => name.clone(),
            ToolError::InvalidArgument(msg) | ToolError::Upstream(msg) => msg.clone(),
            ToolError::Serialization(err) => err.to_string(),
        }
    }
}

impl From<SlackError> for ToolError {
    fn from(err: SlackError) -> Self {
        ToolError::Upstream(err.to_string())
    }
}

/// Result type for tool operations
pub type Result<T> = std::result::Result<T, ToolError>;

/// Boxed future for tool execution
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// A tool that can be called by AI agents
pub trait Tool: Send + Sync {
    /// Get the tool name
    fn name(&self) -> &str;

    /// Get the tool description
    fn description(&self) -> &str;

    /// Get the JSON schema for parameters
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given parameters
    fn execute(&self, params: Value) -> BoxFuture<'_, Result<Value>>;
}

/// Build a registry holding every Slack tool bound to `context`
pub fn create_slack_registry(context: Arc<slack::SlackToolContext>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for tool in slack::slack_tools(context) {
        registry.register(tool);
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(ToolError::NotFound("x".into()).kind(), "not_found");
        assert_eq!(ToolError::InvalidArgument("x".into()).kind(), "invalid_argument");
        assert_eq!(ToolError::Upstream("x".into()).kind(), "upstream_error");
    }

    #[test]
    fn test_upstream_error_keeps_code_verbatim() {
        let err: ToolError = SlackError::Api("not_in_channel".to_string()).into();
        assert_eq!(err.kind(), "upstream_error");
        assert_eq!(err.message(), "not_in_channel");
        assert_eq!(err.to_string(), "Slack API error: not_in_channel");
    }
}
