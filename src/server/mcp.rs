//! MCP JSON-RPC dispatch
//!
//! Request parsing is kept pure so it can be exercised without a server.
//! [`handle_message`] maps one parsed request onto the tool executor and
//! returns the response body, or `None` for notifications.

use serde_json::{json, Value};
use tracing::debug;

use crate::tools::{ExecutionContext, ToolError, ToolExecutor, ToolFailure};

/// Protocol revision advertised when the client does not name one
pub const PROTOCOL_VERSION: &str = "2025-03-26";

pub const SERVER_NAME: &str = "slack-mcp-server";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

/// A well-formed JSON-RPC 2.0 request or notification.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

impl RpcRequest {
    /// Requests without an id (or with a null id) are notifications.
    pub fn expects_response(&self) -> bool {
        !matches!(self.id, None | Some(Value::Null))
    }
}

/// A request that could not be accepted, ready to be sent back.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcFailure {
    pub id: Option<Value>,
    pub code: i64,
    pub message: String,
}

impl RpcFailure {
    fn new(id: Option<Value>, code: i64, message: impl Into<String>) -> Self {
        Self {
            id,
            code,
            message: message.into(),
        }
    }

    pub fn to_response(&self) -> Value {
        rpc_error(self.id.clone(), self.code, &self.message)
    }
}

pub fn ok_result(id: Option<Value>, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

pub fn rpc_error(id: Option<Value>, code: i64, message: &str) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
}

/// Decode a raw request body. Batches are not supported.
pub fn parse_request(raw: &[u8]) -> Result<RpcRequest, RpcFailure> {
    let body: Value = serde_json::from_slice(raw)
        .map_err(|e| RpcFailure::new(None, PARSE_ERROR, format!("Parse error: {e}")))?;

    let Some(obj) = body.as_object() else {
        return Err(RpcFailure::new(
            None,
            INVALID_REQUEST,
            "Invalid Request: expected a JSON object",
        ));
    };
    let id = obj.get("id").cloned();

    if let Some(version) = obj.get("jsonrpc") {
        if version.as_str() != Some("2.0") {
            return Err(RpcFailure::new(
                id,
                INVALID_REQUEST,
                "Invalid Request: jsonrpc must be \"2.0\"",
            ));
        }
    }

    let Some(method) = obj.get("method").and_then(|m| m.as_str()) else {
        return Err(RpcFailure::new(
            id,
            INVALID_REQUEST,
            "Invalid Request: method must be a string",
        ));
    };

    Ok(RpcRequest {
        id,
        method: method.to_string(),
        params: obj.get("params").cloned(),
    })
}

/// Parse and dispatch one request body.
pub async fn handle_raw(executor: &ToolExecutor, raw: &[u8]) -> Option<Value> {
    match parse_request(raw) {
        Ok(request) => handle_message(executor, request).await,
        Err(failure) => Some(failure.to_response()),
    }
}

pub async fn handle_message(executor: &ToolExecutor, request: RpcRequest) -> Option<Value> {
    if !request.expects_response() {
        debug!(method = %request.method, "notification received");
        return None;
    }

    let RpcRequest { id, method, params } = request;
    let response = match method.as_str() {
        "initialize" => {
            let protocol_version = params
                .as_ref()
                .and_then(|p| p.get("protocolVersion"))
                .and_then(|v| v.as_str())
                .unwrap_or(PROTOCOL_VERSION);
            ok_result(
                id,
                json!({
                    "protocolVersion": protocol_version,
                    "capabilities": { "tools": { "listChanged": false } },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            )
        }
        "ping" => ok_result(id, json!({})),
        "tools/list" => ok_result(id, json!({ "tools": executor.list_tools() })),
        "tools/call" => call_tool(executor, id, params).await,
        other => rpc_error(id, METHOD_NOT_FOUND, &format!("Method not found: {other}")),
    };
    Some(response)
}

async fn call_tool(executor: &ToolExecutor, id: Option<Value>, params: Option<Value>) -> Value {
    let params = params.unwrap_or_else(|| json!({}));
    let Some(name) = params.get("name").and_then(|n| n.as_str()) else {
        return rpc_error(id, INVALID_PARAMS, "Invalid params: missing tool name");
    };
    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    let context = ExecutionContext::generate();
    match executor.execute(name, arguments, &context).await {
        Ok(output) => ok_result(id, success_content(output)),
        Err(ToolError::NotFound(name)) => {
            rpc_error(id, INVALID_PARAMS, &format!("Unknown tool: {name}"))
        }
        Err(err) => ok_result(
            id,
            json!({
                "content": [{ "type": "text", "text": err.to_string() }],
                "structuredContent": ToolFailure::from(&err).to_json(),
                "isError": true
            }),
        ),
    }
}

/// Strings go out as-is; anything else is pretty JSON text, with objects
/// also attached as structured content.
fn success_content(output: Value) -> Value {
    let text = match &output {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    };

    let mut result = json!({
        "content": [{ "type": "text", "text": text }],
        "isError": false
    });
    if output.is_object() {
        result["structuredContent"] = output;
    }
    result
}
