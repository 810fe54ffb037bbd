//! HTTP routes

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::mcp::{self, SERVER_NAME};
use super::ServerState;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/mcp", post(mcp_handler))
        .with_state(state)
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: SERVER_NAME.to_string(),
    })
}

/// `index.html` from the static directory when there is one, otherwise a
/// short status message.
async fn root_handler(State(state): State<ServerState>) -> Response {
    if let Some(dir) = state.static_dir.as_deref() {
        let index = dir.join("index.html");
        match tokio::fs::read_to_string(&index).await {
            Ok(page) => return Html(page).into_response(),
            Err(e) => tracing::debug!(path = %index.display(), error = %e, "no landing page"),
        }
    }

    Json(json!({
        "message": "Slack MCP Server is running",
        "version": env!("CARGO_PKG_VERSION")
    }))
    .into_response()
}

/// JSON-RPC endpoint. Notifications are acknowledged with 202 and no body.
async fn mcp_handler(State(state): State<ServerState>, body: Bytes) -> Response {
    match mcp::handle_raw(&state.executor, &body).await {
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
