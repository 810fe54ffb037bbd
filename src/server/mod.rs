//! Server module
//!
//! MCP over HTTP: a single JSON-RPC endpoint plus health and landing routes.

pub mod http;
pub mod mcp;

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::ServerSettings;
use crate::tools::ToolExecutor;

pub use http::router;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Shared handler state
#[derive(Clone)]
pub struct ServerState {
    pub executor: Arc<ToolExecutor>,
    pub static_dir: Option<PathBuf>,
}

impl ServerState {
    pub fn new(executor: Arc<ToolExecutor>, static_dir: Option<PathBuf>) -> Self {
        Self {
            executor,
            static_dir,
        }
    }
}

/// Bind and serve until Ctrl-C.
pub async fn serve(settings: &ServerSettings, executor: Arc<ToolExecutor>) -> Result<(), ServerError> {
    let address = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

    let tools = executor.registry().len();
    let app = router(ServerState::new(executor, settings.static_dir.clone()));

    info!(address = %address, tools, "Starting MCP server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
