//! CLI subcommand definitions and handlers.
//!
//! Uses clap derive to define the subcommand hierarchy:
//! - `serve` (default) -- start the MCP server
//! - `tools` -- print the advertised tool definitions
//! - `call <tool> [json]` -- run one tool against the configured workspace
//! - `config show|path` -- inspect configuration
//! - `status` -- query a running instance's health endpoint
//! - `version` -- print build/version info

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::{self, Config, DEFAULT_PORT};
use crate::logging;
use crate::server;
use crate::slack::{SafeSearchPolicy, SlackApi, SlackClient, SlackScope};
use crate::tools::slack::SlackToolContext;
use crate::tools::{create_slack_registry, ExecutionContext, ToolExecutor, ToolFailure};

/// MCP server exposing Slack workspace operations as tools.
#[derive(Parser, Debug)]
#[command(
    name = "slack-mcp",
    version = env!("CARGO_PKG_VERSION"),
    about = "MCP tool server for Slack workspaces"
)]
pub struct Cli {
    /// Config file (default: $SLACK_MCP_CONFIG or <config dir>/slack-mcp/config.json5).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the MCP server (default when no subcommand is given).
    Serve,

    /// Print the tool definitions as JSON.
    Tools,

    /// Run a single tool and print its result.
    Call {
        /// Tool name, e.g. "slack_list_channels".
        tool: String,

        /// Arguments as a JSON object (default: {}).
        args: Option<String>,
    },

    /// Inspect configuration.
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Query a running instance for health information.
    Status {
        /// Port of the running instance (default: from config or 8000).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host of the running instance.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Print version, build date, and git commit information.
    Version,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the fully loaded configuration (secrets redacted) as JSON.
    Show,

    /// Print the resolved configuration file path.
    Path,
}

/// Secrets that should be redacted when printing config.
const SECRET_KEYS: &[&str] = &["token", "secret", "password"];

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Dispatch a parsed command line.
pub async fn run(cli: Cli) -> CliResult {
    let path = cli.config.as_deref();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => handle_serve(path).await,
        Command::Tools => handle_tools(path),
        Command::Call { tool, args } => handle_call(path, &tool, args.as_deref()).await,
        Command::Config(ConfigCommand::Show) => handle_config_show(path),
        Command::Config(ConfigCommand::Path) => {
            handle_config_path(path);
            Ok(())
        }
        Command::Status { host, port } => handle_status(path, &host, port).await,
        Command::Version => {
            handle_version();
            Ok(())
        }
    }
}

/// Build the tool executor: two scoped clients, the safe-search policy,
/// and the Slack tool registry. Fails if either token is missing.
pub fn build_executor(config: &Config) -> Result<ToolExecutor, Box<dyn std::error::Error>> {
    let credentials = config.validate()?;

    let mut bot = SlackClient::new(SlackScope::Bot, credentials.bot_token)?;
    let mut user = SlackClient::new(SlackScope::User, credentials.user_token)?;
    if let Some(base_url) = config.slack.api_base_url.as_deref() {
        bot = bot.with_base_url(base_url);
        user = user.with_base_url(base_url);
    }

    let context = SlackToolContext::new(
        Arc::new(bot) as Arc<dyn SlackApi>,
        Arc::new(user) as Arc<dyn SlackApi>,
        SafeSearchPolicy::new(config.slack.safe_search),
    );
    let registry = create_slack_registry(Arc::new(context));
    Ok(ToolExecutor::new(Arc::new(registry)))
}

/// Run the `serve` subcommand.
pub async fn handle_serve(path: Option<&Path>) -> CliResult {
    let cfg = config::load_config(path)?;
    logging::init_logging(&cfg.logging)?;

    let executor = build_executor(&cfg)?;
    if cfg.slack.safe_search {
        info!("Safe search enabled: private channels and direct messages are excluded from search results");
    } else {
        info!("Safe search disabled: search results may include private channels and direct messages");
    }

    server::serve(&cfg.server, Arc::new(executor)).await?;
    Ok(())
}

/// Run the `tools` subcommand.
pub fn handle_tools(path: Option<&Path>) -> CliResult {
    let cfg = config::load_config(path)?;
    let executor = build_executor(&cfg)?;
    println!("{}", serde_json::to_string_pretty(&executor.list_tools())?);
    Ok(())
}

/// Run the `call <tool> [json]` subcommand.
pub async fn handle_call(path: Option<&Path>, tool: &str, raw_args: Option<&str>) -> CliResult {
    let cfg = config::load_config(path)?;
    // best effort; a second subscriber in the same process is harmless here
    if let Err(e) = logging::init_logging(&cfg.logging) {
        eprintln!("warning: {e}");
    }

    let args = parse_args(raw_args)?;
    let executor = build_executor(&cfg)?;

    match executor.execute(tool, args, &ExecutionContext::generate()).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(err) => {
            let failure = ToolFailure::from(&err);
            println!("{}", serde_json::to_string_pretty(&failure.to_json())?);
            Err(err.into())
        }
    }
}

/// Run the `config show` subcommand.
pub fn handle_config_show(path: Option<&Path>) -> CliResult {
    let cfg = config::load_config(path)?;
    let redacted = redact_secrets(serde_json::to_value(&cfg)?);
    println!("{}", serde_json::to_string_pretty(&redacted)?);
    Ok(())
}

/// Run the `config path` subcommand.
pub fn handle_config_path(path: Option<&Path>) {
    let resolved = path.map(Path::to_path_buf).unwrap_or_else(config::get_config_path);
    println!("{}", resolved.display());
}

/// Run the `status` subcommand -- connect to a running instance's health endpoint.
pub async fn handle_status(path: Option<&Path>, host: &str, port: Option<u16>) -> CliResult {
    let port = resolve_port(path, port);
    let url = format!("http://{}:{}/health", host, port);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()?;

    let response = match client.get(&url).send().await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Could not connect to slack-mcp at {}:{}", host, port);
            eprintln!("  Error: {}", e);
            eprintln!();
            eprintln!("Is the server running? Start it with: slack-mcp serve");
            return Err(e.into());
        }
    };

    if !response.status().is_success() {
        let status = response.status();
        return Err(format!(
            "Health endpoint returned HTTP {}: {}",
            status,
            response.text().await.unwrap_or_default()
        )
        .into());
    }

    let body: Value = response.json().await?;
    println!("Slack MCP server status");
    println!("=======================");
    if let Some(version) = body.get("version").and_then(|v| v.as_str()) {
        println!("  Version:  {}", version);
    }
    println!("  Address:  {}:{}", host, port);
    if let Some(status) = body.get("status").and_then(|v| v.as_str()) {
        println!("  Status:   {}", status);
    }
    Ok(())
}

/// Run the `version` subcommand.
pub fn handle_version() {
    println!("slack-mcp {}", env!("CARGO_PKG_VERSION"));
    println!("  Build date: {}", env!("SLACK_MCP_BUILD_DATE"));
    println!("  Git commit: {}", env!("SLACK_MCP_GIT_HASH"));
    println!(
        "  Platform:   {} ({})",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Tool arguments from the command line; absent means `{}`.
fn parse_args(raw: Option<&str>) -> Result<Value, Box<dyn std::error::Error>> {
    let Some(raw) = raw else {
        return Ok(Value::Object(Default::default()));
    };
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err("tool arguments must be a JSON object".into());
    }
    Ok(value)
}

/// Redact known secret keys in a JSON value (recursive).
fn redact_secrets(mut value: Value) -> Value {
    match &mut value {
        Value::Object(map) => {
            let keys: Vec<String> = map.keys().cloned().collect();
            for key in keys {
                let lower = key.to_lowercase();
                if SECRET_KEYS.iter().any(|s| lower.contains(s)) {
                    map.insert(key, Value::String("[REDACTED]".to_string()));
                } else if let Some(child) = map.remove(&key) {
                    map.insert(key, redact_secrets(child));
                }
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                *item = redact_secrets(item.take());
            }
        }
        _ => {}
    }
    value
}

/// Resolve the port to use for connecting to a running instance.
/// Tries (in order): explicit flag, config value, DEFAULT_PORT.
fn resolve_port(path: Option<&Path>, explicit: Option<u16>) -> u16 {
    if let Some(p) = explicit {
        return p;
    }
    config::load_config(path)
        .map(|cfg| cfg.server.port)
        .unwrap_or(DEFAULT_PORT)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
