//! Configuration loading
//!
//! Settings come from an optional JSON5 file, then environment variables
//! override individual keys. Both Slack tokens must be present by the time
//! [`Config::validate`] runs or the process refuses to start.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "SLACK_MCP_CONFIG";

pub const BOT_TOKEN_ENV: &str = "SLACK_BOT_TOKEN";
pub const USER_TOKEN_ENV: &str = "SLACK_USER_TOKEN";
pub const SAFE_SEARCH_ENV: &str = "SLACK_SAFE_SEARCH";
pub const HOST_ENV: &str = "SLACK_MCP_HOST";
pub const PORT_ENV: &str = "SLACK_MCP_PORT";
pub const LOG_ENV: &str = "SLACK_MCP_LOG";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("{0} is not set; both the bot token and the user token are required")]
    MissingCredential(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub slack: SlackSettings,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlackSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_token: Option<String>,
    /// Drop private channel and DM matches from message search
    pub safe_search: bool,
    /// Override for the Web API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory holding an optional `index.html` served at `/`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. `info` or `slack_mcp=debug`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// The two validated tokens.
#[derive(Clone)]
pub struct Credentials {
    pub bot_token: String,
    pub user_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("bot_token", &"[REDACTED]")
            .field("user_token", &"[REDACTED]")
            .finish()
    }
}

impl Config {
    /// Apply environment overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(BOT_TOKEN_ENV) {
            self.slack.bot_token = Some(token);
        }
        if let Some(token) = lookup(USER_TOKEN_ENV) {
            self.slack.user_token = Some(token);
        }
        if let Some(flag) = lookup(SAFE_SEARCH_ENV) {
            self.slack.safe_search = flag.trim().eq_ignore_ascii_case("true");
        }
        if let Some(host) = lookup(HOST_ENV) {
            self.server.host = host;
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: PORT_ENV,
                value: port.clone(),
            })?;
        }
        if let Some(level) = lookup(LOG_ENV) {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Both tokens, or the first one missing. Blank counts as missing.
    pub fn validate(&self) -> Result<Credentials, ConfigError> {
        let bot_token = non_blank(self.slack.bot_token.as_deref())
            .ok_or(ConfigError::MissingCredential(BOT_TOKEN_ENV))?;
        let user_token = non_blank(self.slack.user_token.as_deref())
            .ok_or(ConfigError::MissingCredential(USER_TOKEN_ENV))?;
        Ok(Credentials {
            bot_token: bot_token.to_string(),
            user_token: user_token.to_string(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Resolve the config file path: `$SLACK_MCP_CONFIG`, else
/// `<config_dir>/slack-mcp/config.json5`.
pub fn get_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("slack-mcp")
        .join("config.json5")
}

/// Load the file at `path` without environment overrides. A missing file
/// yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    json5::from_str(&raw).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load configuration from `path` (or the default location) and apply
/// environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    let mut config = load_config_from(&path)?;
    config.apply_env(|key| std::env::var(key).ok())?;
    Ok(config)
}
