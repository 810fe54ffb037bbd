//! Slack Web API client
//!
//! Posts form-encoded parameters to `https://slack.com/api/<method>` with a
//! bearer token. One client is built per token scope.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::{SlackApi, SlackError, SlackScope, UpstreamResponse};

/// Default Web API base URL
pub const SLACK_API_BASE: &str = "https://slack.com/api";

/// Per-request timeout. This is the only timeout applied to upstream calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Slack Web API client bound to one token.
#[derive(Clone)]
pub struct SlackClient {
    scope: SlackScope,
    token: String,
    base_url: String,
    http: reqwest::Client,
}

impl fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackClient")
            .field("scope", &self.scope)
            .field("token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl SlackClient {
    /// Create a client for the given scope and token
    pub fn new(scope: SlackScope, token: impl Into<String>) -> Result<Self, SlackError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SlackError::Network(e.to_string()))?;

        Ok(Self {
            scope,
            token: token.into(),
            base_url: SLACK_API_BASE.to_string(),
            http,
        })
    }

    /// Point the client at a different API host (used by tests and proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }
}

#[async_trait]
impl SlackApi for SlackClient {
    fn scope(&self) -> SlackScope {
        self.scope
    }

    async fn call(&self, method: &str, params: Value) -> Result<UpstreamResponse, SlackError> {
        debug!(scope = self.scope.as_str(), method, "Slack API request");

        let response = self
            .http
            .post(self.api_url(method))
            .bearer_auth(&self.token)
            .form(&form_params(&params))
            .send()
            .await
            .map_err(|e| SlackError::Network(e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| SlackError::Parse(e.to_string()))?;

        let response = UpstreamResponse::from_json(body)?;
        if !response.ok() {
            warn!(
                scope = self.scope.as_str(),
                method,
                error = response.error().unwrap_or_default(),
                "Slack API returned an error"
            );
        }
        Ok(response)
    }
}

/// Flatten a JSON object into form fields. Nulls are dropped, scalars are
/// stringified, nested values are sent as JSON text.
fn form_params(params: &Value) -> Vec<(String, String)> {
    let Some(map) = params.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => other.to_string(),
            };
            Some((key.clone(), value))
        })
        .collect()
}
