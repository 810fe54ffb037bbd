//! Slack Web API capability
//!
//! The rest of the crate talks to Slack only through the [`SlackApi`] trait.
//! Two handles are built at startup, one per token scope (bot and user),
//! and injected separately into the tools that need them.

pub mod client;
pub mod normalize;
pub mod pagination;
pub mod privacy;
pub mod query;

#[cfg(test)]
pub(crate) mod fake;

pub use client::SlackClient;
pub use pagination::collect_all;
pub use privacy::{PrivacyFilter, SafeSearchPolicy};
pub use query::SearchFilter;

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Error code reported when Slack answers `ok: false` without an `error` field.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Slack API error
#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    #[error("Network error: {0}")]
    Network(String),
    /// Upstream `error` code, verbatim
    #[error("{0}")]
    Api(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Which token a handle was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlackScope {
    Bot,
    User,
}

impl SlackScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlackScope::Bot => "bot",
            SlackScope::User => "user",
        }
    }
}

/// A decoded Web API response.
///
/// Slack always answers with a JSON object carrying `ok`, and `error` when
/// `ok` is false. The whole object is kept as the payload.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    payload: Map<String, Value>,
}

impl UpstreamResponse {
    /// Wrap a response body. Anything other than a JSON object is a parse error.
    pub fn from_json(body: Value) -> Result<Self, SlackError> {
        match body {
            Value::Object(payload) => Ok(Self { payload }),
            other => Err(SlackError::Parse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn ok(&self) -> bool {
        self.payload.get("ok").and_then(|v| v.as_bool()) == Some(true)
    }

    pub fn error(&self) -> Option<&str> {
        self.payload.get("error").and_then(|v| v.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Boolean field, `false` when absent or not a boolean.
    pub fn flag(&self, key: &str) -> bool {
        self.payload.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    /// The array stored under `key`, or an empty slice.
    pub fn items(&self, key: &str) -> &[Value] {
        self.payload
            .get(key)
            .and_then(|v| v.as_array())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// `response_metadata.next_cursor`; Slack sends `""` on the last page.
    pub fn next_cursor(&self) -> Option<String> {
        self.payload
            .get("response_metadata")
            .and_then(|m| m.get("next_cursor"))
            .and_then(|c| c.as_str())
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
    }

    /// Turn an `ok: false` response into [`SlackError::Api`].
    pub fn into_result(self) -> Result<Self, SlackError> {
        if self.ok() {
            Ok(self)
        } else {
            let code = self.error().unwrap_or(UNKNOWN_ERROR).to_string();
            Err(SlackError::Api(code))
        }
    }
}

/// A handle that can execute named Slack Web API methods.
///
/// `Err` means the call itself faulted (network, undecodable body). An API
/// level failure comes back as `Ok` with `ok() == false`.
#[async_trait]
pub trait SlackApi: Send + Sync {
    fn scope(&self) -> SlackScope;

    async fn call(&self, method: &str, params: Value) -> Result<UpstreamResponse, SlackError>;
}

/// Call `method` and fail on `ok: false`.
pub async fn call_ok(
    api: &dyn SlackApi,
    method: &str,
    params: Value,
) -> Result<UpstreamResponse, SlackError> {
    api.call(method, params).await?.into_result()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
