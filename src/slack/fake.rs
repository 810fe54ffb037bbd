//! Scripted in-memory [`SlackApi`] for unit tests.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::{SlackApi, SlackError, SlackScope, UpstreamResponse};

enum Reply {
    Body(Value),
    Fault(String),
}

/// Replies are queued per method and consumed in order. An unscripted call
/// is a network fault, so tests notice calls they did not expect.
pub(crate) struct ScriptedSlack {
    scope: SlackScope,
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedSlack {
    pub(crate) fn new(scope: SlackScope) -> Self {
        Self {
            scope,
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn bot() -> Self {
        Self::new(SlackScope::Bot)
    }

    pub(crate) fn user() -> Self {
        Self::new(SlackScope::User)
    }

    /// Queue a response body for `method`.
    pub(crate) fn reply(self, method: &str, body: Value) -> Self {
        self.push(method, Reply::Body(body));
        self
    }

    /// Queue a transport fault for `method`.
    pub(crate) fn fault(self, method: &str, message: &str) -> Self {
        self.push(method, Reply::Fault(message.to_string()));
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().clone()
    }

    pub(crate) fn calls_to(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|(m, _)| m == method).count()
    }

    fn push(&self, method: &str, reply: Reply) {
        self.replies
            .lock()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }
}

#[async_trait]
impl SlackApi for ScriptedSlack {
    fn scope(&self) -> SlackScope {
        self.scope
    }

    async fn call(&self, method: &str, params: Value) -> Result<UpstreamResponse, SlackError> {
        self.calls.lock().push((method.to_string(), params));
        let next = self
            .replies
            .lock()
            .get_mut(method)
            .and_then(|queue| queue.pop_front());
        match next {
            Some(Reply::Body(body)) => UpstreamResponse::from_json(body),
            Some(Reply::Fault(message)) => Err(SlackError::Network(message)),
            None => Err(SlackError::Network(format!("unscripted call: {method}"))),
        }
    }
}
