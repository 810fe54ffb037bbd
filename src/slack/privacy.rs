//! Safe-search filtering
//!
//! When safe search is on, search matches whose source channel is private,
//! a DM or a group DM are dropped before results are normalized.

use serde_json::Value;
use tracing::info;

/// Workspace-wide safe-search switch. Read from configuration once at
/// startup and never changed afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SafeSearchPolicy {
    enabled: bool,
}

impl SafeSearchPolicy {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn enabled() -> Self {
        Self::new(true)
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Channel flags that mark a match as non-public.
const PRIVATE_FLAGS: [&str; 3] = ["is_private", "is_im", "is_mpim"];

/// Search result gate, built once with the process policy.
#[derive(Debug, Clone, Copy)]
pub struct PrivacyFilter {
    policy: SafeSearchPolicy,
}

impl PrivacyFilter {
    pub fn new(policy: SafeSearchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SafeSearchPolicy {
        self.policy
    }

    /// Return the matches that may be shown, in their original order.
    pub fn apply(&self, matches: &[Value]) -> Vec<Value> {
        if !self.policy.is_enabled() {
            return matches.to_vec();
        }

        let visible: Vec<Value> = matches
            .iter()
            .filter(|m| !is_private_source(m))
            .cloned()
            .collect();

        let dropped = matches.len() - visible.len();
        if dropped > 0 {
            info!(
                dropped,
                "Safe search: filtered out messages from private channels/DMs"
            );
        }
        visible
    }
}

fn is_private_source(search_match: &Value) -> bool {
    let Some(channel) = search_match.get("channel") else {
        return false;
    };
    PRIVATE_FLAGS
        .iter()
        .any(|flag| channel.get(*flag).and_then(|v| v.as_bool()) == Some(true))
}
