//! Slack workspace tools
//!
//! One tool per workspace operation. Each translates its arguments into
//! Slack Web API calls on the bot or user handle and normalizes the reply.

mod channels;
mod messages;
mod search;
mod users;

pub use channels::{ListChannelsTool, SearchChannelsTool};
pub use messages::{AddReactionTool, ChannelHistoryTool, PostMessageTool, ReplyToThreadTool, ThreadRepliesTool};
pub use search::SearchMessagesTool;
pub use users::{GetUsersTool, SearchUsersTool, UserProfilesTool};

use serde_json::{json, Value};
use std::sync::Arc;

use super::Tool;
use crate::slack::{PrivacyFilter, SafeSearchPolicy, SlackApi};

/// Page size for single-page listings when the caller gives no `limit`
pub const DEFAULT_LIMIT: u64 = 100;

/// Result cap for channel and user search
pub const DEFAULT_SEARCH_LIMIT: u64 = 20;

/// `types` filter sent with every `conversations.list` call
const PUBLIC_CHANNEL: &str = "public_channel";

/// Shared state for all Slack tools: the two scoped handles and the
/// safe-search gate.
pub struct SlackToolContext {
    bot: Arc<dyn SlackApi>,
    user: Arc<dyn SlackApi>,
    privacy: PrivacyFilter,
}

impl SlackToolContext {
    pub fn new(bot: Arc<dyn SlackApi>, user: Arc<dyn SlackApi>, policy: SafeSearchPolicy) -> Self {
        Self {
            bot,
            user,
            privacy: PrivacyFilter::new(policy),
        }
    }

    /// Bot-token handle: listings, posting, reactions, lookups
    pub fn bot(&self) -> &dyn SlackApi {
        self.bot.as_ref()
    }

    /// User-token handle: message search
    pub fn user(&self) -> &dyn SlackApi {
        self.user.as_ref()
    }

    pub fn privacy(&self) -> &PrivacyFilter {
        &self.privacy
    }
}

/// Every Slack tool, in the order they are advertised
pub fn slack_tools(context: Arc<SlackToolContext>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(ListChannelsTool::new(Arc::clone(&context))),
        Arc::new(PostMessageTool::new(Arc::clone(&context))),
        Arc::new(ReplyToThreadTool::new(Arc::clone(&context))),
        Arc::new(AddReactionTool::new(Arc::clone(&context))),
        Arc::new(ChannelHistoryTool::new(Arc::clone(&context))),
        Arc::new(ThreadRepliesTool::new(Arc::clone(&context))),
        Arc::new(GetUsersTool::new(Arc::clone(&context))),
        Arc::new(UserProfilesTool::new(Arc::clone(&context))),
        Arc::new(SearchMessagesTool::new(Arc::clone(&context))),
        Arc::new(SearchChannelsTool::new(Arc::clone(&context))),
        Arc::new(SearchUsersTool::new(context)),
    ]
}

/// Object schema with the given properties and required keys
fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

fn limit_property(default: u64, what: &str) -> Value {
    json!({
        "type": "integer",
        "minimum": 1,
        "default": default,
        "description": format!("Maximum number of {what} to return (default: {default})")
    })
}

fn cursor_property() -> Value {
    json!({
        "type": "string",
        "description": "Pagination cursor for next page"
    })
}

/// Case-insensitive substring test; a missing field never matches.
fn contains_ignore_case(haystack: Option<&str>, needle_lower: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle_lower))
}

fn flag(record: &Value, key: &str) -> bool {
    record.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}
