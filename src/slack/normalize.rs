//! Response normalization
//!
//! Maps raw Slack records onto the small, fixed field sets handed back to
//! agents. A field missing upstream is serialized as `null`, never omitted,
//! and values are copied as-is (timestamps stay Slack strings).

use serde::Serialize;
use serde_json::{json, Value};

fn field(record: &Value, key: &str) -> Value {
    record.get(key).cloned().unwrap_or(Value::Null)
}

fn nested(record: &Value, outer: &str, key: &str) -> Value {
    record
        .get(outer)
        .and_then(|o| o.get(key))
        .cloned()
        .unwrap_or(Value::Null)
}

/// Pagination hint for single-page listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMetadata {
    pub next_cursor: Option<String>,
}

impl ResponseMetadata {
    pub fn new(next_cursor: Option<String>) -> Self {
        Self { next_cursor }
    }
}

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    pub id: Value,
    pub name: Value,
    pub is_archived: Value,
    pub num_members: Value,
}

impl Channel {
    pub fn from_raw(raw: &Value) -> Self {
        Self {
            id: field(raw, "id"),
            name: field(raw, "name"),
            is_archived: field(raw, "is_archived"),
            num_members: field(raw, "num_members"),
        }
    }
}

/// Channel as returned by channel search, with its purpose text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelMatch {
    pub id: Value,
    pub name: Value,
    pub is_archived: Value,
    pub num_members: Value,
    pub purpose: Value,
}

impl ChannelMatch {
    pub fn from_raw(raw: &Value) -> Self {
        Self {
            id: field(raw, "id"),
            name: field(raw, "name"),
            is_archived: field(raw, "is_archived"),
            num_members: field(raw, "num_members"),
            purpose: nested(raw, "purpose", "value"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelPage {
    pub channels: Vec<Channel>,
    pub response_metadata: ResponseMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSearch {
    pub channels: Vec<ChannelMatch>,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Channel history entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryMessage {
    #[serde(rename = "type")]
    pub kind: Value,
    pub user: Value,
    pub text: Value,
    pub ts: Value,
    pub thread_ts: Value,
    pub reply_count: Value,
    pub reactions: Value,
}

impl HistoryMessage {
    pub fn from_raw(raw: &Value) -> Self {
        Self {
            kind: field(raw, "type"),
            user: field(raw, "user"),
            text: field(raw, "text"),
            ts: field(raw, "ts"),
            thread_ts: field(raw, "thread_ts"),
            reply_count: field(raw, "reply_count"),
            reactions: field(raw, "reactions"),
        }
    }
}

/// Thread reply entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadMessage {
    #[serde(rename = "type")]
    pub kind: Value,
    pub user: Value,
    pub text: Value,
    pub ts: Value,
    pub thread_ts: Value,
}

impl ThreadMessage {
    pub fn from_raw(raw: &Value) -> Self {
        Self {
            kind: field(raw, "type"),
            user: field(raw, "user"),
            text: field(raw, "text"),
            ts: field(raw, "ts"),
            thread_ts: field(raw, "thread_ts"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessagePage<M> {
    pub messages: Vec<M>,
    pub has_more: bool,
    pub response_metadata: ResponseMetadata,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub display_name: Value,
    pub email: Value,
    pub image_48: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Value,
    pub name: Value,
    pub real_name: Value,
    pub profile: ProfileSummary,
    pub is_bot: Value,
    pub deleted: Value,
}

impl User {
    pub fn from_raw(raw: &Value) -> Self {
        Self {
            id: field(raw, "id"),
            name: field(raw, "name"),
            real_name: field(raw, "real_name"),
            profile: ProfileSummary {
                display_name: nested(raw, "profile", "display_name"),
                email: nested(raw, "profile", "email"),
                image_48: nested(raw, "profile", "image_48"),
            },
            is_bot: field(raw, "is_bot"),
            deleted: field(raw, "deleted"),
        }
    }
}

/// User as returned by user search: profile fields flattened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserMatch {
    pub id: Value,
    pub name: Value,
    pub real_name: Value,
    pub display_name: Value,
    pub email: Value,
    pub is_bot: Value,
    pub deleted: Value,
}

impl UserMatch {
    pub fn from_raw(raw: &Value) -> Self {
        Self {
            id: field(raw, "id"),
            name: field(raw, "name"),
            real_name: field(raw, "real_name"),
            display_name: nested(raw, "profile", "display_name"),
            email: nested(raw, "profile", "email"),
            is_bot: field(raw, "is_bot"),
            deleted: field(raw, "deleted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPage {
    pub members: Vec<User>,
    pub response_metadata: ResponseMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSearch {
    pub users: Vec<UserMatch>,
    pub total: usize,
}

/// One entry of a bulk profile lookup. A failed id is recorded, not raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProfileEntry {
    Found { user_id: String, profile: Value },
    Failed { user_id: String, error: String },
}

impl ProfileEntry {
    pub fn user_id(&self) -> &str {
        match self {
            ProfileEntry::Found { user_id, .. } | ProfileEntry::Failed { user_id, .. } => user_id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ProfileEntry::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileBatch {
    pub profiles: Vec<ProfileEntry>,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchChannel {
    pub id: Value,
    pub name: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchMatch {
    #[serde(rename = "type")]
    pub kind: Value,
    pub user: Value,
    pub username: Value,
    pub text: Value,
    pub ts: Value,
    pub channel: MatchChannel,
    pub permalink: Value,
}

impl SearchMatch {
    pub fn from_raw(raw: &Value) -> Self {
        Self {
            kind: field(raw, "type"),
            user: field(raw, "user"),
            username: field(raw, "username"),
            text: field(raw, "text"),
            ts: field(raw, "ts"),
            channel: MatchChannel {
                id: nested(raw, "channel", "id"),
                name: nested(raw, "channel", "name"),
            },
            permalink: field(raw, "permalink"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchMessages {
    pub total: Value,
    pub matches: Vec<SearchMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub messages: SearchMessages,
}

impl SearchResults {
    /// `total` is the upstream count, reported as 0 when Slack omits it.
    pub fn new(total: Option<&Value>, matches: &[Value]) -> Self {
        Self {
            messages: SearchMessages {
                total: total.cloned().unwrap_or_else(|| json!(0)),
                matches: matches.iter().map(SearchMatch::from_raw).collect(),
            },
        }
    }
}
