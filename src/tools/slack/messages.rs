//! Posting, threading, reactions, history

use serde_json::{json, Value};
use std::sync::Arc;

use super::{cursor_property, limit_property, object_schema, SlackToolContext, DEFAULT_LIMIT};
use crate::slack::call_ok;
use crate::slack::normalize::{HistoryMessage, MessagePage, ResponseMetadata, ThreadMessage};
use crate::tools::args::{optional_str, optional_u64, require_str};
use crate::tools::{BoxFuture, Result, Tool};

fn channel_id_property(what: &str) -> Value {
    json!({ "type": "string", "description": format!("The ID of the channel{what}") })
}

fn thread_ts_property() -> Value {
    json!({ "type": "string", "description": "The timestamp of the parent message" })
}

/// `slack_post_message`
pub struct PostMessageTool {
    ctx: Arc<SlackToolContext>,
}

impl PostMessageTool {
    pub fn new(ctx: Arc<SlackToolContext>) -> Self {
        Self { ctx }
    }
}

impl Tool for PostMessageTool {
    fn name(&self) -> &str {
        "slack_post_message"
    }

    fn description(&self) -> &str {
        "Post a new message to a Slack channel."
    }

    fn parameters_schema(&self) -> Value {
        object_schema(
            json!({
                "channel_id": channel_id_property(" to post to"),
                "text": { "type": "string", "description": "The message text to post" }
            }),
            &["channel_id", "text"],
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<Value>> {
        Box::pin(async move {
            let channel = require_str(&params, "channel_id")?;
            let text = require_str(&params, "text")?;

            call_ok(
                self.ctx.bot(),
                "chat.postMessage",
                json!({ "channel": channel, "text": text }),
            )
            .await?;
            Ok(json!("Message posted successfully"))
        })
    }
}

/// `slack_reply_to_thread`
pub struct ReplyToThreadTool {
    ctx: Arc<SlackToolContext>,
}

impl ReplyToThreadTool {
    pub fn new(ctx: Arc<SlackToolContext>) -> Self {
        Self { ctx }
    }
}

impl Tool for ReplyToThreadTool {
    fn name(&self) -> &str {
        "slack_reply_to_thread"
    }

    fn description(&self) -> &str {
        "Reply to a specific message thread in Slack."
    }

    fn parameters_schema(&self) -> Value {
        object_schema(
            json!({
                "channel_id": channel_id_property(""),
                "thread_ts": thread_ts_property(),
                "text": { "type": "string", "description": "The reply text" }
            }),
            &["channel_id", "thread_ts", "text"],
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<Value>> {
        Box::pin(async move {
            let channel = require_str(&params, "channel_id")?;
            let thread_ts = require_str(&params, "thread_ts")?;
            let text = require_str(&params, "text")?;

            call_ok(
                self.ctx.bot(),
                "chat.postMessage",
                json!({ "channel": channel, "thread_ts": thread_ts, "text": text }),
            )
            .await?;
            Ok(json!("Reply sent to thread successfully"))
        })
    }
}

/// `slack_add_reaction`
pub struct AddReactionTool {
    ctx: Arc<SlackToolContext>,
}

impl AddReactionTool {
    pub fn new(ctx: Arc<SlackToolContext>) -> Self {
        Self { ctx }
    }
}

impl Tool for AddReactionTool {
    fn name(&self) -> &str {
        "slack_add_reaction"
    }

    fn description(&self) -> &str {
        "Add a reaction emoji to a message."
    }

    fn parameters_schema(&self) -> Value {
        object_schema(
            json!({
                "channel_id": channel_id_property(""),
                "timestamp": { "type": "string", "description": "The timestamp of the message" },
                "reaction": { "type": "string", "description": "The emoji name (without colons)" }
            }),
            &["channel_id", "timestamp", "reaction"],
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<Value>> {
        Box::pin(async move {
            let channel = require_str(&params, "channel_id")?;
            let timestamp = require_str(&params, "timestamp")?;
            let reaction = require_str(&params, "reaction")?;

            call_ok(
                self.ctx.bot(),
                "reactions.add",
                json!({ "channel": channel, "timestamp": timestamp, "name": reaction }),
            )
            .await?;
            Ok(json!("Reaction added successfully"))
        })
    }
}

/// `slack_get_channel_history`
pub struct ChannelHistoryTool {
    ctx: Arc<SlackToolContext>,
}

impl ChannelHistoryTool {
    pub fn new(ctx: Arc<SlackToolContext>) -> Self {
        Self { ctx }
    }
}

impl Tool for ChannelHistoryTool {
    fn name(&self) -> &str {
        "slack_get_channel_history"
    }

    fn description(&self) -> &str {
        "Get messages from a channel in chronological order. Use this when you need the latest \
         conversation flow without specific filters, want ALL messages including bot/automation \
         messages, or need to browse messages sequentially with pagination. Do NOT use if you \
         have specific search criteria - use slack_search_messages instead."
    }

    fn parameters_schema(&self) -> Value {
        object_schema(
            json!({
                "channel_id": channel_id_property(""),
                "limit": limit_property(DEFAULT_LIMIT, "messages"),
                "cursor": cursor_property()
            }),
            &["channel_id"],
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<Value>> {
        Box::pin(async move {
            let channel = require_str(&params, "channel_id")?;
            let limit = optional_u64(&params, "limit")?.unwrap_or(DEFAULT_LIMIT);
            let cursor = optional_str(&params, "cursor")?;

            let response = call_ok(
                self.ctx.bot(),
                "conversations.history",
                json!({ "channel": channel, "limit": limit, "cursor": cursor }),
            )
            .await?;

            let page = MessagePage {
                messages: response
                    .items("messages")
                    .iter()
                    .map(HistoryMessage::from_raw)
                    .collect(),
                has_more: response.flag("has_more"),
                response_metadata: ResponseMetadata::new(response.next_cursor()),
            };
            Ok(serde_json::to_value(page)?)
        })
    }
}

/// `slack_get_thread_replies`
pub struct ThreadRepliesTool {
    ctx: Arc<SlackToolContext>,
}

impl ThreadRepliesTool {
    pub fn new(ctx: Arc<SlackToolContext>) -> Self {
        Self { ctx }
    }
}

impl Tool for ThreadRepliesTool {
    fn name(&self) -> &str {
        "slack_get_thread_replies"
    }

    fn description(&self) -> &str {
        "Get all replies in a message thread."
    }

    fn parameters_schema(&self) -> Value {
        object_schema(
            json!({
                "channel_id": channel_id_property(""),
                "thread_ts": thread_ts_property(),
                "limit": limit_property(DEFAULT_LIMIT, "replies"),
                "cursor": cursor_property()
            }),
            &["channel_id", "thread_ts"],
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<Value>> {
        Box::pin(async move {
            let channel = require_str(&params, "channel_id")?;
            let thread_ts = require_str(&params, "thread_ts")?;
            let limit = optional_u64(&params, "limit")?.unwrap_or(DEFAULT_LIMIT);
            let cursor = optional_str(&params, "cursor")?;

            let response = call_ok(
                self.ctx.bot(),
                "conversations.replies",
                json!({ "channel": channel, "ts": thread_ts, "limit": limit, "cursor": cursor }),
            )
            .await?;

            let page = MessagePage {
                messages: response
                    .items("messages")
                    .iter()
                    .map(ThreadMessage::from_raw)
                    .collect(),
                has_more: response.flag("has_more"),
                response_metadata: ResponseMetadata::new(response.next_cursor()),
            };
            Ok(serde_json::to_value(page)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slack::fake::ScriptedSlack;
    use crate::tools::slack::test_support::bot_only;
    use crate::tools::ToolError;

    #[tokio::test]
    async fn test_post_message() {
        let h = bot_only(ScriptedSlack::bot().reply(
            "chat.postMessage",
            json!({"ok": true, "channel": "C1", "ts": "1.0", "message": {"text": "hi"}}),
        ));

        let out = PostMessageTool::new(Arc::clone(&h.context))
            .execute(json!({"channel_id": "C1", "text": "hi"}))
            .await
            .unwrap();

        assert_eq!(out, json!("Message posted successfully"));
        assert_eq!(h.bot.calls()[0], ("chat.postMessage".to_string(), json!({"channel": "C1", "text": "hi"})));
    }

    #[tokio::test]
    async fn test_post_message_missing_text() {
        let h = bot_only(ScriptedSlack::bot());
        let err = PostMessageTool::new(Arc::clone(&h.context))
            .execute(json!({"channel_id": "C1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument(ref m) if m.contains("text")));
        assert!(h.bot.calls().is_empty());
    }

    #[tokio::test]
    async fn test_post_message_not_in_channel() {
        let h = bot_only(ScriptedSlack::bot().reply(
            "chat.postMessage",
            json!({"ok": false, "error": "not_in_channel"}),
        ));
        let err = PostMessageTool::new(h.context)
            .execute(json!({"channel_id": "C1", "text": "hi"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Upstream(ref code) if code == "not_in_channel"));
    }

    #[tokio::test]
    async fn test_reply_to_thread_sets_thread_ts() {
        let h = bot_only(ScriptedSlack::bot().reply("chat.postMessage", json!({"ok": true})));

        let out = ReplyToThreadTool::new(Arc::clone(&h.context))
            .execute(json!({"channel_id": "C1", "thread_ts": "1700000000.000100", "text": "+1"}))
            .await
            .unwrap();

        assert_eq!(out, json!("Reply sent to thread successfully"));
        assert_eq!(
            h.bot.calls()[0].1,
            json!({"channel": "C1", "thread_ts": "1700000000.000100", "text": "+1"})
        );
    }

    #[tokio::test]
    async fn test_add_reaction_maps_name() {
        let h = bot_only(ScriptedSlack::bot().reply("reactions.add", json!({"ok": true})));

        let out = AddReactionTool::new(Arc::clone(&h.context))
            .execute(json!({"channel_id": "C1", "timestamp": "1.0", "reaction": "thumbsup"}))
            .await
            .unwrap();

        assert_eq!(out, json!("Reaction added successfully"));
        assert_eq!(
            h.bot.calls()[0].1,
            json!({"channel": "C1", "timestamp": "1.0", "name": "thumbsup"})
        );
    }

    #[tokio::test]
    async fn test_add_reaction_transport_fault() {
        let h = bot_only(ScriptedSlack::bot().fault("reactions.add", "connection reset by peer"));
        let err = AddReactionTool::new(h.context)
            .execute(json!({"channel_id": "C1", "timestamp": "1.0", "reaction": "eyes"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "upstream_error");
        assert!(err.message().contains("connection reset by peer"));
    }

    #[tokio::test]
    async fn test_channel_history_normalized() {
        let h = bot_only(ScriptedSlack::bot().reply(
            "conversations.history",
            json!({
                "ok": true,
                "messages": [
                    {"type": "message", "user": "U1", "text": "hello", "ts": "2.0",
                     "reactions": [{"name": "wave", "count": 1}], "client_msg_id": "x", "blocks": []},
                    {"type": "message", "bot_id": "B1", "text": "deploy done", "ts": "1.0",
                     "thread_ts": "1.0", "reply_count": 2}
                ],
                "has_more": true,
                "response_metadata": {"next_cursor": "bmV4dA=="}
            }),
        ));

        let out = ChannelHistoryTool::new(Arc::clone(&h.context))
            .execute(json!({"channel_id": "C1", "limit": 2}))
            .await
            .unwrap();

        assert_eq!(
            out,
            json!({
                "messages": [
                    {"type": "message", "user": "U1", "text": "hello", "ts": "2.0", "thread_ts": null,
                     "reply_count": null, "reactions": [{"name": "wave", "count": 1}]},
                    {"type": "message", "user": null, "text": "deploy done", "ts": "1.0", "thread_ts": "1.0",
                     "reply_count": 2, "reactions": null}
                ],
                "has_more": true,
                "response_metadata": {"next_cursor": "bmV4dA=="}
            })
        );
        assert_eq!(h.bot.calls()[0].1, json!({"channel": "C1", "limit": 2, "cursor": null}));
    }

    #[tokio::test]
    async fn test_channel_history_has_more_defaults_false() {
        let h = bot_only(ScriptedSlack::bot().reply("conversations.history", json!({"ok": true, "messages": []})));
        let out = ChannelHistoryTool::new(h.context)
            .execute(json!({"channel_id": "C1"}))
            .await
            .unwrap();
        assert_eq!(out["has_more"], json!(false));
        assert_eq!(out["messages"], json!([]));
    }

    #[tokio::test]
    async fn test_thread_replies_subset() {
        let h = bot_only(ScriptedSlack::bot().reply(
            "conversations.replies",
            json!({
                "ok": true,
                "messages": [
                    {"type": "message", "user": "U1", "text": "parent", "ts": "1.0", "thread_ts": "1.0",
                     "reply_count": 1, "reactions": []},
                    {"type": "message", "user": "U2", "text": "child", "ts": "1.5", "thread_ts": "1.0"}
                ],
                "has_more": false
            }),
        ));

        let out = ThreadRepliesTool::new(Arc::clone(&h.context))
            .execute(json!({"channel_id": "C1", "thread_ts": "1.0", "cursor": "c1"}))
            .await
            .unwrap();

        let first = &out["messages"][0];
        assert!(first.get("reply_count").is_none());
        assert!(first.get("reactions").is_none());
        assert_eq!(out["messages"][1]["text"], json!("child"));
        assert_eq!(out["has_more"], json!(false));
        assert_eq!(
            h.bot.calls()[0].1,
            json!({"channel": "C1", "ts": "1.0", "limit": 100, "cursor": "c1"})
        );
    }
}
