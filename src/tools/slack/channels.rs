//! Channel listing and channel search

use serde_json::{json, Value};
use std::sync::Arc;

use super::{
    contains_ignore_case, cursor_property, flag, limit_property, object_schema, SlackToolContext,
    DEFAULT_LIMIT, DEFAULT_SEARCH_LIMIT, PUBLIC_CHANNEL,
};
use crate::slack::normalize::{Channel, ChannelMatch, ChannelPage, ChannelSearch, ResponseMetadata};
use crate::slack::{call_ok, collect_all};
use crate::tools::args::{optional_str, optional_u64, require_str};
use crate::tools::{BoxFuture, Result, Tool};

/// `slack_list_channels`: one page of public channels
pub struct ListChannelsTool {
    ctx: Arc<SlackToolContext>,
}

impl ListChannelsTool {
    pub fn new(ctx: Arc<SlackToolContext>) -> Self {
        Self { ctx }
    }
}

impl Tool for ListChannelsTool {
    fn name(&self) -> &str {
        "slack_list_channels"
    }

    fn description(&self) -> &str {
        "List public channels in the workspace with pagination. Returns the channels and a \
         next_cursor to pass back for the following page."
    }

    fn parameters_schema(&self) -> Value {
        object_schema(
            json!({
                "limit": limit_property(DEFAULT_LIMIT, "channels"),
                "cursor": cursor_property()
            }),
            &[],
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<Value>> {
        Box::pin(async move {
            let limit = optional_u64(&params, "limit")?.unwrap_or(DEFAULT_LIMIT);
            let cursor = optional_str(&params, "cursor")?;

            let response = call_ok(
                self.ctx.bot(),
                "conversations.list",
                json!({
                    "limit": limit,
                    "cursor": cursor,
                    "types": PUBLIC_CHANNEL
                }),
            )
            .await?;

            let page = ChannelPage {
                channels: response.items("channels").iter().map(Channel::from_raw).collect(),
                response_metadata: ResponseMetadata::new(response.next_cursor()),
            };
            Ok(serde_json::to_value(page)?)
        })
    }
}

/// `slack_search_channels`: substring match over every public channel
pub struct SearchChannelsTool {
    ctx: Arc<SlackToolContext>,
}

impl SearchChannelsTool {
    pub fn new(ctx: Arc<SlackToolContext>) -> Self {
        Self { ctx }
    }
}

impl Tool for SearchChannelsTool {
    fn name(&self) -> &str {
        "slack_search_channels"
    }

    fn description(&self) -> &str {
        "Search for channels by partial name match. Use this when you need to find channels \
         containing specific keywords in their names. Archived channels are excluded."
    }

    fn parameters_schema(&self) -> Value {
        object_schema(
            json!({
                "query": {
                    "type": "string",
                    "description": "Search query to match against channel names"
                },
                "limit": limit_property(DEFAULT_SEARCH_LIMIT, "channels")
            }),
            &["query"],
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<Value>> {
        Box::pin(async move {
            let query = require_str(&params, "query")?;
            let limit = optional_u64(&params, "limit")?.unwrap_or(DEFAULT_SEARCH_LIMIT) as usize;

            // No server-side name filter exists, so the whole listing is walked first
            let all = collect_all(
                self.ctx.bot(),
                "conversations.list",
                json!({ "types": PUBLIC_CHANNEL }),
                "channels",
            )
            .await?;

            let needle = query.to_lowercase();
            let channels: Vec<ChannelMatch> = all
                .iter()
                .filter(|ch| !flag(ch, "is_archived"))
                .filter(|ch| contains_ignore_case(ch.get("name").and_then(|n| n.as_str()), &needle))
                .take(limit)
                .map(ChannelMatch::from_raw)
                .collect();

            let result = ChannelSearch {
                total: channels.len(),
                channels,
            };
            Ok(serde_json::to_value(result)?)
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
    async fn test_list_channels_single_page() {
        let h = bot_only(ScriptedSlack::bot().reply(
            "conversations.list",
            json!({
                "ok": true,
                "channels": [
                    {"id": "C1", "name": "general", "is_archived": false, "num_members": 10, "topic": {"value": "x"}},
                    {"id": "C2", "name": "random"}
                ],
                "response_metadata": {"next_cursor": "bmV4dA=="}
            }),
        ));

        let out = ListChannelsTool::new(h.context)
            .execute(json!({"limit": 2}))
            .await
            .unwrap();

        assert_eq!(
            out,
            json!({
                "channels": [
                    {"id": "C1", "name": "general", "is_archived": false, "num_members": 10},
                    {"id": "C2", "name": "random", "is_archived": null, "num_members": null}
                ],
                "response_metadata": {"next_cursor": "bmV4dA=="}
            })
        );

        let calls = h.bot.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, json!({"limit": 2, "cursor": null, "types": "public_channel"}));
    }

    #[tokio::test]
    async fn test_list_channels_defaults_and_cursor() {
        let h = bot_only(ScriptedSlack::bot().reply(
            "conversations.list",
            json!({"ok": true, "channels": []}),
        ));

        let out = ListChannelsTool::new(Arc::clone(&h.context))
            .execute(json!({"cursor": "abc"}))
            .await
            .unwrap();
        assert_eq!(out["response_metadata"]["next_cursor"], Value::Null);

        let params = &h.bot.calls()[0].1;
        assert_eq!(params["limit"], json!(100));
        assert_eq!(params["cursor"], json!("abc"));
    }

    #[tokio::test]
    async fn test_list_channels_upstream_error() {
        let h = bot_only(ScriptedSlack::bot().reply(
            "conversations.list",
            json!({"ok": false, "error": "invalid_auth"}),
        ));

        let err = ListChannelsTool::new(h.context).execute(json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::Upstream(ref code) if code == "invalid_auth"));
    }

    #[tokio::test]
    async fn test_list_channels_rejects_bad_limit() {
        let h = bot_only(ScriptedSlack::bot());
        let err = ListChannelsTool::new(Arc::clone(&h.context))
            .execute(json!({"limit": "ten"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
        assert!(h.bot.calls().is_empty());
    }

    #[tokio::test]
    async fn test_search_channels_excludes_archived_and_truncates() {
        let h = bot_only(
            ScriptedSlack::bot()
                .reply(
                    "conversations.list",
                    json!({
                        "ok": true,
                        "channels": [
                            {"id": "C1", "name": "engineering", "is_archived": false, "num_members": 40,
                             "purpose": {"value": "Build things"}},
                            {"id": "C2", "name": "eng-archive", "is_archived": true}
                        ],
                        "response_metadata": {"next_cursor": "p2"}
                    }),
                )
                .reply(
                    "conversations.list",
                    json!({
                        "ok": true,
                        "channels": [
                            {"id": "C3", "name": "ENG-oncall", "is_archived": false},
                            {"id": "C4", "name": "design"}
                        ],
                        "response_metadata": {"next_cursor": ""}
                    }),
                ),
        );

        let out = SearchChannelsTool::new(Arc::clone(&h.context))
            .execute(json!({"query": "eng", "limit": 1}))
            .await
            .unwrap();

        assert_eq!(
            out,
            json!({
                "channels": [{
                    "id": "C1",
                    "name": "engineering",
                    "is_archived": false,
                    "num_members": 40,
                    "purpose": "Build things"
                }],
                "total": 1
            })
        );
        // the full listing is walked even though the first page already satisfied the limit
        assert_eq!(h.bot.calls_to("conversations.list"), 2);
    }

    #[tokio::test]
    async fn test_search_channels_case_insensitive_order_preserved() {
        let h = bot_only(ScriptedSlack::bot().reply(
            "conversations.list",
            json!({
                "ok": true,
                "channels": [
                    {"id": "C3", "name": "ENG-oncall"},
                    {"id": "C1", "name": "engineering"},
                    {"id": "C9", "name": "marketing"}
                ]
            }),
        ));

        let out = SearchChannelsTool::new(h.context)
            .execute(json!({"query": "Eng"}))
            .await
            .unwrap();
        let ids: Vec<&str> = out["channels"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["C3", "C1"]);
        assert_eq!(out["total"], json!(2));
    }

    #[tokio::test]
    async fn test_search_channels_fails_fast_on_page_error() {
        let h = bot_only(
            ScriptedSlack::bot()
                .reply(
                    "conversations.list",
                    json!({"ok": true, "channels": [{"id": "C1", "name": "eng"}], "response_metadata": {"next_cursor": "p2"}}),
                )
                .reply("conversations.list", json!({"ok": false, "error": "ratelimited"})),
        );

        let err = SearchChannelsTool::new(h.context)
            .execute(json!({"query": "eng"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Upstream(ref code) if code == "ratelimited"));
    }

    #[tokio::test]
    async fn test_search_channels_requires_query() {
        let h = bot_only(ScriptedSlack::bot());
        let err = SearchChannelsTool::new(h.context)
            .execute(json!({"limit": 5}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
    }
}
