//! Message search

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{object_schema, SlackToolContext};
use crate::slack::normalize::SearchResults;
use crate::slack::{call_ok, SearchFilter, SlackApi};
use crate::tools::args::{optional_bool, optional_str, optional_u64};
use crate::tools::{BoxFuture, Result, Tool};

const DEFAULT_COUNT: u64 = 20;
const DEFAULT_PAGE: u64 = 1;
const DEFAULT_SORT: &str = "score";
const DEFAULT_SORT_DIR: &str = "desc";

/// `slack_search_messages`
///
/// Runs on the user token, since `search.messages` is not available to bots.
/// The optional channel id is resolved to a name with the bot token first.
pub struct SearchMessagesTool {
    ctx: Arc<SlackToolContext>,
}

impl SearchMessagesTool {
    pub fn new(ctx: Arc<SlackToolContext>) -> Self {
        Self { ctx }
    }
}

/// Channel id to name. Any failure yields `None` and the `in:` modifier is
/// dropped from the query rather than failing the search.
async fn resolve_channel_name(api: &dyn SlackApi, channel_id: &str) -> Option<String> {
    let response = match api.call("conversations.info", json!({ "channel": channel_id })).await {
        Ok(response) => response,
        Err(e) => {
            warn!(channel_id, error = %e, "channel lookup faulted; searching without channel filter");
            return None;
        }
    };

    if !response.ok() {
        debug!(
            channel_id,
            error = response.error().unwrap_or_default(),
            "channel lookup failed; searching without channel filter"
        );
        return None;
    }

    response
        .get("channel")
        .and_then(|c| c.get("name"))
        .and_then(|n| n.as_str())
        .map(|n| n.to_string())
}

impl Tool for SearchMessagesTool {
    fn name(&self) -> &str {
        "slack_search_messages"
    }

    fn description(&self) -> &str {
        "Search for messages with specific criteria or filters. Use this when you need messages \
         from a specific user, messages from a specific date range, or messages containing \
         specific keywords. Do NOT use this for browsing recent channel activity - use \
         slack_get_channel_history instead."
    }

    fn parameters_schema(&self) -> Value {
        let date = |what: &str| {
            json!({
                "type": "string",
                "description": format!("Search for messages {what} (YYYY-MM-DD)")
            })
        };

        object_schema(
            json!({
                "query": {
                    "type": "string",
                    "description": "Basic search query text"
                },
                "in_channel": {
                    "type": "string",
                    "description": "Search within a specific channel, given as a channel ID"
                },
                "from_user": {
                    "type": "string",
                    "description": "Search for messages from a specific user, given as a user ID"
                },
                "before": date("before this date"),
                "after": date("after this date"),
                "on": date("on this specific date"),
                "during": {
                    "type": "string",
                    "description": "Search for messages during a period (e.g. July, 2023)"
                },
                "highlight": {
                    "type": "boolean",
                    "default": false,
                    "description": "Enable highlighting of search results"
                },
                "sort": {
                    "type": "string",
                    "enum": ["score", "timestamp"],
                    "default": DEFAULT_SORT,
                    "description": "Search result sort method"
                },
                "sort_dir": {
                    "type": "string",
                    "enum": ["asc", "desc"],
                    "default": DEFAULT_SORT_DIR,
                    "description": "Sort direction"
                },
                "count": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 100,
                    "default": DEFAULT_COUNT,
                    "description": "Number of results per page (max 100)"
                },
                "page": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 100,
                    "default": DEFAULT_PAGE,
                    "description": "Page number of results (max 100)"
                }
            }),
            &[],
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<Value>> {
        Box::pin(async move {
            let in_channel = optional_str(&params, "in_channel")?;
            let mut filter = SearchFilter {
                text: optional_str(&params, "query")?,
                channel_name: None,
                from_user: optional_str(&params, "from_user")?,
                before: optional_str(&params, "before")?,
                after: optional_str(&params, "after")?,
                on: optional_str(&params, "on")?,
                during: optional_str(&params, "during")?,
            };
            let highlight = optional_bool(&params, "highlight")?.unwrap_or(false);
            let sort = optional_str(&params, "sort")?.unwrap_or_else(|| DEFAULT_SORT.to_string());
            let sort_dir =
                optional_str(&params, "sort_dir")?.unwrap_or_else(|| DEFAULT_SORT_DIR.to_string());
            let count = optional_u64(&params, "count")?.unwrap_or(DEFAULT_COUNT);
            let page = optional_u64(&params, "page")?.unwrap_or(DEFAULT_PAGE);

            if let Some(channel_id) = in_channel.as_deref() {
                filter.channel_name = resolve_channel_name(self.ctx.bot(), channel_id).await;
            }

            let query = filter.to_query();
            debug!(%query, safe_search = self.ctx.privacy().policy().is_enabled(), "searching messages");

            let response = call_ok(
                self.ctx.user(),
                "search.messages",
                json!({
                    "query": query,
                    "highlight": highlight,
                    "sort": sort,
                    "sort_dir": sort_dir,
                    "count": count,
                    "page": page
                }),
            )
            .await?;

            let messages = response.get("messages");
            let matches = messages
                .and_then(|m| m.get("matches"))
                .and_then(|m| m.as_array())
                .map(|m| m.as_slice())
                .unwrap_or(&[]);

            // Filter before normalizing so dropped matches are never serialized
            let visible = self.ctx.privacy().apply(matches);
            let results = SearchResults::new(messages.and_then(|m| m.get("total")), &visible);
            Ok(serde_json::to_value(results)?)
        })
    }
}
