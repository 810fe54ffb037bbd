//! Member listing, profile lookup, member search

use futures_util::future::join_all;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use super::{
    contains_ignore_case, cursor_property, flag, limit_property, object_schema, SlackToolContext,
    DEFAULT_LIMIT, DEFAULT_SEARCH_LIMIT,
};
use crate::slack::normalize::{
    ProfileBatch, ProfileEntry, ResponseMetadata, User, UserMatch, UserPage, UserSearch,
};
use crate::slack::{call_ok, collect_all, SlackApi, UNKNOWN_ERROR};
use crate::tools::args::{optional_str, optional_u64, require_str, require_str_list};
use crate::tools::{BoxFuture, Result, Tool};

/// `slack_get_users`: one page of workspace members
pub struct GetUsersTool {
    ctx: Arc<SlackToolContext>,
}

impl GetUsersTool {
    pub fn new(ctx: Arc<SlackToolContext>) -> Self {
        Self { ctx }
    }
}

impl Tool for GetUsersTool {
    fn name(&self) -> &str {
        "slack_get_users"
    }

    fn description(&self) -> &str {
        "Retrieve users with their basic profile information, one page at a time."
    }

    fn parameters_schema(&self) -> Value {
        object_schema(
            json!({
                "limit": limit_property(DEFAULT_LIMIT, "users"),
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
                "users.list",
                json!({ "limit": limit, "cursor": cursor }),
            )
            .await?;

            let page = UserPage {
                members: response.items("members").iter().map(User::from_raw).collect(),
                response_metadata: ResponseMetadata::new(response.next_cursor()),
            };
            Ok(serde_json::to_value(page)?)
        })
    }
}

/// `slack_get_user_profiles`: bulk profile lookup with per-id failures
pub struct UserProfilesTool {
    ctx: Arc<SlackToolContext>,
}

impl UserProfilesTool {
    pub fn new(ctx: Arc<SlackToolContext>) -> Self {
        Self { ctx }
    }
}

async fn lookup_profile(api: &dyn SlackApi, user_id: String) -> ProfileEntry {
    match api.call("users.profile.get", json!({ "user": user_id })).await {
        Ok(response) if response.ok() => ProfileEntry::Found {
            profile: response.get("profile").cloned().unwrap_or_else(|| json!({})),
            user_id,
        },
        Ok(response) => ProfileEntry::Failed {
            error: response.error().unwrap_or(UNKNOWN_ERROR).to_string(),
            user_id,
        },
        Err(e) => ProfileEntry::Failed {
            error: e.to_string(),
            user_id,
        },
    }
}

impl Tool for UserProfilesTool {
    fn name(&self) -> &str {
        "slack_get_user_profiles"
    }

    fn description(&self) -> &str {
        "Get multiple users' profile information in bulk. A lookup that fails for one user is \
         reported in that user's entry and does not fail the others."
    }

    fn parameters_schema(&self) -> Value {
        object_schema(
            json!({
                "user_ids": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Array of user IDs to retrieve profiles for"
                }
            }),
            &["user_ids"],
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<Value>> {
        Box::pin(async move {
            let user_ids = require_str_list(&params, "user_ids")?;
            let requested = user_ids.len();

            // Lookups are independent, so they run concurrently; join_all keeps input order
            let profiles = join_all(
                user_ids
                    .into_iter()
                    .map(|id| lookup_profile(self.ctx.bot(), id)),
            )
            .await;

            let failed = profiles.iter().filter(|p| p.is_error()).count();
            debug!(requested, failed, "profile lookup finished");

            Ok(serde_json::to_value(ProfileBatch { profiles })?)
        })
    }
}

/// `slack_search_users`: substring match over every workspace member
pub struct SearchUsersTool {
    ctx: Arc<SlackToolContext>,
}

impl SearchUsersTool {
    pub fn new(ctx: Arc<SlackToolContext>) -> Self {
        Self { ctx }
    }
}

fn user_matches<'a>(user: &'a Value, needle: &str) -> bool {
    let text = |v: Option<&'a Value>| v.and_then(|v| v.as_str());
    contains_ignore_case(text(user.get("name")), needle)
        || contains_ignore_case(text(user.get("real_name")), needle)
        || contains_ignore_case(
            text(user.get("profile").and_then(|p| p.get("display_name"))),
            needle,
        )
}

impl Tool for SearchUsersTool {
    fn name(&self) -> &str {
        "slack_search_users"
    }

    fn description(&self) -> &str {
        "Search for users by partial name match across username, display name, and real name. \
         Deleted users are excluded."
    }

    fn parameters_schema(&self) -> Value {
        object_schema(
            json!({
                "query": {
                    "type": "string",
                    "description": "Search query to match against user names, display names, or real names"
                },
                "limit": limit_property(DEFAULT_SEARCH_LIMIT, "users")
            }),
            &["query"],
        )
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<Value>> {
        Box::pin(async move {
            let query = require_str(&params, "query")?;
            let limit = optional_u64(&params, "limit")?.unwrap_or(DEFAULT_SEARCH_LIMIT) as usize;

            let all = collect_all(self.ctx.bot(), "users.list", json!({}), "members").await?;

            let needle = query.to_lowercase();
            let users: Vec<UserMatch> = all
                .iter()
                .filter(|u| !flag(u, "deleted"))
                .filter(|u| user_matches(u, &needle))
                .take(limit)
                .map(UserMatch::from_raw)
                .collect();

            let result = UserSearch {
                total: users.len(),
                users,
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
    async fn test_get_users_nested_profile() {
        let h = bot_only(ScriptedSlack::bot().reply(
            "users.list",
            json!({
                "ok": true,
                "members": [{
                    "id": "U1",
                    "name": "ada",
                    "real_name": "Ada Lovelace",
                    "tz": "Europe/London",
                    "is_bot": false,
                    "deleted": false,
                    "profile": {"display_name": "ada", "email": "ada@example.com", "image_48": "https://img/48", "phone": "x"}
                }],
                "response_metadata": {"next_cursor": ""}
            }),
        ));

        let out = GetUsersTool::new(Arc::clone(&h.context))
            .execute(json!({}))
            .await
            .unwrap();

        assert_eq!(
            out,
            json!({
                "members": [{
                    "id": "U1",
                    "name": "ada",
                    "real_name": "Ada Lovelace",
                    "profile": {"display_name": "ada", "email": "ada@example.com", "image_48": "https://img/48"},
                    "is_bot": false,
                    "deleted": false
                }],
                "response_metadata": {"next_cursor": null}
            })
        );
        assert_eq!(h.bot.calls()[0].1, json!({"limit": 100, "cursor": null}));
    }

    #[tokio::test]
    async fn test_get_users_missing_profile_is_null() {
        let h = bot_only(ScriptedSlack::bot().reply(
            "users.list",
            json!({"ok": true, "members": [{"id": "U2"}]}),
        ));
        let out = GetUsersTool::new(h.context).execute(json!({"limit": 1})).await.unwrap();
        assert_eq!(
            out["members"][0]["profile"],
            json!({"display_name": null, "email": null, "image_48": null})
        );
    }

    #[tokio::test]
    async fn test_profiles_partial_failure() {
        let h = bot_only(
            ScriptedSlack::bot()
                .reply(
                    "users.profile.get",
                    json!({"ok": true, "profile": {"real_name": "Ada", "email": "ada@example.com"}}),
                )
                .reply("users.profile.get", json!({"ok": false, "error": "user_not_found"})),
        );

        let out = UserProfilesTool::new(Arc::clone(&h.context))
            .execute(json!({"user_ids": ["UA", "UB"]}))
            .await
            .unwrap();

        let profiles = out["profiles"].as_array().unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0]["user_id"], json!("UA"));
        assert_eq!(profiles[0]["profile"]["real_name"], json!("Ada"));
        assert!(profiles[0].get("error").is_none());
        assert_eq!(profiles[1], json!({"user_id": "UB", "error": "user_not_found"}));
        assert_eq!(h.bot.calls_to("users.profile.get"), 2);
    }

    #[tokio::test]
    async fn test_profiles_transport_fault_is_per_item() {
        let h = bot_only(ScriptedSlack::bot().fault("users.profile.get", "timed out"));

        let out = UserProfilesTool::new(h.context)
            .execute(json!({"user_ids": ["UA"]}))
            .await
            .unwrap();

        let entry = &out["profiles"][0];
        assert_eq!(entry["user_id"], json!("UA"));
        assert!(entry["error"].as_str().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_profiles_empty_list() {
        let h = bot_only(ScriptedSlack::bot());
        let out = UserProfilesTool::new(Arc::clone(&h.context))
            .execute(json!({"user_ids": []}))
            .await
            .unwrap();
        assert_eq!(out, json!({"profiles": []}));
        assert!(h.bot.calls().is_empty());
    }

    #[tokio::test]
    async fn test_profiles_rejects_scalar_ids() {
        let h = bot_only(ScriptedSlack::bot());
        let err = UserProfilesTool::new(h.context)
            .execute(json!({"user_ids": "U1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_search_users_matches_any_name_field() {
        let h = bot_only(
            ScriptedSlack::bot()
                .reply(
                    "users.list",
                    json!({
                        "ok": true,
                        "members": [
                            {"id": "U1", "name": "jdoe", "real_name": "Jane Doe", "profile": {"display_name": "jane"}},
                            {"id": "U2", "name": "bob", "real_name": "Bob", "profile": {"display_name": "JaneFan"}},
                            {"id": "U3", "name": "jane.old", "deleted": true}
                        ],
                        "response_metadata": {"next_cursor": "p2"}
                    }),
                )
                .reply(
                    "users.list",
                    json!({
                        "ok": true,
                        "members": [
                            {"id": "U4", "name": "carol", "real_name": "Carol JANE Smith",
                             "is_bot": false, "deleted": false, "profile": {"email": "c@example.com"}}
                        ]
                    }),
                ),
        );

        let out = SearchUsersTool::new(Arc::clone(&h.context))
            .execute(json!({"query": "jane"}))
            .await
            .unwrap();

        let ids: Vec<&str> = out["users"]
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["U1", "U2", "U4"]);
        assert_eq!(out["total"], json!(3));
        assert_eq!(
            out["users"][2],
            json!({
                "id": "U4",
                "name": "carol",
                "real_name": "Carol JANE Smith",
                "display_name": null,
                "email": "c@example.com",
                "is_bot": false,
                "deleted": false
            })
        );

        let calls = h.bot.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1["limit"], json!(200));
        assert_eq!(calls[1].1["cursor"], json!("p2"));
    }

    #[tokio::test]
    async fn test_search_users_limit() {
        let h = bot_only(ScriptedSlack::bot().reply(
            "users.list",
            json!({"ok": true, "members": [{"id": "U1", "name": "sam"}, {"id": "U2", "name": "samantha"}]}),
        ));
        let out = SearchUsersTool::new(h.context)
            .execute(json!({"query": "sam", "limit": 1}))
            .await
            .unwrap();
        assert_eq!(out["total"], json!(1));
        assert_eq!(out["users"][0]["id"], json!("U1"));
    }

    #[tokio::test]
    async fn test_search_users_upstream_failure() {
        let h = bot_only(ScriptedSlack::bot().reply(
            "users.list",
            json!({"ok": false, "error": "missing_scope"}),
        ));
        let err = SearchUsersTool::new(h.context)
            .execute(json!({"query": "sam"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Upstream(ref code) if code == "missing_scope"));
    }
}
