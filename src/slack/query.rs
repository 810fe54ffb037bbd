//! Search query builder
//!
//! Slack's `search.messages` takes a single query string with inline
//! modifiers (`in:`, `from:`, `before:` ...). [`SearchFilter`] holds the
//! structured fields and renders them in a fixed order.

/// Structured search filters. Every field is optional; an all-empty filter
/// renders to `""`, which Slack treats as "match everything".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    /// Free text
    pub text: Option<String>,
    /// Channel *name* (already resolved from an id)
    pub channel_name: Option<String>,
    /// Author user id
    pub from_user: Option<String>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub on: Option<String>,
    /// Period such as `July` or `2023`
    pub during: Option<String>,
}

impl SearchFilter {
    /// Render the query string. Dates are passed through unchecked.
    pub fn to_query(&self) -> String {
        let modifiers = [
            self.text.as_deref().map(|t| t.trim().to_string()),
            self.channel_name.as_deref().map(|c| format!("in:{c}")),
            self.from_user.as_deref().map(|u| format!("from:<@{u}>")),
            self.before.as_deref().map(|d| format!("before:{d}")),
            self.after.as_deref().map(|d| format!("after:{d}")),
            self.on.as_deref().map(|d| format!("on:{d}")),
            self.during.as_deref().map(|p| format!("during:{p}")),
        ];

        modifiers
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}
