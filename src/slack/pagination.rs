//! Cursor pagination
//!
//! Walks a Slack listing method page by page until the upstream stops
//! returning a `next_cursor`. Pages are fetched strictly in sequence since
//! each request needs the cursor from the previous response.

use serde_json::Value;
use tracing::debug;

use super::{call_ok, SlackApi, SlackError};

/// Page size requested from listing methods when walking a full collection.
pub const PAGE_SIZE: u32 = 200;

/// Fetch every page of `method` and return the concatenated `collection_key`
/// arrays in upstream order.
///
/// `params` is sent with every page; `limit` and `cursor` are set here. The
/// first failing page fails the whole walk and nothing collected so far is
/// returned.
pub async fn collect_all(
    api: &dyn SlackApi,
    method: &str,
    params: Value,
    collection_key: &str,
) -> Result<Vec<Value>, SlackError> {
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let mut request = params.clone();
        if let Some(obj) = request.as_object_mut() {
            obj.insert("limit".to_string(), Value::from(PAGE_SIZE));
            obj.insert(
                "cursor".to_string(),
                cursor.take().map(Value::String).unwrap_or(Value::Null),
            );
        }

        let response = call_ok(api, method, request).await?;
        pages += 1;
        items.extend(response.items(collection_key).iter().cloned());

        match response.next_cursor() {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    debug!(
        method,
        scope = api.scope().as_str(),
        pages,
        items = items.len(),
        "Collected paginated listing"
    );
    Ok(items)
}
