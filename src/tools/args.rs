//! Typed argument extraction
//!
//! Tool arguments arrive as a JSON object. These helpers check each field's
//! type at the boundary and fail with [`ToolError::InvalidArgument`].
//! A `null` field is treated the same as an absent one.

use serde_json::Value;

use super::{Result, ToolError};

fn present<'a>(args: &'a Value, key: &str) -> Option<&'a Value> {
    args.get(key).filter(|v| !v.is_null())
}

fn wrong_type(key: &str, expected: &str) -> ToolError {
    ToolError::InvalidArgument(format!("parameter '{key}' must be {expected}"))
}

/// Required string parameter
pub fn require_str(args: &Value, key: &str) -> Result<String> {
    match present(args, key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(wrong_type(key, "a string")),
        None => Err(ToolError::InvalidArgument(format!(
            "missing required parameter: {key}"
        ))),
    }
}

/// Optional string parameter. An empty string counts as not supplied.
pub fn optional_str(args: &Value, key: &str) -> Result<Option<String>> {
    match present(args, key) {
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(wrong_type(key, "a string")),
        None => Ok(None),
    }
}

/// Optional non-negative integer parameter
pub fn optional_u64(args: &Value, key: &str) -> Result<Option<u64>> {
    match present(args, key) {
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| wrong_type(key, "a non-negative integer")),
        None => Ok(None),
    }
}

/// Optional boolean parameter
pub fn optional_bool(args: &Value, key: &str) -> Result<Option<bool>> {
    match present(args, key) {
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| wrong_type(key, "a boolean")),
        None => Ok(None),
    }
}

/// Required list of strings
pub fn require_str_list(args: &Value, key: &str) -> Result<Vec<String>> {
    let items = match present(args, key) {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(wrong_type(key, "a list of strings")),
        None => {
            return Err(ToolError::InvalidArgument(format!(
                "missing required parameter: {key}"
            )))
        }
    };
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(|s| s.to_string())
                .ok_or_else(|| wrong_type(key, "a list of strings"))
        })
        .collect()
}
