//! Human-readable message extraction from heterogeneous provider error bodies.

use std::fmt::Write;

use serde_json::Value;

/// Returned when the error body is empty.
pub const EMPTY_RESPONSE: &str = "Empty response";

/// Returned when the error body is an empty JSON object.
pub const UNKNOWN_ERROR: &str = "An unknown error occurred.";

/// Returned when the error body is JSON but neither an object nor a string.
pub const UNKNOWN_FORMAT: &str = "Unknown error format";

/// Extract a message from a raw error response body.
///
/// Precedence: `error.message` (with `error.code` appended), top-level
/// `message`, `detail` (string, or array of strings or `{msg}` objects), then a pretty-printed
/// dump of the whole body. Non-JSON bodies are returned as-is.
#[must_use]
pub fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => extract_from_value(&value),
        Err(_) if body.trim().is_empty() => EMPTY_RESPONSE.to_string(),
        Err(_) => body.to_string(),
    }
}

/// Extract a message from an already-parsed error body.
#[must_use]
pub fn extract_from_value(value: &Value) -> String {
    let object = match value {
        Value::String(s) => return s.clone(),
        Value::Object(map) => map,
        _ => return UNKNOWN_FORMAT.to_string(),
    };

    if let Some(message) = object.get("error").and_then(|e| e.get("message")).and_then(non_empty)
    {
        let mut message = message.to_string();
        if let Some(code) = object.get("error").and_then(|e| e.get("code")).and_then(code_text) {
            let _ = write!(message, " (Code: {code})");
        }
        return message;
    }

    if let Some(message) = object.get("message").and_then(non_empty) {
        return message.to_string();
    }

    match object.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => return detail.clone(),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|d| match d {
                    Value::String(s) => Some(s.as_str()),
                    other => other.get("msg").and_then(Value::as_str),
                })
                .filter(|m| !m.is_empty())
                .collect();
            if !messages.is_empty() {
                return messages.join(", ");
            }
        }
        _ => {}
    }

    if object.is_empty() {
        return UNKNOWN_ERROR.to_string();
    }

    match serde_json::to_string_pretty(value) {
        Ok(dump) => format!("Full error response: {dump}"),
        Err(_) => UNKNOWN_ERROR.to_string(),
    }
}

fn non_empty(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

fn code_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
