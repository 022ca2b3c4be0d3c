//! Capturing invocation values as JSON, with a size cap.

use serde::Serialize;
use serde_json::{json, Map, Value};

const PREVIEW_LENGTH: usize = 100;

/// Serializes `value` into JSON. Values that cannot be serialized are
/// captured as a string describing the error.
pub fn capture<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| Value::String(format!("<unserializable: {}>", e)))
}

/// [`capture`] followed by [`truncate`].
pub fn capture_capped<T: Serialize + ?Sized>(value: &T, max_length: usize) -> Value {
    truncate(capture(value), max_length)
}

/// Replaces a value whose serialized form is longer than `max_length`
/// characters by a preview object:
///
/// ```json
/// {"_truncated": true, "_type": "array", "_length": 5012, "_preview": "[1,2,3,...", "_count": 1200}
/// ```
///
/// `_count` is only present for arrays and objects.
pub fn truncate(value: Value, max_length: usize) -> Value {
    let serialized = match &value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let length = serialized.chars().count();
    if length <= max_length {
        return value;
    }

    let preview: String = serialized.chars().take(PREVIEW_LENGTH.min(max_length)).collect();
    let mut truncated = Map::new();
    truncated.insert("_truncated".to_string(), Value::Bool(true));
    truncated.insert("_type".to_string(), json!(type_of(&value)));
    truncated.insert("_length".to_string(), json!(length));
    truncated.insert("_preview".to_string(), Value::String(preview));
    match &value {
        Value::Array(items) => {
            truncated.insert("_count".to_string(), json!(items.len()));
        }
        Value::Object(fields) => {
            truncated.insert("_count".to_string(), json!(fields.len()));
        }
        _ => {}
    }

    Value::Object(truncated)
}

fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Text of a value inside a message: strings as-is, everything else as
/// compact JSON.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
