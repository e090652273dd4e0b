use serde::Deserialize;
use serde_json::Value;

/// One decoded payload from an execution stream, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// An intermediate reasoning or tool-call step
    Message {
        #[serde(default)]
        content: Value,
        #[serde(default)]
        timestamp: Option<Value>,
    },
    /// The final output. The run continues until `complete`.
    Result {
        #[serde(default)]
        content: Value,
    },
    Complete {
        #[serde(default)]
        execution_id: Option<Value>,
    },
    Error {
        #[serde(default)]
        message: Option<Value>,
        #[serde(default)]
        content: Option<Value>,
    },
}

impl StreamEvent {
    /// Decode a payload. Returns `None` for anything that is not a known event
    /// (keep-alives, empty data, unknown types, malformed JSON).
    pub fn parse(data: &str) -> Option<Self> {
        serde_json::from_str(data).ok()
    }

    /// Message for an `error` event, falling back to a generic one.
    pub fn error_message(message: Option<&Value>, content: Option<&Value>) -> String {
        [message, content]
            .into_iter()
            .flatten()
            .find(|v| !v.is_null())
            .map(text)
            .unwrap_or_else(|| "execution failed".to_string())
    }
}

/// Render payload content as text; non-string JSON is kept in its JSON form.
pub fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
