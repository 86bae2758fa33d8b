//! The uniform result shape every Notion tool returns.

use serde::Serialize;
use serde_json::{Map, Value};

/// `{"successful": bool, "data": ..., "error": string|null}`.
///
/// A failed envelope always carries an empty object as `data` and a
/// message in `error`; a successful one never carries an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolEnvelope {
    successful: bool,
    data: Value,
    error: Option<String>,
}

impl ToolEnvelope {
    pub fn success(data: Value) -> Self {
        Self {
            successful: true,
            data,
            error: None,
        }
    }

    pub fn failure<S: Into<String>>(error: S) -> Self {
        let mut message = error.into();
        if message.is_empty() {
            message = "Unknown error".to_string();
        }

        Self {
            successful: false,
            data: Value::Object(Map::new()),
            error: Some(message),
        }
    }

    pub fn is_successful(&self) -> bool {
        self.successful
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn into_data(self) -> Value {
        self.data
    }

    /// Replaces `data` of a successful envelope. Failed envelopes pass through untouched.
    pub fn map_data<F>(self, f: F) -> Self
    where
        F: FnOnce(Value) -> Value,
    {
        if self.successful {
            Self::success(f(self.data))
        } else {
            self
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "successful": self.successful,
            "data": self.data,
            "error": self.error,
        })
    }
}
