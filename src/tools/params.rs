use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{NotionError, Result};

/// Decodes tool arguments into their typed form.
pub fn parse_args<A: DeserializeOwned>(args: Map<String, Value>) -> Result<A> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| NotionError::invalid(format!("Invalid arguments: {}", e)))
}

/// Treats blank strings the same as an absent value.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn default_users_page_size() -> u32 {
    30
}

pub fn default_query_page_size() -> u32 {
    10
}

pub fn default_collect_page_size() -> u32 {
    100
}

pub fn default_true() -> bool {
    true
}
