//! Builders for the nested request shapes Notion expects.

use serde_json::{json, Map, Value};

/// Block types whose content lives in a `rich_text` array.
pub const TEXT_BLOCK_TYPES: &[&str] = &[
    "paragraph",
    "heading_1",
    "heading_2",
    "heading_3",
    "bulleted_list_item",
    "numbered_list_item",
    "quote",
    "to_do",
];

pub fn rich_text(content: &str) -> Value {
    json!([{ "type": "text", "text": { "content": content } }])
}

pub fn title_value(content: &str) -> Value {
    json!({ "title": [{ "text": { "content": content } }] })
}

pub fn external_file(url: &str) -> Value {
    json!({ "external": { "url": url } })
}

pub fn emoji_icon(emoji: &str) -> Value {
    json!({ "emoji": emoji })
}

pub fn paragraph_block(content: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": { "rich_text": rich_text(content) }
    })
}

fn is_title_property(value: &Value) -> bool {
    value.as_object().is_some_and(|obj| obj.contains_key("title"))
}

/// Name of the first property that carries a `title` entry.
pub fn find_title_key(properties: &Map<String, Value>) -> Option<String> {
    properties
        .iter()
        .find(|(_, value)| is_title_property(value))
        .map(|(key, _)| key.clone())
}

pub fn has_title_property(properties: &Map<String, Value>) -> bool {
    properties.values().any(is_title_property)
}

/// Concatenated plain text of a page's title property.
pub fn page_title(page: &Value) -> Option<String> {
    let properties = page.get("properties")?.as_object()?;
    let title_prop = properties.values().find(|v| is_title_property(v))?;

    let title: String = title_prop
        .get("title")?
        .as_array()?
        .iter()
        .filter_map(|t| t.get("plain_text").and_then(Value::as_str))
        .collect();

    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}
