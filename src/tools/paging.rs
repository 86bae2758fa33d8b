use serde_json::{json, Value};
use std::future::Future;

use crate::envelope::ToolEnvelope;
use crate::error::Result;
use crate::execute::safe_execute;

/// Follows `next_cursor` until Notion reports no more pages, gathering every
/// page's `results`. The first failed page is returned as-is.
pub async fn collect_all<F, Fut>(label: &str, mut fetch: F) -> ToolEnvelope
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    let mut results: Vec<Value> = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = safe_execute(Some(label), || fetch(cursor.clone())).await;
        if !page.is_successful() {
            return page;
        }

        let data = page.into_data();
        if let Some(items) = data.get("results").and_then(Value::as_array) {
            results.extend(items.iter().cloned());
        }

        let has_more = data.get("has_more").and_then(Value::as_bool).unwrap_or(true);
        let next = data
            .get("next_cursor")
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        match next {
            Some(next) if has_more && cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
            _ => break,
        }
    }

    ToolEnvelope::success(json!({ "results": results }))
}
