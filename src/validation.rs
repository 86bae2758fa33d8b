//! Shape checks for Notion object identifiers.
//!
//! Notion hands out IDs both hyphenated and compact, in either case. Only the
//! charset and the length (32 to 36) are enforced; hyphen placement is not.

use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

static NOTION_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F-]{32,36}$").expect("static regex"));

pub fn is_valid_notion_id(candidate: &str) -> bool {
    !candidate.is_empty() && NOTION_ID_RE.is_match(candidate)
}

/// Compares two IDs regardless of hyphenation and case.
pub fn same_notion_id(a: &str, b: &str) -> bool {
    match (Uuid::try_parse(a), Uuid::try_parse(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => compact(a) == compact(b),
    }
}

fn compact(id: &str) -> String {
    id.chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
