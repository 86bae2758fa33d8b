use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::{NotionClient, Pagination};
use crate::envelope::ToolEnvelope;
use crate::error::NotionError;
use crate::execute::safe_execute;
use crate::mcp::Tool;
use crate::validation::{is_valid_notion_id, same_notion_id};

use super::params::{default_collect_page_size, non_empty};
use super::payload::rich_text;
use super::toolsets::Toolset;

#[derive(Debug, Deserialize)]
pub struct CreateCommentArgs {
    pub comment: Map<String, Value>,
    #[serde(default)]
    pub discussion_id: Option<String>,
    #[serde(default)]
    pub parent_page_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetCommentByIdArgs {
    pub parent_block_id: String,
    pub comment_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FetchCommentsArgs {
    pub block_id: String,
    #[serde(default = "default_collect_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub start_cursor: Option<String>,
}

pub fn create_comments_toolset(client: NotionClient, read_only: bool) -> Toolset {
    let mut toolset = Toolset::new("comments", "Page and discussion comments");

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_GET_COMMENT_BY_ID".to_string(),
            description: "Finds one comment by ID among the comments of a page or block.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "parent_block_id": {"type": "string", "description": "ID of the page or block holding the comment"},
                    "comment_id": {"type": "string", "description": "ID of the comment"}
                },
                "required": ["parent_block_id", "comment_id"]
            }),
        },
        move |args: GetCommentByIdArgs| {
            let client = c.clone();
            async move { get_comment_by_id(&client, args).await }
        },
    );

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_FETCH_COMMENTS".to_string(),
            description: "Lists unresolved comments on a page or block. Supports pagination.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "block_id": {"type": "string", "description": "ID of the page or block"},
                    "page_size": {"type": "integer", "description": "Comments per page (default 100)"},
                    "start_cursor": {"type": "string", "description": "Cursor from a previous response's next_cursor"}
                },
                "required": ["block_id"]
            }),
        },
        move |args: FetchCommentsArgs| {
            let client = c.clone();
            async move { fetch_comments(&client, args).await }
        },
    );

    if read_only {
        return toolset;
    }

    let c = client;
    toolset.add_tool(
        Tool {
            name: "NOTION_CREATE_COMMENT".to_string(),
            description: "Adds a comment to a page, or replies in an existing discussion thread.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "comment": {
                        "type": "object",
                        "description": "Comment body, e.g. {\"content\": \"Looks good\"}",
                        "properties": {"content": {"type": "string"}}
                    },
                    "discussion_id": {"type": "string", "description": "Discussion thread to reply in"},
                    "parent_page_id": {"type": "string", "description": "Page to start a new thread on"}
                },
                "required": ["comment"]
            }),
        },
        move |args: CreateCommentArgs| {
            let client = c.clone();
            async move { create_comment(&client, args).await }
        },
    );

    toolset
}

pub async fn create_comment(client: &NotionClient, args: CreateCommentArgs) -> ToolEnvelope {
    let content = args
        .comment
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let mut body = Map::new();
    body.insert("rich_text".to_string(), rich_text(content));

    match (non_empty(args.discussion_id), non_empty(args.parent_page_id)) {
        (Some(discussion_id), _) => {
            if !is_valid_notion_id(&discussion_id) {
                return ToolEnvelope::failure("Invalid discussion_id");
            }
            body.insert("discussion_id".to_string(), Value::String(discussion_id));
        }
        (None, Some(page_id)) => {
            if !is_valid_notion_id(&page_id) {
                return ToolEnvelope::failure("Invalid parent_page_id");
            }
            body.insert(
                "parent".to_string(),
                json!({ "type": "page_id", "page_id": page_id }),
            );
        }
        (None, None) => {
            return ToolEnvelope::failure("Either discussion_id or parent_page_id must be provided.")
        }
    }

    safe_execute(Some("comments.create"), || client.comments().create(Value::Object(body))).await
}

pub async fn get_comment_by_id(client: &NotionClient, args: GetCommentByIdArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.parent_block_id) {
        return ToolEnvelope::failure("Invalid parent_block_id");
    }
    if !is_valid_notion_id(&args.comment_id) {
        return ToolEnvelope::failure("Invalid comment_id");
    }

    let block_id = args.parent_block_id.as_str();
    let comment_id = args.comment_id.as_str();
    safe_execute(Some("comments.list"), || async move {
        let pagination = Pagination::new(Some(default_collect_page_size()), None);
        let mut listed = client.comments().list(block_id, &pagination).await?;
        take_comment(&mut listed, comment_id).ok_or_else(|| {
            NotionError::NotFound(format!("Comment with ID {} not found.", comment_id))
        })
    })
    .await
}

fn take_comment(listed: &mut Value, comment_id: &str) -> Option<Value> {
    let comments = listed.get_mut("results")?.as_array_mut()?;
    let idx = comments.iter().position(|c| {
        c.get("id")
            .and_then(Value::as_str)
            .is_some_and(|id| same_notion_id(id, comment_id))
    })?;
    Some(comments.swap_remove(idx))
}

pub async fn fetch_comments(client: &NotionClient, args: FetchCommentsArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.block_id) {
        return ToolEnvelope::failure("Invalid block_id");
    }

    let pagination = Pagination::new(Some(args.page_size), non_empty(args.start_cursor));
    safe_execute(Some("comments.list"), || {
        client.comments().list(&args.block_id, &pagination)
    })
    .await
}
