use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::{NotionClient, Pagination};
use crate::envelope::ToolEnvelope;
use crate::execute::safe_execute;
use crate::mcp::Tool;
use crate::validation::is_valid_notion_id;

use super::paging::collect_all;
use super::params::{default_collect_page_size, non_empty};
use super::payload::{paragraph_block, rich_text, TEXT_BLOCK_TYPES};
use super::toolsets::Toolset;

/// Notion's limit on children appended in one request.
pub const MAX_BLOCKS_PER_REQUEST: usize = 100;

#[derive(Debug, Deserialize)]
pub struct AddMultiplePageContentArgs {
    pub parent_block_id: String,
    pub content_blocks: Vec<Value>,
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddPageContentArgs {
    pub parent_block_id: String,
    pub content_block: Value,
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppendBlockChildrenArgs {
    pub block_id: String,
    pub children: Vec<Value>,
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBlockArgs {
    pub block_id: String,
    pub block_type: String,
    pub content: String,
    #[serde(default)]
    pub additional_properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub struct BlockIdArgs {
    pub block_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FetchBlockContentsArgs {
    pub block_id: String,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub start_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FetchAllBlockContentsArgs {
    pub block_id: String,
    #[serde(default = "default_collect_page_size")]
    pub page_size: u32,
}

fn after_schema() -> Value {
    json!({"type": "string", "description": "ID of an existing child block to insert after"})
}

pub fn create_blocks_toolset(client: NotionClient, read_only: bool) -> Toolset {
    let mut toolset = Toolset::new("blocks", "Page content blocks");

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_FETCH_BLOCK_CONTENTS".to_string(),
            description: "Lists the child blocks of a page or block. Supports pagination.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "block_id": {"type": "string", "description": "ID of the parent block or page"},
                    "page_size": {"type": "integer", "description": "Blocks per page"},
                    "start_cursor": {"type": "string", "description": "Cursor from a previous response's next_cursor"}
                },
                "required": ["block_id"]
            }),
        },
        move |args: FetchBlockContentsArgs| {
            let client = c.clone();
            async move { fetch_block_contents(&client, args).await }
        },
    );

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_FETCH_ALL_BLOCK_CONTENTS".to_string(),
            description: "Lists every child block of a page or block, following pagination to the end.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "block_id": {"type": "string", "description": "ID of the parent block or page"},
                    "page_size": {"type": "integer", "description": "Blocks fetched per request (default 100)"}
                },
                "required": ["block_id"]
            }),
        },
        move |args: FetchAllBlockContentsArgs| {
            let client = c.clone();
            async move { fetch_all_block_contents(&client, args).await }
        },
    );

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_FETCH_BLOCK_METADATA".to_string(),
            description: "Retrieves a single block: type, parent, archived status and content.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {"block_id": {"type": "string", "description": "ID of the block"}},
                "required": ["block_id"]
            }),
        },
        move |args: BlockIdArgs| {
            let client = c.clone();
            async move { fetch_block_metadata(&client, args).await }
        },
    );

    if read_only {
        return toolset;
    }

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_ADD_MULTIPLE_PAGE_CONTENT".to_string(),
            description: "Appends up to 100 blocks to a page or block. Entries may be full block objects or {\"content\": text} paragraphs.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "parent_block_id": {"type": "string", "description": "ID of the page or block to append to"},
                    "content_blocks": {"type": "array", "description": "Blocks to append", "items": {"type": "object"}},
                    "after": after_schema()
                },
                "required": ["parent_block_id", "content_blocks"]
            }),
        },
        move |args: AddMultiplePageContentArgs| {
            let client = c.clone();
            async move { add_multiple_page_content(&client, args).await }
        },
    );

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_ADD_PAGE_CONTENT".to_string(),
            description: "Appends a single block to a page or block.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "parent_block_id": {"type": "string", "description": "ID of the page or block to append to"},
                    "content_block": {"type": "object", "description": "A Notion block object"},
                    "after": after_schema()
                },
                "required": ["parent_block_id", "content_block"]
            }),
        },
        move |args: AddPageContentArgs| {
            let client = c.clone();
            async move { add_page_content(&client, args).await }
        },
    );

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_APPEND_BLOCK_CHILDREN".to_string(),
            description: "Appends up to 100 child block objects to a parent block.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "block_id": {"type": "string", "description": "ID of the parent block"},
                    "children": {"type": "array", "description": "Block objects to append", "items": {"type": "object"}},
                    "after": after_schema()
                },
                "required": ["block_id", "children"]
            }),
        },
        move |args: AppendBlockChildrenArgs| {
            let client = c.clone();
            async move { append_block_children(&client, args).await }
        },
    );

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_UPDATE_BLOCK".to_string(),
            description: "Replaces the text of a block, e.g. a paragraph, heading or to-do. Other block types need additional_properties.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "block_id": {"type": "string", "description": "ID of the block"},
                    "block_type": {"type": "string", "description": "Block type, e.g. paragraph, heading_1, to_do"},
                    "content": {"type": "string", "description": "New text content"},
                    "additional_properties": {"type": "object", "description": "Extra fields such as {\"checked\": true} for to_do"}
                },
                "required": ["block_id", "block_type", "content"]
            }),
        },
        move |args: UpdateBlockArgs| {
            let client = c.clone();
            async move { update_block(&client, args).await }
        },
    );

    let c = client;
    toolset.add_tool(
        Tool {
            name: "NOTION_DELETE_BLOCK".to_string(),
            description: "Deletes a block by moving it to the trash.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {"block_id": {"type": "string", "description": "ID of the block"}},
                "required": ["block_id"]
            }),
        },
        move |args: BlockIdArgs| {
            let client = c.clone();
            async move { delete_block(&client, args).await }
        },
    );

    toolset
}

fn check_batch(blocks: &[Value], field: &str) -> Option<ToolEnvelope> {
    if blocks.is_empty() {
        return Some(ToolEnvelope::failure(format!("{} must be a non-empty list", field)));
    }
    if blocks.len() > MAX_BLOCKS_PER_REQUEST {
        return Some(ToolEnvelope::failure(format!(
            "Maximum {} blocks per request",
            MAX_BLOCKS_PER_REQUEST
        )));
    }
    None
}

fn check_after(after: Option<&str>) -> Option<ToolEnvelope> {
    match after {
        Some(id) if !is_valid_notion_id(id) => Some(ToolEnvelope::failure("Invalid after block ID")),
        _ => None,
    }
}

/// Accepts a full block object, or a `{"content": ...}` shorthand for a paragraph.
fn normalize_block(block: Value) -> Result<Value, String> {
    if block.get("object").and_then(Value::as_str) == Some("block") {
        return Ok(block);
    }
    if let Some(content) = block.get("content") {
        let text = match content {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Ok(paragraph_block(&text));
    }
    Err(format!("Invalid block format: {}", block))
}

fn append_body(children: Vec<Value>, after: Option<String>) -> Value {
    let mut body = Map::new();
    body.insert("children".to_string(), Value::Array(children));
    if let Some(after) = after {
        body.insert("after".to_string(), Value::String(after));
    }
    Value::Object(body)
}

pub async fn add_multiple_page_content(
    client: &NotionClient,
    args: AddMultiplePageContentArgs,
) -> ToolEnvelope {
    if !is_valid_notion_id(&args.parent_block_id) {
        return ToolEnvelope::failure("Invalid parent_block_id");
    }
    if let Some(failure) = check_batch(&args.content_blocks, "content_blocks") {
        return failure;
    }
    let after = non_empty(args.after);
    if let Some(failure) = check_after(after.as_deref()) {
        return failure;
    }

    let children = match args
        .content_blocks
        .into_iter()
        .map(normalize_block)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(children) => children,
        Err(message) => return ToolEnvelope::failure(message),
    };

    let body = append_body(children, after);
    safe_execute(Some("blocks.children.append"), || {
        client.blocks().children().append(&args.parent_block_id, body)
    })
    .await
}

pub async fn add_page_content(client: &NotionClient, args: AddPageContentArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.parent_block_id) {
        return ToolEnvelope::failure("Invalid parent_block_id");
    }
    if !args.content_block.is_object() {
        return ToolEnvelope::failure("content_block must be an object");
    }
    let after = non_empty(args.after);
    if let Some(failure) = check_after(after.as_deref()) {
        return failure;
    }

    let body = append_body(vec![args.content_block], after);
    safe_execute(Some("blocks.children.append"), || {
        client.blocks().children().append(&args.parent_block_id, body)
    })
    .await
}

pub async fn append_block_children(
    client: &NotionClient,
    args: AppendBlockChildrenArgs,
) -> ToolEnvelope {
    if !is_valid_notion_id(&args.block_id) {
        return ToolEnvelope::failure("Invalid block_id");
    }
    if let Some(failure) = check_batch(&args.children, "children") {
        return failure;
    }
    let after = non_empty(args.after);
    if let Some(failure) = check_after(after.as_deref()) {
        return failure;
    }

    let body = append_body(args.children, after);
    safe_execute(Some("blocks.children.append"), || {
        client.blocks().children().append(&args.block_id, body)
    })
    .await
}

pub async fn update_block(client: &NotionClient, args: UpdateBlockArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.block_id) {
        return ToolEnvelope::failure("Invalid block_id");
    }

    let block_type = args.block_type.trim().to_string();
    if block_type.is_empty() {
        return ToolEnvelope::failure("block_type is required");
    }

    let block_payload = if TEXT_BLOCK_TYPES.contains(&block_type.as_str()) {
        let mut payload = Map::new();
        payload.insert("rich_text".to_string(), rich_text(&args.content));
        if let Some(extra) = args.additional_properties {
            payload.extend(extra);
        }
        payload
    } else {
        match args.additional_properties {
            Some(extra) if !extra.is_empty() => extra,
            _ => {
                return ToolEnvelope::failure(format!(
                    "Unsupported block_type '{}' without additional_properties",
                    block_type
                ))
            }
        }
    };

    let mut body = Map::new();
    body.insert(block_type, Value::Object(block_payload));

    safe_execute(Some("blocks.update"), || {
        client.blocks().update(&args.block_id, Value::Object(body))
    })
    .await
}

pub async fn delete_block(client: &NotionClient, args: BlockIdArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.block_id) {
        return ToolEnvelope::failure("Invalid block_id");
    }

    safe_execute(Some("blocks.update"), || {
        client.blocks().update(&args.block_id, json!({ "archived": true }))
    })
    .await
}

pub async fn fetch_block_contents(client: &NotionClient, args: FetchBlockContentsArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.block_id) {
        return ToolEnvelope::failure("Invalid block_id");
    }

    let pagination = Pagination::new(args.page_size, non_empty(args.start_cursor));
    safe_execute(Some("blocks.children.list"), || {
        client.blocks().children().list(&args.block_id, &pagination)
    })
    .await
}

pub async fn fetch_all_block_contents(
    client: &NotionClient,
    args: FetchAllBlockContentsArgs,
) -> ToolEnvelope {
    if !is_valid_notion_id(&args.block_id) {
        return ToolEnvelope::failure("Invalid block_id");
    }

    let block_id = args.block_id.as_str();
    let page_size = args.page_size;
    collect_all("blocks.children.list", |cursor| async move {
        let pagination = Pagination::new(Some(page_size), cursor);
        client.blocks().children().list(block_id, &pagination).await
    })
    .await
}

pub async fn fetch_block_metadata(client: &NotionClient, args: BlockIdArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.block_id) {
        return ToolEnvelope::failure("Invalid block_id");
    }

    safe_execute(Some("blocks.retrieve"), || client.blocks().retrieve(&args.block_id)).await
}
