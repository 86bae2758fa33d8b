use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::{NotionClient, Pagination};
use crate::envelope::ToolEnvelope;
use crate::execute::safe_execute;
use crate::mcp::Tool;
use crate::validation::is_valid_notion_id;

use super::params::{default_true, non_empty};
use super::payload::{emoji_icon, external_file, find_title_key, page_title, title_value};
use super::toolsets::Toolset;

const DEFAULT_TITLE_PROPERTY: &str = "Name";

#[derive(Debug, Deserialize)]
pub struct CreatePageArgs {
    pub parent_id: String,
    pub title: String,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePageArgs {
    pub page_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub archived: Option<bool>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub icon_emoji: Option<String>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub struct GetPagePropertyArgs {
    pub page_id: String,
    pub property_id: String,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub start_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArchivePageArgs {
    pub page_id: String,
    #[serde(default = "default_true")]
    pub archive: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListPagesArgs {
    #[serde(default)]
    pub keyword: Option<String>,
}

pub fn create_pages_toolset(client: NotionClient, read_only: bool) -> Toolset {
    let mut toolset = Toolset::new("pages", "Page creation, updates and lookup");

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_GET_PAGE_PROPERTY_ACTION".to_string(),
            description: "Retrieves the value of a single page property. Supports pagination for list-valued properties.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "page_id": {"type": "string", "description": "ID of the page"},
                    "property_id": {"type": "string", "description": "ID of the property to retrieve"},
                    "page_size": {"type": "integer", "description": "Items per page for paginated properties"},
                    "start_cursor": {"type": "string", "description": "Cursor from a previous response's next_cursor"}
                },
                "required": ["page_id", "property_id"]
            }),
        },
        move |args: GetPagePropertyArgs| {
            let client = c.clone();
            async move { get_page_property(&client, args).await }
        },
    );

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "list_pages".to_string(),
            description: "Lists accessible pages as id/title/url, optionally filtered by a title keyword.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "keyword": {"type": "string", "description": "Keyword to match against page titles"}
                },
                "required": []
            }),
        },
        move |args: ListPagesArgs| {
            let client = c.clone();
            async move { list_pages(&client, args).await }
        },
    );

    if read_only {
        return toolset;
    }

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_CREATE_NOTION_PAGE".to_string(),
            description: "Creates a page under a parent page, with optional cover image URL and emoji icon.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "parent_id": {"type": "string", "description": "ID of the parent page"},
                    "title": {"type": "string", "description": "Title of the new page"},
                    "cover": {"type": "string", "description": "External cover image URL"},
                    "icon": {"type": "string", "description": "Emoji icon, e.g. \"🎉\""}
                },
                "required": ["parent_id", "title"]
            }),
        },
        move |args: CreatePageArgs| {
            let client = c.clone();
            async move { create_page(&client, args).await }
        },
    );

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_UPDATE_PAGE".to_string(),
            description: "Updates a page's title, icon, cover, archive status or other properties.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "page_id": {"type": "string", "description": "ID of the page to update"},
                    "title": {"type": "string", "description": "New page title"},
                    "archived": {"type": "boolean", "description": "true to archive, false to restore"},
                    "cover_url": {"type": "string", "description": "New external cover image URL"},
                    "icon_emoji": {"type": "string", "description": "New emoji icon"},
                    "properties": {"type": "object", "description": "Page properties to update, in Notion's property format"}
                },
                "required": ["page_id"]
            }),
        },
        move |args: UpdatePageArgs| {
            let client = c.clone();
            async move { update_page(&client, args).await }
        },
    );

    let c = client;
    toolset.add_tool(
        Tool {
            name: "NOTION_ARCHIVE_NOTION_PAGE".to_string(),
            description: "Moves a page to the trash, or restores it when archive is false.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "page_id": {"type": "string", "description": "ID of the page"},
                    "archive": {"type": "boolean", "description": "true to archive (default), false to restore"}
                },
                "required": ["page_id"]
            }),
        },
        move |args: ArchivePageArgs| {
            let client = c.clone();
            async move { archive_page(&client, args).await }
        },
    );

    toolset
}

pub async fn create_page(client: &NotionClient, args: CreatePageArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.parent_id) {
        return ToolEnvelope::failure("Invalid parent ID format");
    }

    let mut body = Map::new();
    body.insert("parent".to_string(), json!({ "page_id": args.parent_id }));
    body.insert(
        "properties".to_string(),
        json!({ "title": title_value(&args.title) }),
    );
    if let Some(cover) = non_empty(args.cover) {
        body.insert("cover".to_string(), external_file(&cover));
    }
    if let Some(icon) = non_empty(args.icon) {
        body.insert("icon".to_string(), emoji_icon(&icon));
    }

    safe_execute(Some("pages.create"), || client.pages().create(Value::Object(body))).await
}

pub async fn update_page(client: &NotionClient, args: UpdatePageArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.page_id) {
        return ToolEnvelope::failure("Invalid page_id format");
    }

    let mut body = Map::new();
    if let Some(archived) = args.archived {
        body.insert("archived".to_string(), Value::Bool(archived));
    }
    if let Some(cover) = non_empty(args.cover_url) {
        body.insert("cover".to_string(), external_file(&cover));
    }
    if let Some(icon) = non_empty(args.icon_emoji) {
        body.insert("icon".to_string(), emoji_icon(&icon));
    }

    let mut properties = Map::new();
    if let Some(title) = non_empty(args.title) {
        // The title property can be renamed per database, so look up its key.
        let page = safe_execute(Some("pages.retrieve"), || client.pages().retrieve(&args.page_id)).await;
        let title_key = page
            .data()
            .get("properties")
            .and_then(Value::as_object)
            .and_then(find_title_key)
            .unwrap_or_else(|| DEFAULT_TITLE_PROPERTY.to_string());
        properties.insert(title_key, title_value(&title));
    }
    if let Some(extra) = args.properties {
        properties.extend(extra);
    }
    if !properties.is_empty() {
        body.insert("properties".to_string(), Value::Object(properties));
    }

    safe_execute(Some("pages.update"), || {
        client.pages().update(&args.page_id, Value::Object(body))
    })
    .await
}

pub async fn get_page_property(client: &NotionClient, args: GetPagePropertyArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.page_id) {
        return ToolEnvelope::failure("Invalid page_id format");
    }
    if args.property_id.trim().is_empty() {
        return ToolEnvelope::failure("property_id is required");
    }

    let pagination = Pagination::new(args.page_size, non_empty(args.start_cursor));
    safe_execute(Some("pages.properties.retrieve"), || {
        client
            .pages()
            .property(&args.page_id, &args.property_id, &pagination)
    })
    .await
}

pub async fn archive_page(client: &NotionClient, args: ArchivePageArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.page_id) {
        return ToolEnvelope::failure("Invalid page_id format");
    }

    safe_execute(Some("pages.update"), || {
        client
            .pages()
            .update(&args.page_id, json!({ "archived": args.archive }))
    })
    .await
}

pub async fn list_pages(client: &NotionClient, args: ListPagesArgs) -> ToolEnvelope {
    let mut body = Map::new();
    body.insert(
        "filter".to_string(),
        json!({ "property": "object", "value": "page" }),
    );
    if let Some(keyword) = non_empty(args.keyword) {
        body.insert("query".to_string(), Value::String(keyword));
    }

    safe_execute(Some("search"), || client.search(Value::Object(body)))
        .await
        .map_data(summarize_pages)
}

fn summarize_pages(data: Value) -> Value {
    let pages: Vec<Value> = data
        .get("results")
        .and_then(Value::as_array)
        .map(|pages| {
            pages
                .iter()
                .map(|page| {
                    json!({
                        "id": page.get("id").cloned().unwrap_or(Value::Null),
                        "title": page_title(page).unwrap_or_else(|| "Untitled".to_string()),
                        "url": page.get("url").cloned().unwrap_or(Value::Null),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Value::Array(pages)
}
