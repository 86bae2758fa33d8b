use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::{NotionClient, Pagination};
use crate::envelope::ToolEnvelope;
use crate::execute::safe_execute;
use crate::mcp::Tool;
use crate::validation::is_valid_notion_id;

use super::paging::collect_all;
use super::params::{default_collect_page_size, default_query_page_size, non_empty};
use super::payload::{emoji_icon, external_file, has_title_property, rich_text};
use super::toolsets::Toolset;

#[derive(Debug, Deserialize)]
pub struct CreateDatabaseArgs {
    pub parent_id: String,
    pub title: String,
    pub properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct InsertRowArgs {
    pub database_id: String,
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
pub struct SortArg {
    pub property: String,
    #[serde(default)]
    pub direction: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueryDatabaseArgs {
    pub database_id: String,
    #[serde(default = "default_query_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub sorts: Option<Vec<SortArg>>,
    #[serde(default)]
    pub start_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueryDatabaseAllArgs {
    pub database_id: String,
    #[serde(default = "default_collect_page_size")]
    pub page_size: u32,
}

#[derive(Debug, Deserialize)]
pub struct FetchDatabaseArgs {
    pub database_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FetchRowArgs {
    pub page_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRowArgs {
    pub page_id: String,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub archived: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSchemaArgs {
    pub database_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

fn database_id_schema() -> Value {
    json!({"type": "string", "description": "ID of the database"})
}

pub fn create_databases_toolset(client: NotionClient, read_only: bool) -> Toolset {
    let mut toolset = Toolset::new("databases", "Database schemas, rows and queries");

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_QUERY_DATABASE".to_string(),
            description: "Queries a database for rows, with optional sorting and pagination.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "database_id": database_id_schema(),
                    "page_size": {"type": "integer", "description": "Rows per page (default 10)"},
                    "sorts": {
                        "type": "array",
                        "description": "Sort criteria; direction defaults to ascending",
                        "items": {
                            "type": "object",
                            "properties": {
                                "property": {"type": "string"},
                                "direction": {"type": "string", "enum": ["ascending", "descending"]}
                            },
                            "required": ["property"]
                        }
                    },
                    "start_cursor": {"type": "string", "description": "Cursor from a previous response's next_cursor"}
                },
                "required": ["database_id"]
            }),
        },
        move |args: QueryDatabaseArgs| {
            let client = c.clone();
            async move { query_database(&client, args).await }
        },
    );

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_QUERY_DATABASE_ALL".to_string(),
            description: "Queries every row of a database, following pagination to the end.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "database_id": database_id_schema(),
                    "page_size": {"type": "integer", "description": "Rows fetched per request (default 100)"}
                },
                "required": ["database_id"]
            }),
        },
        move |args: QueryDatabaseAllArgs| {
            let client = c.clone();
            async move { query_database_all(&client, args).await }
        },
    );

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_FETCH_DATABASE".to_string(),
            description: "Retrieves a database's metadata: title, schema properties and parent.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {"database_id": database_id_schema()},
                "required": ["database_id"]
            }),
        },
        move |args: FetchDatabaseArgs| {
            let client = c.clone();
            async move { fetch_database(&client, args).await }
        },
    );

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_FETCH_ROW".to_string(),
            description: "Retrieves a database row (page) with all its properties.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {"page_id": {"type": "string", "description": "ID of the row's page"}},
                "required": ["page_id"]
            }),
        },
        move |args: FetchRowArgs| {
            let client = c.clone();
            async move { fetch_row(&client, args).await }
        },
    );

    if read_only {
        return toolset;
    }

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_CREATE_DATABASE".to_string(),
            description: "Creates a database under a parent page. The schema needs at least one title property.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "parent_id": {"type": "string", "description": "ID of the parent page"},
                    "title": {"type": "string", "description": "Database title"},
                    "properties": {"type": "object", "description": "Database schema in Notion's property format"}
                },
                "required": ["parent_id", "title", "properties"]
            }),
        },
        move |args: CreateDatabaseArgs| {
            let client = c.clone();
            async move { create_database(&client, args).await }
        },
    );

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_INSERT_ROW_DATABASE".to_string(),
            description: "Creates a row (page) in a database, optionally with icon, cover and content blocks.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "database_id": database_id_schema(),
                    "properties": {"type": "object", "description": "Property values matching the database schema"},
                    "icon": {"type": "string", "description": "Emoji icon"},
                    "cover": {"type": "string", "description": "External cover image URL"},
                    "children": {"type": "array", "description": "Block objects to add as page content", "items": {"type": "object"}}
                },
                "required": ["database_id", "properties"]
            }),
        },
        move |args: InsertRowArgs| {
            let client = c.clone();
            async move { insert_row(&client, args).await }
        },
    );

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_UPDATE_ROW_DATABASE".to_string(),
            description: "Updates a database row's properties, icon, cover or archive status.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "page_id": {"type": "string", "description": "ID of the row's page"},
                    "properties": {"type": "object", "description": "Property values to update"},
                    "icon": {"type": "string", "description": "Emoji icon"},
                    "cover": {"type": "string", "description": "External cover image URL"},
                    "archived": {"type": "boolean", "description": "true to archive the row"}
                },
                "required": ["page_id"]
            }),
        },
        move |args: UpdateRowArgs| {
            let client = c.clone();
            async move { update_row(&client, args).await }
        },
    );

    let c = client;
    toolset.add_tool(
        Tool {
            name: "NOTION_UPDATE_SCHEMA_DATABASE".to_string(),
            description: "Updates a database's title, description or property schema.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "database_id": database_id_schema(),
                    "title": {"type": "string", "description": "New title"},
                    "description": {"type": "string", "description": "New description"},
                    "properties": {"type": "object", "description": "Schema changes in Notion's property format"}
                },
                "required": ["database_id"]
            }),
        },
        move |args: UpdateSchemaArgs| {
            let client = c.clone();
            async move { update_schema(&client, args).await }
        },
    );

    toolset
}

pub async fn create_database(client: &NotionClient, args: CreateDatabaseArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.parent_id) {
        return ToolEnvelope::failure("Invalid parent_id format");
    }
    if !has_title_property(&args.properties) {
        return ToolEnvelope::failure("Database must have at least one title property");
    }

    let body = json!({
        "parent": { "type": "page_id", "page_id": args.parent_id },
        "title": rich_text(&args.title),
        "properties": args.properties,
    });

    safe_execute(Some("databases.create"), || client.databases().create(body)).await
}

pub async fn insert_row(client: &NotionClient, args: InsertRowArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.database_id) {
        return ToolEnvelope::failure("Invalid database_id format");
    }

    let mut body = Map::new();
    body.insert("parent".to_string(), json!({ "database_id": args.database_id }));
    body.insert("properties".to_string(), Value::Object(args.properties));
    if let Some(icon) = non_empty(args.icon) {
        body.insert("icon".to_string(), emoji_icon(&icon));
    }
    if let Some(cover) = non_empty(args.cover) {
        body.insert("cover".to_string(), external_file(&cover));
    }
    if let Some(children) = args.children.filter(|c| !c.is_empty()) {
        body.insert("children".to_string(), Value::Array(children));
    }

    safe_execute(Some("pages.create"), || client.pages().create(Value::Object(body))).await
}

pub async fn query_database(client: &NotionClient, args: QueryDatabaseArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.database_id) {
        return ToolEnvelope::failure("Invalid database_id format");
    }

    let mut body = Map::new();
    Pagination::new(Some(args.page_size), non_empty(args.start_cursor)).apply_body(&mut body);
    if let Some(sorts) = args.sorts.filter(|s| !s.is_empty()) {
        let sorts: Vec<Value> = sorts
            .into_iter()
            .map(|s| {
                json!({
                    "property": s.property,
                    "direction": s.direction.unwrap_or_else(|| "ascending".to_string()),
                })
            })
            .collect();
        body.insert("sorts".to_string(), Value::Array(sorts));
    }

    safe_execute(Some("databases.query"), || {
        client.databases().query(&args.database_id, Value::Object(body))
    })
    .await
}

pub async fn query_database_all(client: &NotionClient, args: QueryDatabaseAllArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.database_id) {
        return ToolEnvelope::failure("Invalid database_id format");
    }

    let database_id = args.database_id.as_str();
    let page_size = args.page_size;
    collect_all("databases.query", |cursor| {
        let mut body = Map::new();
        Pagination::new(Some(page_size), cursor).apply_body(&mut body);
        client.databases().query(database_id, Value::Object(body))
    })
    .await
}

pub async fn fetch_database(client: &NotionClient, args: FetchDatabaseArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.database_id) {
        return ToolEnvelope::failure("Invalid database_id format");
    }

    safe_execute(Some("databases.retrieve"), || {
        client.databases().retrieve(&args.database_id)
    })
    .await
}

pub async fn fetch_row(client: &NotionClient, args: FetchRowArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.page_id) {
        return ToolEnvelope::failure("Invalid page_id format");
    }

    safe_execute(Some("pages.retrieve"), || client.pages().retrieve(&args.page_id)).await
}

pub async fn update_row(client: &NotionClient, args: UpdateRowArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.page_id) {
        return ToolEnvelope::failure("Invalid page_id format");
    }

    let mut body = Map::new();
    if let Some(properties) = args.properties.filter(|p| !p.is_empty()) {
        body.insert("properties".to_string(), Value::Object(properties));
    }
    if let Some(icon) = non_empty(args.icon) {
        body.insert("icon".to_string(), emoji_icon(&icon));
    }
    if let Some(cover) = non_empty(args.cover) {
        body.insert("cover".to_string(), external_file(&cover));
    }
    if let Some(archived) = args.archived {
        body.insert("archived".to_string(), Value::Bool(archived));
    }

    safe_execute(Some("pages.update"), || {
        client.pages().update(&args.page_id, Value::Object(body))
    })
    .await
}

pub async fn update_schema(client: &NotionClient, args: UpdateSchemaArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.database_id) {
        return ToolEnvelope::failure("Invalid database_id format");
    }

    let mut body = Map::new();
    if let Some(title) = non_empty(args.title) {
        body.insert("title".to_string(), rich_text(&title));
    }
    if let Some(description) = non_empty(args.description) {
        body.insert("description".to_string(), rich_text(&description));
    }
    if let Some(properties) = args.properties.filter(|p| !p.is_empty()) {
        body.insert("properties".to_string(), Value::Object(properties));
    }

    safe_execute(Some("databases.update"), || {
        client.databases().update(&args.database_id, Value::Object(body))
    })
    .await
}
