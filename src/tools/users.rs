use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::{NotionClient, Pagination};
use crate::envelope::ToolEnvelope;
use crate::execute::safe_execute;
use crate::mcp::Tool;
use crate::validation::is_valid_notion_id;

use super::params::{default_users_page_size, non_empty};
use super::toolsets::Toolset;

#[derive(Debug, Default, Deserialize)]
pub struct GetAboutMeArgs {}

#[derive(Debug, Deserialize)]
pub struct ListUsersArgs {
    #[serde(default = "default_users_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub start_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetAboutUserArgs {
    pub user_id: String,
}

pub fn create_users_toolset(client: NotionClient) -> Toolset {
    let mut toolset = Toolset::new("users", "Workspace users and the integration's bot user");

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_GET_ABOUT_ME".to_string(),
            description: "Retrieves the bot user for the authenticated Notion integration token.".to_string(),
            input_schema: json!({"type": "object", "properties": {}, "required": []}),
        },
        move |args: GetAboutMeArgs| {
            let client = c.clone();
            async move { get_about_me(&client, args).await }
        },
    );

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_LIST_USERS".to_string(),
            description: "Lists users in the workspace, including bots, as id/name pairs. Supports pagination.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "page_size": {
                        "type": "integer",
                        "description": "Maximum number of users to return (default 30)"
                    },
                    "start_cursor": {
                        "type": "string",
                        "description": "Cursor from a previous response's next_cursor"
                    }
                },
                "required": []
            }),
        },
        move |args: ListUsersArgs| {
            let client = c.clone();
            async move { list_users(&client, args).await }
        },
    );

    let c = client;
    toolset.add_tool(
        Tool {
            name: "NOTION_GET_ABOUT_USER".to_string(),
            description: "Retrieves a single user by ID.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "user_id": {
                        "type": "string",
                        "description": "ID of the user to retrieve"
                    }
                },
                "required": ["user_id"]
            }),
        },
        move |args: GetAboutUserArgs| {
            let client = c.clone();
            async move { get_about_user(&client, args).await }
        },
    );

    toolset
}

pub async fn get_about_me(client: &NotionClient, _args: GetAboutMeArgs) -> ToolEnvelope {
    safe_execute(Some("users.me"), || client.users().me()).await
}

pub async fn list_users(client: &NotionClient, args: ListUsersArgs) -> ToolEnvelope {
    let pagination = Pagination::new(Some(args.page_size), non_empty(args.start_cursor));

    safe_execute(Some("users.list"), || client.users().list(&pagination))
        .await
        .map_data(simplify_users)
}

/// Keeps only `id` and `name` per user; pagination fields pass through.
fn simplify_users(data: Value) -> Value {
    let users: Vec<Value> = data
        .get("results")
        .and_then(Value::as_array)
        .map(|users| {
            users
                .iter()
                .map(|u| {
                    json!({
                        "id": u.get("id").cloned().unwrap_or(Value::Null),
                        "name": u.get("name").and_then(Value::as_str).unwrap_or("Unknown"),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    json!({
        "results": users,
        "has_more": data.get("has_more").cloned().unwrap_or(Value::Bool(false)),
        "next_cursor": data.get("next_cursor").cloned().unwrap_or(Value::Null),
    })
}

pub async fn get_about_user(client: &NotionClient, args: GetAboutUserArgs) -> ToolEnvelope {
    if !is_valid_notion_id(&args.user_id) {
        return ToolEnvelope::failure("Invalid user ID format");
    }

    safe_execute(Some("users.retrieve"), || client.users().retrieve(&args.user_id)).await
}
