use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::{NotionClient, Pagination};
use crate::envelope::ToolEnvelope;
use crate::execute::safe_execute;
use crate::mcp::Tool;

use super::params::{default_collect_page_size, default_query_page_size, non_empty};
use super::toolsets::Toolset;

#[derive(Debug, Deserialize)]
pub struct SearchPageArgs {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default = "default_query_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub start_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FetchDataArgs {
    #[serde(default)]
    pub get_all: bool,
    #[serde(default)]
    pub get_databases: bool,
    #[serde(default)]
    pub get_pages: bool,
    #[serde(default = "default_collect_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub query: Option<String>,
}

/// Which object kinds a search should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchScope {
    Everything,
    Databases,
    Pages,
}

impl SearchScope {
    /// `get_all` wins over `get_databases`; with no flag set, pages are fetched.
    fn from_flags(args: &FetchDataArgs) -> Self {
        if args.get_all {
            SearchScope::Everything
        } else if args.get_databases {
            SearchScope::Databases
        } else {
            SearchScope::Pages
        }
    }

    fn filter(self) -> Option<Value> {
        match self {
            SearchScope::Everything => None,
            SearchScope::Databases => Some(json!({"property": "object", "value": "database"})),
            SearchScope::Pages => Some(json!({"property": "object", "value": "page"})),
        }
    }
}

pub fn create_search_toolset(client: NotionClient) -> Toolset {
    let mut toolset = Toolset::new("search", "Title search across pages and databases");

    let c = client.clone();
    toolset.add_tool(
        Tool {
            name: "NOTION_SEARCH_NOTION_PAGE".to_string(),
            description: "Searches pages and databases by title. An empty query returns everything the integration can access.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Search text (default empty)"},
                    "page_size": {"type": "integer", "description": "Results per page (default 10)"},
                    "start_cursor": {"type": "string", "description": "Cursor from a previous response's next_cursor"}
                },
                "required": []
            }),
        },
        move |args: SearchPageArgs| {
            let client = c.clone();
            async move { search_pages(&client, args).await }
        },
    );

    let c = client;
    toolset.add_tool(
        Tool {
            name: "NOTION_FETCH_DATA".to_string(),
            description: "Fetches pages, databases or both. Defaults to pages when no flag is set.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "get_all": {"type": "boolean", "description": "Fetch both pages and databases"},
                    "get_databases": {"type": "boolean", "description": "Fetch only databases"},
                    "get_pages": {"type": "boolean", "description": "Fetch only pages"},
                    "page_size": {"type": "integer", "description": "Results per page (default 100)"},
                    "query": {"type": "string", "description": "Keyword to narrow results"}
                },
                "required": []
            }),
        },
        move |args: FetchDataArgs| {
            let client = c.clone();
            async move { fetch_data(&client, args).await }
        },
    );

    toolset
}

pub async fn search_pages(client: &NotionClient, args: SearchPageArgs) -> ToolEnvelope {
    let mut body = Map::new();
    body.insert(
        "query".to_string(),
        Value::String(args.query.unwrap_or_default()),
    );
    Pagination::new(Some(args.page_size), non_empty(args.start_cursor)).apply_body(&mut body);

    safe_execute(Some("search"), || client.search(Value::Object(body))).await
}

pub async fn fetch_data(client: &NotionClient, args: FetchDataArgs) -> ToolEnvelope {
    let scope = SearchScope::from_flags(&args);

    let mut body = Map::new();
    Pagination::new(Some(args.page_size), None).apply_body(&mut body);
    if let Some(query) = non_empty(args.query) {
        body.insert("query".to_string(), Value::String(query));
    }
    if let Some(filter) = scope.filter() {
        body.insert("filter".to_string(), filter);
    }

    safe_execute(Some("search"), || client.search(Value::Object(body))).await
}
