mod common;

use common::{mock_client, BLOCK_ID, DATABASE_ID, PAGE_ID, USER_ID};
use notion_mcp_server::tools::{blocks, comments, databases, pages, search, users};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

fn args<A: DeserializeOwned>(value: Value) -> A {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_invalid_ids_fail_without_calling_notion() {
    let (client, transport) = mock_client();

    let envelope = users::get_about_user(&client, args(json!({"user_id": "not-an-id"}))).await;
    assert_eq!(
        envelope.to_value(),
        json!({"successful": false, "data": {}, "error": "Invalid user ID format"})
    );

    let envelope = pages::create_page(&client, args(json!({"parent_id": "xyz", "title": "T"}))).await;
    assert_eq!(envelope.error(), Some("Invalid parent ID format"));

    let envelope = databases::fetch_database(&client, args(json!({"database_id": ""}))).await;
    assert_eq!(envelope.error(), Some("Invalid database_id format"));

    let envelope = blocks::delete_block(&client, args(json!({"block_id": "1234"}))).await;
    assert_eq!(envelope.error(), Some("Invalid block_id"));

    let envelope = blocks::add_page_content(
        &client,
        args(json!({
            "parent_block_id": BLOCK_ID,
            "content_block": {"object": "block", "type": "divider", "divider": {}},
            "after": "nope"
        })),
    )
    .await;
    assert!(!envelope.is_successful());

    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_get_about_me_returns_raw_object() {
    let (client, transport) = mock_client();
    transport.respond(json!({"object": "user", "id": USER_ID, "type": "bot"}));

    let envelope = users::get_about_me(&client, Default::default()).await;

    assert!(envelope.is_successful());
    assert_eq!(envelope.data()["type"], "bot");
    let calls = transport.calls();
    assert_eq!(calls[0].method, Method::GET);
    assert_eq!(calls[0].path, "users/me");
}

#[tokio::test]
async fn test_list_users_projects_id_and_name() {
    let (client, transport) = mock_client();
    transport.respond(json!({
        "object": "list",
        "results": [
            {"object": "user", "id": "u1", "name": "Ada", "avatar_url": null},
            {"object": "user", "id": "u2", "type": "bot"}
        ],
        "has_more": false,
        "next_cursor": null
    }));

    let envelope = users::list_users(&client, args(json!({}))).await;

    assert_eq!(
        envelope.to_value(),
        json!({
            "successful": true,
            "data": {
                "results": [{"id": "u1", "name": "Ada"}, {"id": "u2", "name": "Unknown"}],
                "has_more": false,
                "next_cursor": null
            },
            "error": null
        })
    );
    assert_eq!(
        transport.calls()[0].query,
        vec![("page_size".to_string(), "30".to_string())]
    );
}

#[tokio::test]
async fn test_api_failure_becomes_envelope() {
    let (client, transport) = mock_client();
    transport.fail(404, "object_not_found", "Could not find page");

    let envelope = databases::fetch_row(&client, args(json!({"page_id": PAGE_ID}))).await;

    assert_eq!(
        envelope.to_value(),
        json!({"successful": false, "data": {}, "error": "Could not find page"})
    );
}

#[tokio::test]
async fn test_create_page_body() {
    let (client, transport) = mock_client();

    let envelope = pages::create_page(
        &client,
        args(json!({
            "parent_id": PAGE_ID,
            "title": "Roadmap",
            "cover": "https://example.com/c.png",
            "icon": "🚀"
        })),
    )
    .await;

    assert!(envelope.is_successful());
    let call = &transport.calls()[0];
    assert_eq!(call.method, Method::POST);
    assert_eq!(call.path, "pages");
    assert_eq!(
        call.body,
        Some(json!({
            "parent": {"page_id": PAGE_ID},
            "properties": {"title": {"title": [{"text": {"content": "Roadmap"}}]}},
            "cover": {"external": {"url": "https://example.com/c.png"}},
            "icon": {"emoji": "🚀"}
        }))
    );
}

#[tokio::test]
async fn test_update_page_uses_existing_title_key() {
    let (client, transport) = mock_client();
    transport.respond(json!({
        "object": "page",
        "id": PAGE_ID,
        "properties": {
            "Status": {"id": "s", "type": "select", "select": null},
            "Task": {"id": "title", "type": "title", "title": []}
        }
    }));

    let envelope = pages::update_page(
        &client,
        args(json!({"page_id": PAGE_ID, "title": "Renamed", "archived": false})),
    )
    .await;

    assert!(envelope.is_successful());
    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].method, Method::GET);
    assert_eq!(calls[1].method, Method::PATCH);
    assert_eq!(
        calls[1].body,
        Some(json!({
            "archived": false,
            "properties": {"Task": {"title": [{"text": {"content": "Renamed"}}]}}
        }))
    );
}

#[tokio::test]
async fn test_archive_page_defaults_to_archiving() {
    let (client, transport) = mock_client();

    pages::archive_page(&client, args(json!({"page_id": PAGE_ID}))).await;
    pages::archive_page(&client, args(json!({"page_id": PAGE_ID, "archive": false}))).await;

    let calls = transport.calls();
    assert_eq!(calls[0].body, Some(json!({"archived": true})));
    assert_eq!(calls[1].body, Some(json!({"archived": false})));
}

#[tokio::test]
async fn test_get_page_property_encodes_property_id() {
    let (client, transport) = mock_client();

    let envelope = pages::get_page_property(
        &client,
        args(json!({"page_id": PAGE_ID, "property_id": "a%3Bb", "page_size": 5})),
    )
    .await;

    assert!(envelope.is_successful());
    let call = &transport.calls()[0];
    assert!(call.path.starts_with(&format!("pages/{}/properties/", PAGE_ID)));
    assert_eq!(call.query, vec![("page_size".to_string(), "5".to_string())]);
}

#[tokio::test]
async fn test_list_pages_summarizes_search_results() {
    let (client, transport) = mock_client();
    transport.respond(json!({
        "results": [{
            "object": "page",
            "id": PAGE_ID,
            "url": "https://www.notion.so/x",
            "properties": {"Name": {"type": "title", "title": [{"plain_text": "Plans"}]}}
        }],
        "has_more": false
    }));

    let envelope = pages::list_pages(&client, args(json!({"keyword": "Plans"}))).await;

    assert_eq!(
        envelope.data(),
        &json!([{"id": PAGE_ID, "title": "Plans", "url": "https://www.notion.so/x"}])
    );
    assert_eq!(
        transport.calls()[0].body,
        Some(json!({"filter": {"property": "object", "value": "page"}, "query": "Plans"}))
    );
}

#[tokio::test]
async fn test_create_database_requires_title_property() {
    let (client, transport) = mock_client();

    let envelope = databases::create_database(
        &client,
        args(json!({
            "parent_id": PAGE_ID,
            "title": "Tasks",
            "properties": {"Done": {"checkbox": {}}}
        })),
    )
    .await;

    assert_eq!(envelope.error(), Some("Database must have at least one title property"));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_query_database_defaults_sort_direction() {
    let (client, transport) = mock_client();

    databases::query_database(
        &client,
        args(json!({"database_id": DATABASE_ID, "sorts": [{"property": "Due"}]})),
    )
    .await;

    let call = &transport.calls()[0];
    assert_eq!(call.path, format!("databases/{}/query", DATABASE_ID));
    assert_eq!(
        call.body,
        Some(json!({
            "page_size": 10,
            "sorts": [{"property": "Due", "direction": "ascending"}]
        }))
    );
}

#[tokio::test]
async fn test_query_database_all_follows_cursor() {
    let (client, transport) = mock_client();
    transport.respond(json!({"results": [{"id": "r1"}], "has_more": true, "next_cursor": "c2"}));
    transport.respond(json!({"results": [{"id": "r2"}], "has_more": false, "next_cursor": null}));

    let envelope =
        databases::query_database_all(&client, args(json!({"database_id": DATABASE_ID}))).await;

    assert_eq!(envelope.data(), &json!({"results": [{"id": "r1"}, {"id": "r2"}]}));
    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].body, Some(json!({"page_size": 100})));
    assert_eq!(calls[1].body, Some(json!({"page_size": 100, "start_cursor": "c2"})));
}

#[tokio::test]
async fn test_update_row_omits_archived_when_absent() {
    let (client, transport) = mock_client();

    databases::update_row(
        &client,
        args(json!({"page_id": PAGE_ID, "properties": {"Done": {"checkbox": true}}})),
    )
    .await;

    assert_eq!(
        transport.calls()[0].body,
        Some(json!({"properties": {"Done": {"checkbox": true}}}))
    );
}

#[tokio::test]
async fn test_add_multiple_page_content_mixes_shorthand_and_blocks() {
    let (client, transport) = mock_client();

    let envelope = blocks::add_multiple_page_content(
        &client,
        args(json!({
            "parent_block_id": BLOCK_ID,
            "content_blocks": [
                {"content": "First"},
                {"object": "block", "type": "divider", "divider": {}}
            ]
        })),
    )
    .await;

    assert!(envelope.is_successful());
    let call = &transport.calls()[0];
    assert_eq!(call.method, Method::PATCH);
    assert_eq!(call.path, format!("blocks/{}/children", BLOCK_ID));
    assert_eq!(
        call.body,
        Some(json!({
            "children": [
                {
                    "object": "block",
                    "type": "paragraph",
                    "paragraph": {"rich_text": [{"type": "text", "text": {"content": "First"}}]}
                },
                {"object": "block", "type": "divider", "divider": {}}
            ]
        }))
    );
}

#[tokio::test]
async fn test_add_multiple_page_content_rejects_bad_batches() {
    let (client, transport) = mock_client();

    let empty = blocks::add_multiple_page_content(
        &client,
        args(json!({"parent_block_id": BLOCK_ID, "content_blocks": []})),
    )
    .await;
    assert_eq!(empty.error(), Some("content_blocks must be a non-empty list"));

    let too_many: Vec<Value> = (0..101).map(|i| json!({"content": i.to_string()})).collect();
    let oversized = blocks::add_multiple_page_content(
        &client,
        args(json!({"parent_block_id": BLOCK_ID, "content_blocks": too_many})),
    )
    .await;
    assert_eq!(oversized.error(), Some("Maximum 100 blocks per request"));

    let malformed = blocks::add_multiple_page_content(
        &client,
        args(json!({"parent_block_id": BLOCK_ID, "content_blocks": [{"text": "x"}]})),
    )
    .await;
    assert!(malformed.error().unwrap().starts_with("Invalid block format:"));

    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_update_block_text_and_non_text_types() {
    let (client, transport) = mock_client();

    let envelope = blocks::update_block(
        &client,
        args(json!({
            "block_id": BLOCK_ID,
            "block_type": "to_do",
            "content": "Ship it",
            "additional_properties": {"checked": true}
        })),
    )
    .await;
    assert!(envelope.is_successful());
    assert_eq!(
        transport.calls()[0].body,
        Some(json!({
            "to_do": {
                "rich_text": [{"type": "text", "text": {"content": "Ship it"}}],
                "checked": true
            }
        }))
    );

    let unsupported = blocks::update_block(
        &client,
        args(json!({"block_id": BLOCK_ID, "block_type": "code", "content": "fn main() {}"})),
    )
    .await;
    assert_eq!(
        unsupported.error(),
        Some("Unsupported block_type 'code' without additional_properties")
    );
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_fetch_all_block_contents_stops_on_failure() {
    let (client, transport) = mock_client();
    transport.respond(json!({"results": [{"id": "b1"}], "has_more": true, "next_cursor": "c2"}));
    transport.fail(429, "rate_limited", "Rate limited");

    let envelope =
        blocks::fetch_all_block_contents(&client, args(json!({"block_id": BLOCK_ID}))).await;

    assert_eq!(
        envelope.to_value(),
        json!({"successful": false, "data": {}, "error": "Rate limited"})
    );
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn test_create_comment_prefers_discussion() {
    let (client, transport) = mock_client();

    let missing = comments::create_comment(&client, args(json!({"comment": {"content": "Hi"}}))).await;
    assert_eq!(
        missing.error(),
        Some("Either discussion_id or parent_page_id must be provided.")
    );
    assert_eq!(transport.call_count(), 0);

    comments::create_comment(
        &client,
        args(json!({
            "comment": {"content": "Reply"},
            "discussion_id": BLOCK_ID,
            "parent_page_id": PAGE_ID
        })),
    )
    .await;
    comments::create_comment(
        &client,
        args(json!({"comment": {"content": "New thread"}, "parent_page_id": PAGE_ID})),
    )
    .await;

    let calls = transport.calls();
    assert_eq!(
        calls[0].body,
        Some(json!({
            "rich_text": [{"type": "text", "text": {"content": "Reply"}}],
            "discussion_id": BLOCK_ID
        }))
    );
    assert_eq!(
        calls[1].body,
        Some(json!({
            "rich_text": [{"type": "text", "text": {"content": "New thread"}}],
            "parent": {"type": "page_id", "page_id": PAGE_ID}
        }))
    );
}

#[tokio::test]
async fn test_get_comment_by_id_matches_any_hyphenation() {
    let (client, transport) = mock_client();
    let comment_id = "99999999-8888-7777-6666-555555555555";
    transport.respond(json!({
        "results": [
            {"object": "comment", "id": "00000000-8888-7777-6666-555555555555"},
            {"object": "comment", "id": comment_id, "rich_text": []}
        ]
    }));
    transport.respond(json!({"results": []}));

    let found = comments::get_comment_by_id(
        &client,
        args(json!({"parent_block_id": PAGE_ID, "comment_id": comment_id.replace('-', "")})),
    )
    .await;
    assert_eq!(found.data()["id"], comment_id);
    assert_eq!(
        transport.calls()[0].query,
        vec![
            ("block_id".to_string(), PAGE_ID.to_string()),
            ("page_size".to_string(), "100".to_string())
        ]
    );

    let missing = comments::get_comment_by_id(
        &client,
        args(json!({"parent_block_id": PAGE_ID, "comment_id": comment_id})),
    )
    .await;
    assert_eq!(
        missing.error(),
        Some(format!("Comment with ID {} not found.", comment_id).as_str())
    );
}

#[tokio::test]
async fn test_search_and_fetch_data_bodies() {
    let (client, transport) = mock_client();

    search::search_pages(&client, args(json!({}))).await;
    search::fetch_data(&client, args(json!({"get_databases": true, "query": "crm"}))).await;
    search::fetch_data(&client, args(json!({"get_all": true}))).await;

    let calls = transport.calls();
    assert_eq!(calls[0].body, Some(json!({"query": "", "page_size": 10})));
    assert_eq!(
        calls[1].body,
        Some(json!({
            "page_size": 100,
            "query": "crm",
            "filter": {"property": "object", "value": "database"}
        }))
    );
    assert_eq!(calls[2].body, Some(json!({"page_size": 100})));
}

#[tokio::test]
async fn test_every_id_argument_is_checked_before_any_request() {
    use notion_mcp_server::ToolRegistry;

    let (client, transport) = mock_client();
    let mut registry = ToolRegistry::new(vec!["all".to_string()], false, client);
    registry.initialize();

    let divider = json!({"object": "block", "type": "divider", "divider": {}});
    let comment = json!({"content": "hi"});
    let cases: Vec<(&str, Value)> = vec![
        ("NOTION_GET_ABOUT_USER", json!({"user_id": "not-an-id"})),
        ("NOTION_CREATE_NOTION_PAGE", json!({"parent_id": "xyz", "title": "T"})),
        ("NOTION_UPDATE_PAGE", json!({"page_id": "xyz", "title": "T"})),
        ("NOTION_GET_PAGE_PROPERTY_ACTION", json!({"page_id": "xyz", "property_id": "title"})),
        ("NOTION_ARCHIVE_NOTION_PAGE", json!({"page_id": "xyz"})),
        ("NOTION_CREATE_DATABASE", json!({"parent_id": "xyz", "title": "T", "properties": {}})),
        ("NOTION_INSERT_ROW_DATABASE", json!({"database_id": "xyz", "properties": {}})),
        ("NOTION_QUERY_DATABASE", json!({"database_id": "xyz"})),
        ("NOTION_QUERY_DATABASE_ALL", json!({"database_id": "xyz"})),
        ("NOTION_FETCH_DATABASE", json!({"database_id": ""})),
        ("NOTION_FETCH_ROW", json!({"page_id": "xyz"})),
        ("NOTION_UPDATE_ROW_DATABASE", json!({"page_id": "xyz"})),
        ("NOTION_UPDATE_SCHEMA_DATABASE", json!({"database_id": "xyz"})),
        ("NOTION_ADD_MULTIPLE_PAGE_CONTENT", json!({"parent_block_id": "xyz", "content_blocks": [divider]})),
        (
            "NOTION_ADD_MULTIPLE_PAGE_CONTENT",
            json!({"parent_block_id": BLOCK_ID, "content_blocks": [divider], "after": "xyz"}),
        ),
        ("NOTION_ADD_PAGE_CONTENT", json!({"parent_block_id": "xyz", "content_block": divider})),
        (
            "NOTION_ADD_PAGE_CONTENT",
            json!({"parent_block_id": BLOCK_ID, "content_block": divider, "after": "xyz"}),
        ),
        ("NOTION_APPEND_BLOCK_CHILDREN", json!({"block_id": "xyz", "children": [divider]})),
        (
            "NOTION_APPEND_BLOCK_CHILDREN",
            json!({"block_id": BLOCK_ID, "children": [divider], "after": "xyz"}),
        ),
        (
            "NOTION_UPDATE_BLOCK",
            json!({"block_id": "xyz", "block_type": "paragraph", "content": "hi"}),
        ),
        ("NOTION_DELETE_BLOCK", json!({"block_id": "1234"})),
        ("NOTION_FETCH_BLOCK_CONTENTS", json!({"block_id": "xyz"})),
        ("NOTION_FETCH_ALL_BLOCK_CONTENTS", json!({"block_id": "xyz"})),
        ("NOTION_FETCH_BLOCK_METADATA", json!({"block_id": "xyz"})),
        ("NOTION_CREATE_COMMENT", json!({"comment": comment, "discussion_id": "xyz"})),
        ("NOTION_CREATE_COMMENT", json!({"comment": comment, "parent_page_id": "xyz"})),
        ("NOTION_GET_COMMENT_BY_ID", json!({"parent_block_id": "xyz", "comment_id": PAGE_ID})),
        ("NOTION_GET_COMMENT_BY_ID", json!({"parent_block_id": BLOCK_ID, "comment_id": "xyz"})),
        ("NOTION_FETCH_COMMENTS", json!({"block_id": "xyz"})),
        // absent and non-string IDs are rejected while decoding the arguments
        ("NOTION_FETCH_ROW", json!({})),
        ("NOTION_FETCH_DATABASE", json!({"database_id": null})),
        ("NOTION_DELETE_BLOCK", json!({"block_id": 12345678901234567890u64})),
        ("NOTION_GET_ABOUT_USER", json!({"user_id": ["a"]})),
    ];

    for (tool, arguments) in cases {
        let Value::Object(arguments) = arguments else {
            unreachable!("arguments are objects")
        };
        let envelope = registry.call_tool(tool, arguments.clone()).await.unwrap();
        assert!(!envelope.is_successful(), "{} accepted {:?}", tool, arguments);
        assert_eq!(envelope.data(), &json!({}), "{}", tool);
        assert!(envelope.error().is_some_and(|e| !e.is_empty()), "{}", tool);
        assert_eq!(transport.call_count(), 0, "{} reached Notion with {:?}", tool, arguments);
    }
}
