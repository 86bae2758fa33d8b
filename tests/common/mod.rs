#![allow(dead_code)]

use async_trait::async_trait;
use notion_mcp_server::client::{ApiRequest, NotionClient, NotionTransport};
use notion_mcp_server::error::{NotionError, Result};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Records every request and replies from a queue. An empty queue answers `{}`.
#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<ApiRequest>>,
    responses: Mutex<VecDeque<Result<Value>>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, value: Value) {
        self.responses.lock().unwrap().push_back(Ok(value));
    }

    pub fn fail(&self, status: u16, code: &str, message: &str) {
        self.responses.lock().unwrap().push_back(Err(NotionError::Api {
            status,
            code: Some(code.to_string()),
            message: message.to_string(),
        }));
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl NotionTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        self.calls.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({})))
    }
}

pub fn mock_client() -> (NotionClient, Arc<MockTransport>) {
    let transport = MockTransport::new();
    let client = NotionClient::with_transport(transport.clone());
    (client, transport)
}

pub const PAGE_ID: &str = "1a2b3c4d-5e6f-7a8b-9c0d-1e2f3a4b5c6d";
pub const DATABASE_ID: &str = "0f1e2d3c4b5a69788796a5b4c3d2e1f0";
pub const BLOCK_ID: &str = "abcdefab-cdef-abcd-efab-cdefabcdefab";
pub const USER_ID: &str = "11111111-2222-3333-4444-555555555555";
