use serde_json::{Map, Value};
use std::sync::Arc;

use super::transport::{ApiRequest, HttpTransport, NotionTransport};
use crate::config::NotionConfig;
use crate::error::Result;

/// Optional page size and continuation cursor, forwarded to Notion as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pagination {
    pub page_size: Option<u32>,
    pub start_cursor: Option<String>,
}

impl Pagination {
    pub fn new(page_size: Option<u32>, start_cursor: Option<String>) -> Self {
        Self {
            page_size,
            start_cursor,
        }
    }

    fn apply_query(&self, request: ApiRequest) -> ApiRequest {
        request
            .with_optional_query("page_size", self.page_size)
            .with_optional_query("start_cursor", self.start_cursor.as_deref())
    }

    /// Writes the pagination fields into a POST body.
    pub fn apply_body(&self, body: &mut Map<String, Value>) {
        if let Some(page_size) = self.page_size {
            body.insert("page_size".to_string(), Value::from(page_size));
        }
        if let Some(cursor) = &self.start_cursor {
            body.insert("start_cursor".to_string(), Value::String(cursor.clone()));
        }
    }
}

/// Notion API calls grouped by resource, mirroring the REST layout.
#[derive(Clone)]
pub struct NotionClient {
    transport: Arc<dyn NotionTransport>,
}

impl NotionClient {
    pub fn new(config: &NotionConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub fn with_transport(transport: Arc<dyn NotionTransport>) -> Self {
        Self { transport }
    }

    pub fn users(&self) -> Users<'_> {
        Users { client: self }
    }

    pub fn pages(&self) -> Pages<'_> {
        Pages { client: self }
    }

    pub fn databases(&self) -> Databases<'_> {
        Databases { client: self }
    }

    pub fn blocks(&self) -> Blocks<'_> {
        Blocks { client: self }
    }

    pub fn comments(&self) -> Comments<'_> {
        Comments { client: self }
    }

    pub async fn search(&self, body: Value) -> Result<Value> {
        self.send(ApiRequest::post("search", body)).await
    }

    async fn send(&self, request: ApiRequest) -> Result<Value> {
        self.transport.send(request).await
    }
}

#[derive(Clone, Copy)]
pub struct Users<'a> {
    client: &'a NotionClient,
}

impl Users<'_> {
    pub async fn me(self) -> Result<Value> {
        self.client.send(ApiRequest::get("users/me")).await
    }

    pub async fn list(self, pagination: &Pagination) -> Result<Value> {
        let request = pagination.apply_query(ApiRequest::get("users"));
        self.client.send(request).await
    }

    pub async fn retrieve(self, user_id: &str) -> Result<Value> {
        self.client.send(ApiRequest::get(format!("users/{}", user_id))).await
    }
}

#[derive(Clone, Copy)]
pub struct Pages<'a> {
    client: &'a NotionClient,
}

impl Pages<'_> {
    pub async fn create(self, body: Value) -> Result<Value> {
        self.client.send(ApiRequest::post("pages", body)).await
    }

    pub async fn retrieve(self, page_id: &str) -> Result<Value> {
        self.client.send(ApiRequest::get(format!("pages/{}", page_id))).await
    }

    pub async fn update(self, page_id: &str, body: Value) -> Result<Value> {
        self.client
            .send(ApiRequest::patch(format!("pages/{}", page_id), body))
            .await
    }

    pub async fn property(
        self,
        page_id: &str,
        property_id: &str,
        pagination: &Pagination,
    ) -> Result<Value> {
        let path = format!(
            "pages/{}/properties/{}",
            page_id,
            urlencoding::encode(property_id)
        );
        let request = pagination.apply_query(ApiRequest::get(path));
        self.client.send(request).await
    }
}

#[derive(Clone, Copy)]
pub struct Databases<'a> {
    client: &'a NotionClient,
}

impl Databases<'_> {
    pub async fn create(self, body: Value) -> Result<Value> {
        self.client.send(ApiRequest::post("databases", body)).await
    }

    pub async fn retrieve(self, database_id: &str) -> Result<Value> {
        self.client
            .send(ApiRequest::get(format!("databases/{}", database_id)))
            .await
    }

    pub async fn update(self, database_id: &str, body: Value) -> Result<Value> {
        self.client
            .send(ApiRequest::patch(format!("databases/{}", database_id), body))
            .await
    }

    pub async fn query(self, database_id: &str, body: Value) -> Result<Value> {
        self.client
            .send(ApiRequest::post(format!("databases/{}/query", database_id), body))
            .await
    }
}

#[derive(Clone, Copy)]
pub struct Blocks<'a> {
    client: &'a NotionClient,
}

impl<'a> Blocks<'a> {
    pub async fn retrieve(self, block_id: &str) -> Result<Value> {
        self.client
            .send(ApiRequest::get(format!("blocks/{}", block_id)))
            .await
    }

    pub async fn update(self, block_id: &str, body: Value) -> Result<Value> {
        self.client
            .send(ApiRequest::patch(format!("blocks/{}", block_id), body))
            .await
    }

    pub fn children(self) -> BlockChildren<'a> {
        BlockChildren {
            client: self.client,
        }
    }
}

#[derive(Clone, Copy)]
pub struct BlockChildren<'a> {
    client: &'a NotionClient,
}

impl BlockChildren<'_> {
    pub async fn list(self, block_id: &str, pagination: &Pagination) -> Result<Value> {
        let request = pagination.apply_query(ApiRequest::get(format!("blocks/{}/children", block_id)));
        self.client.send(request).await
    }

    pub async fn append(self, block_id: &str, body: Value) -> Result<Value> {
        self.client
            .send(ApiRequest::patch(format!("blocks/{}/children", block_id), body))
            .await
    }
}

#[derive(Clone, Copy)]
pub struct Comments<'a> {
    client: &'a NotionClient,
}

impl Comments<'_> {
    pub async fn create(self, body: Value) -> Result<Value> {
        self.client.send(ApiRequest::post("comments", body)).await
    }

    pub async fn list(self, block_id: &str, pagination: &Pagination) -> Result<Value> {
        let request = pagination.apply_query(ApiRequest::get("comments").with_query("block_id", block_id));
        self.client.send(request).await
    }
}
