use anyhow::{anyhow, Result};
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::client::NotionClient;
use crate::envelope::ToolEnvelope;
use crate::mcp::Tool;

use super::toolsets::{Toolset, ToolsetGroup, ALL_TOOLSETS};

pub type ToolHandlerFunc =
    Box<dyn Fn(Map<String, Value>) -> BoxFuture<'static, ToolEnvelope> + Send + Sync>;

pub struct ToolRegistry {
    tools: HashMap<String, Tool>,
    handlers: HashMap<String, ToolHandlerFunc>,
    toolsets: ToolsetGroup,
    enabled_toolsets: Vec<String>,
    read_only: bool,
    client: NotionClient,
}

impl ToolRegistry {
    pub fn new(enabled_toolsets: Vec<String>, read_only: bool, client: NotionClient) -> Self {
        Self {
            tools: HashMap::new(),
            handlers: HashMap::new(),
            toolsets: ToolsetGroup::new(),
            enabled_toolsets,
            read_only,
            client,
        }
    }

    pub fn initialize(&mut self) {
        info!(
            "Initializing tool registry with toolsets: {:?} (read_only: {})",
            self.enabled_toolsets, self.read_only
        );

        let requested: Vec<String> = if self.enabled_toolsets.iter().any(|t| t == "all") {
            ALL_TOOLSETS.iter().map(|t| t.to_string()).collect()
        } else {
            self.enabled_toolsets.clone()
        };

        for name in &requested {
            if let Err(e) = self.enable_toolset(name) {
                warn!("{}", e);
            }
        }

        info!("Tool registry initialized with {} tools", self.tools.len());
    }

    pub fn enable_toolset(&mut self, name: &str) -> Result<()> {
        if self.toolsets.has_toolset(name) {
            return Ok(());
        }

        let client = self.client.clone();
        let read_only = self.read_only;
        let toolset = match name {
            "users" => super::users::create_users_toolset(client),
            "pages" => super::pages::create_pages_toolset(client, read_only),
            "databases" => super::databases::create_databases_toolset(client, read_only),
            "blocks" => super::blocks::create_blocks_toolset(client, read_only),
            "comments" => super::comments::create_comments_toolset(client, read_only),
            "search" => super::search::create_search_toolset(client),
            _ => return Err(anyhow!("Unknown toolset: {}", name)),
        };

        self.register_toolset(toolset);
        Ok(())
    }

    fn register_toolset(&mut self, mut toolset: Toolset) {
        debug!("Registering toolset: {} ({})", toolset.name, toolset.description);
        self.toolsets.add_toolset(&toolset);

        for (tool_name, tool, handler) in toolset.tools.drain(..) {
            if self.tools.contains_key(&tool_name) {
                debug!("Tool {} already registered, skipping", tool_name);
                continue;
            }

            debug!("Registering tool: {}", tool_name);
            self.tools.insert(tool_name.clone(), tool);
            self.handlers.insert(tool_name, handler);
        }
    }

    pub fn list_tools(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self.tools.values().cloned().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Runs a tool. Only an unknown tool name is an `Err`; every tool
    /// outcome, including failures, comes back as an envelope.
    pub async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<ToolEnvelope> {
        debug!("Calling tool: {} with args: {:?}", name, arguments);

        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| anyhow!("Tool not found: {}", name))?;

        let envelope = handler(arguments).await;
        if envelope.is_successful() {
            debug!("Tool {} executed successfully", name);
        } else {
            debug!("Tool {} returned failure: {:?}", name, envelope.error());
        }

        Ok(envelope)
    }

    pub fn get_toolset_names(&self) -> Vec<String> {
        self.toolsets.get_toolset_names()
    }

    pub fn get_toolset_tools(&self, toolset_name: &str) -> Option<Vec<String>> {
        self.toolsets.get_toolset_tools(toolset_name)
    }
}
