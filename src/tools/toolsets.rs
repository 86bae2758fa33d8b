use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::envelope::ToolEnvelope;
use crate::mcp::Tool;

use super::params::parse_args;
use super::registry::ToolHandlerFunc;

pub struct Toolset {
    pub name: String,
    pub description: String,
    pub tools: Vec<(String, Tool, ToolHandlerFunc)>,
}

impl Toolset {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            tools: Vec::new(),
        }
    }

    /// Registers a tool whose arguments decode into `A`.
    ///
    /// Arguments that fail to decode produce a failed envelope naming the
    /// offending field; the handler is not invoked.
    pub fn add_tool<A, F, Fut>(&mut self, tool: Tool, handler: F)
    where
        A: DeserializeOwned + Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolEnvelope> + Send + 'static,
    {
        let name = tool.name.clone();
        let handler = Arc::new(handler);
        let func: ToolHandlerFunc = Box::new(move |args: Map<String, Value>| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                match parse_args::<A>(args) {
                    Ok(parsed) => handler(parsed).await,
                    Err(e) => ToolEnvelope::failure(e.to_string()),
                }
            }) as BoxFuture<'static, ToolEnvelope>
        });

        self.tools.push((name, tool, func));
    }

    pub fn get_tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|(name, _, _)| name.clone()).collect()
    }
}

/// Tool names per toolset, kept after the handlers move into the registry.
#[derive(Default)]
pub struct ToolsetGroup {
    toolsets: HashMap<String, Vec<String>>,
}

impl ToolsetGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_toolset(&mut self, toolset: &Toolset) {
        self.toolsets
            .insert(toolset.name.clone(), toolset.get_tool_names());
    }

    pub fn has_toolset(&self, name: &str) -> bool {
        self.toolsets.contains_key(name)
    }

    pub fn get_toolset_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.toolsets.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn get_toolset_tools(&self, name: &str) -> Option<Vec<String>> {
        self.toolsets.get(name).cloned()
    }
}

pub const ALL_TOOLSETS: &[&str] = &[
    "users",
    "pages",
    "databases",
    "blocks",
    "comments",
    "search",
];
