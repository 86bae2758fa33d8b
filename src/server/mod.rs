use anyhow::Result;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::client::NotionClient;
use crate::mcp::{
    CallToolParams, CallToolResult, JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS,
    METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION,
};
use crate::tools::ToolRegistry;

pub const SERVER_NAME: &str = "notion-mcp-server";

#[derive(Debug, Clone)]
pub struct NotionServerConfig {
    pub version: String,
    pub enabled_toolsets: Vec<String>,
    pub read_only: bool,
    pub enable_command_logging: bool,
}

impl Default for NotionServerConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            enabled_toolsets: vec!["all".to_string()],
            read_only: false,
            enable_command_logging: false,
        }
    }
}

pub struct NotionMcpServer {
    tools: ToolRegistry,
    config: NotionServerConfig,
}

impl NotionMcpServer {
    pub fn new(config: NotionServerConfig, client: NotionClient) -> Self {
        let mut tools = ToolRegistry::new(config.enabled_toolsets.clone(), config.read_only, client);
        tools.initialize();

        Self { tools, config }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Dispatches one request. Notifications get no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if self.config.enable_command_logging {
            info!("Request: {:?}", request);
        } else {
            debug!("Handling request: {}", request.method);
        }

        if request.is_notification() {
            debug!("Notification received: {}", request.method);
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_list_tools(request),
            "tools/call" => self.handle_call_tool(request).await,
            _ => {
                warn!("Unknown method: {}", request.method);
                JsonRpcResponse::error(request.id, METHOD_NOT_FOUND, "Method not found", None)
            }
        };

        if self.config.enable_command_logging {
            info!("Response: {:?}", response);
        }

        Some(response)
    }

    fn handle_initialize(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {"listChanged": false}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": self.config.version
            }
        });

        JsonRpcResponse::success(request.id, result)
    }

    fn handle_list_tools(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let tools = self.tools.list_tools();
        JsonRpcResponse::success(request.id, json!({ "tools": tools }))
    }

    async fn handle_call_tool(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params: CallToolParams =
            match serde_json::from_value(request.params.unwrap_or(Value::Null)) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        request.id,
                        INVALID_PARAMS,
                        "Invalid params: missing tool name",
                        Some(json!({"error": e.to_string()})),
                    )
                }
            };

        let arguments = match params.arguments {
            None | Some(Value::Null) => Default::default(),
            Some(Value::Object(arguments)) => arguments,
            Some(_) => {
                return JsonRpcResponse::error(
                    request.id,
                    INVALID_PARAMS,
                    "Invalid params: arguments must be an object",
                    None,
                )
            }
        };

        match self.tools.call_tool(&params.name, arguments).await {
            Ok(envelope) => match serde_json::to_value(CallToolResult::from(&envelope)) {
                Ok(result) => JsonRpcResponse::success(request.id, result),
                Err(e) => {
                    error!("Failed to encode tool result: {}", e);
                    JsonRpcResponse::error(request.id, INTERNAL_ERROR, "Internal error", None)
                }
            },
            Err(e) => {
                warn!("Tool call rejected: {}", e);
                JsonRpcResponse::error(
                    request.id,
                    INVALID_PARAMS,
                    &e.to_string(),
                    None,
                )
            }
        }
    }

    pub async fn run_stdio(&self) -> Result<()> {
        info!("Notion MCP Server running on stdio");
        let reader = BufReader::new(tokio::io::stdin());
        self.serve(reader, tokio::io::stdout()).await
    }

    /// Reads newline-delimited JSON-RPC messages until EOF, writing one
    /// response line per request.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let response = match std::str::from_utf8(&buf) {
                        Ok(line) if line.trim().is_empty() => continue,
                        Ok(line) => match serde_json::from_str::<JsonRpcRequest>(line.trim()) {
                            Ok(request) => self.handle_request(request).await,
                            Err(e) => {
                                error!("Failed to parse JSON-RPC request: {}", e);
                                Some(parse_error(e.to_string()))
                            }
                        },
                        Err(e) => {
                            error!("Request line is not valid UTF-8: {}", e);
                            Some(parse_error(e.to_string()))
                        }
                    };

                    if let Some(response) = response {
                        let response_json = serde_json::to_string(&response)?;
                        writer.write_all(response_json.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                        writer.flush().await?;
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        info!("Input closed, shutting down");
        Ok(())
    }
}

fn parse_error(detail: String) -> JsonRpcResponse {
    JsonRpcResponse::error(None, PARSE_ERROR, "Parse error", Some(json!({ "error": detail })))
}
