pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod execute;
pub mod mcp;
pub mod server;
pub mod tools;
pub mod validation;

pub use client::{HttpTransport, NotionClient, NotionTransport};
pub use config::NotionConfig;
pub use envelope::ToolEnvelope;
pub use error::{NotionError, Result};
pub use execute::safe_execute;
pub use server::{NotionMcpServer, NotionServerConfig};
pub use tools::ToolRegistry;
pub use validation::is_valid_notion_id;
