use std::env;
use std::time::Duration;

use crate::error::{NotionError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1/";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

#[derive(Clone)]
pub struct NotionConfig {
    pub token: String,
    pub base_url: String,
    pub notion_version: String,
    pub user_agent: String,
    pub timeout: Option<Duration>,
}

impl NotionConfig {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            notion_version: DEFAULT_NOTION_VERSION.to_string(),
            user_agent: format!("notion-mcp-server/{}", env!("CARGO_PKG_VERSION")),
            timeout: None,
        }
    }

    pub fn from_env() -> Result<Self> {
        let token = env::var("NOTION_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                NotionError::Config("NOTION_TOKEN environment variable is required".to_string())
            })?;

        let mut config = Self::new(token);

        if let Ok(base_url) = env::var("NOTION_API_BASE_URL") {
            config = config.with_base_url(base_url);
        }

        if let Ok(version) = env::var("NOTION_VERSION") {
            config.notion_version = version;
        }

        if let Ok(secs) = env::var("NOTION_TIMEOUT_SECS") {
            let secs = secs.parse::<u64>().map_err(|_| {
                NotionError::Config(format!("NOTION_TIMEOUT_SECS must be an integer, got {}", secs))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Sets the API root. A trailing slash is added so relative paths join under it.
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }
}

impl std::fmt::Debug for NotionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionConfig")
            .field("token", &"***")
            .field("base_url", &self.base_url)
            .field("notion_version", &self.notion_version)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}
