use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotionError {
    #[error("{0}")]
    InvalidArgument(String),

    /// The Notion API rejected the request. Displays the API message verbatim.
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// A lookup over an API listing came up empty.
    #[error("{0}")]
    NotFound(String),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation panicked: {0}")]
    Panicked(String),
}

impl NotionError {
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        NotionError::InvalidArgument(message.into())
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, NotionError::Api { .. })
    }
}

pub type Result<T> = std::result::Result<T, NotionError>;
