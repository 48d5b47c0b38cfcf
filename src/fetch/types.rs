//! Types specific to the fetch module

/// Result type for metadata fetch operations
pub type FetchResult<T> = Result<T, MetadataFetchError>;

/// Error types for the metadata fetch
#[derive(Debug, thiserror::Error)]
pub enum MetadataFetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("graphql error: {0}")]
    Graphql(String),

    #[error("channel not found: {0}")]
    ChannelNotFound(String),
}

/// Configuration for the GraphQL client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,
    /// Value sent as the `Client-Id` header identifying the application
    pub client_id: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Optional user agent string for requests
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://gql.twitch.tv/gql".to_string(),
            client_id: "kimne78kx3ncx6brgo4mv6wki5h1ko".to_string(),
            timeout_seconds: 30,
            user_agent: None,
        }
    }
}
