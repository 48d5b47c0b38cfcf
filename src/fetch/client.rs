//! GraphQL client for resolving channel metadata
//!
//! Issues the single query that turns a login name into a channel identifier
//! plus a metadata snapshot. One request per startup, no retries: a failure
//! here aborts the whole client-start operation.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use tracing::{debug, info};

use crate::fetch::parsers::parse_channel_response;
use crate::fetch::types::{ClientConfig, FetchResult, MetadataFetchError};
use crate::types::ChannelMetadata;

/// Query document sent with every fetch; only the `login` variable changes.
const CHANNEL_QUERY: &str = r#"
query GetUser($login: String!) {
    user(login: $login) {
        id
        login
        displayName
        profileImageURL(width: 300)
        followers {
            totalCount
        }
        stream {
            id
            title
            type
            viewersCount
            createdAt
            game {
                name
            }
        }
    }
}"#;

/// HTTP client for the channel-metadata GraphQL endpoint
pub struct GqlClient {
    client: Client,
    config: ClientConfig,
}

impl GqlClient {
    /// Create a client with the default (production) configuration
    pub fn new() -> FetchResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: ClientConfig) -> FetchResult<Self> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_seconds));

        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Fetch the metadata snapshot for a channel login name.
    pub async fn fetch_channel(&self, login: &str) -> FetchResult<ChannelMetadata> {
        info!("Fetching channel metadata: {}", login);

        let request = json!({
            "query": CHANNEL_QUERY,
            "variables": {"login": login},
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Client-Id", &self.config.client_id)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        debug!("Metadata response for {}: {} bytes", login, body.len());

        parse_channel_response(&body, login)
    }

    /// Check whether a login name resolves to a channel.
    pub async fn channel_exists(&self, login: &str) -> FetchResult<bool> {
        match self.fetch_channel(login).await {
            Ok(_) => Ok(true),
            Err(MetadataFetchError::ChannelNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
