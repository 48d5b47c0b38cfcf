//! Shared data model and error types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fetch::types::MetadataFetchError;

/// Snapshot of a channel's metadata, taken once at startup.
///
/// Produced by the metadata fetcher and handed to the caller; the streaming
/// client never mutates it after that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMetadata {
    /// Stable channel identifier, distinct from the login name
    pub id: String,
    /// Login name the channel was resolved from
    pub login: String,
    /// Human-facing display name
    pub display_name: String,
    /// Avatar URL (fixed 300px width)
    pub avatar_url: String,
    /// Follower count at fetch time
    pub follower_count: u64,
    /// Present only while the channel is broadcasting
    pub stream: Option<LiveStreamInfo>,
}

/// Attributes of the live broadcast, if one was running at fetch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveStreamInfo {
    pub id: String,
    pub title: String,
    /// Broadcast content type, e.g. "live"
    pub stream_type: String,
    /// Viewer count at fetch time
    pub viewers: u64,
    /// RFC 3339 start timestamp, kept as text
    pub started_at: String,
    /// Game/category name, if the stream has one set
    pub game: Option<String>,
}

/// PubSub topic carrying viewer-count updates for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionTopic(String);

impl SubscriptionTopic {
    /// Derive the topic for a channel identifier.
    pub fn for_channel(channel_id: &str) -> Self {
        Self(format!("video-playback-by-id.{channel_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriptionTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error types for the streaming client
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("metadata fetch failed: {0}")]
    MetadataFetch(#[from] MetadataFetchError),

    #[error("pubsub connect failed: {0}")]
    Connect(#[source] tokio_tungstenite::tungstenite::Error),

    #[error("subscribe handshake failed: {0}")]
    Handshake(#[source] tokio_tungstenite::tungstenite::Error),

    #[error("malformed pubsub frame: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid pubsub frame: {0}")]
    InvalidFrame(String),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
