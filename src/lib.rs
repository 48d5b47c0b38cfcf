//! Streaming client for Twitch live viewer counts
//!
//! This library resolves a channel login name into a metadata snapshot via
//! the GraphQL query API, then holds a PubSub WebSocket connection open and
//! streams the channel's viewer-count updates to the caller as plain
//! integers.
//!
//! # Example
//!
//! ```rust,ignore
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cancel = CancellationToken::new();
//!     let (metadata, mut viewers) = twitch_viewers::monitor(cancel.clone(), "somecaster").await?;
//!
//!     println!("{} ({} followers)", metadata.display_name, metadata.follower_count);
//!     while let Some(count) = viewers.recv().await {
//!         println!("{count} viewers");
//!     }
//!     // The stream closing means monitoring ended; details are in the logs.
//!     Ok(())
//! }
//! ```

pub mod fetch;
pub mod message_parser;
pub mod pubsub;
pub mod types;

// Re-export commonly used types
pub use fetch::{ClientConfig, GqlClient, MetadataFetchError};
pub use message_parser::{MessageParser, PubSubEnvelope, ViewCountEvent};
pub use pubsub::{monitor, MonitorOptions, ViewerMonitor, PUBSUB_URL};
pub use types::{ChannelMetadata, LiveStreamInfo, MonitorError, Result, SubscriptionTopic};
