//! Metadata fetching module
//!
//! Resolves a channel login name into a stable channel identifier and a
//! metadata snapshot via one GraphQL query.

pub mod client;
pub mod parsers;
pub mod types;

pub use client::GqlClient;
pub use types::{ClientConfig, FetchResult, MetadataFetchError};
