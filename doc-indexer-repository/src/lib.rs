//! # Document Indexer Repository
//!
//! This crate provides the search engine boundary used by the bulk indexer:
//! error types, the `SearchEngineClient` trait, bulk response types, and a
//! concrete implementation for OpenSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use config::ClientConfig;
pub use errors::SearchError;
pub use interfaces::SearchEngineClient;
pub use opensearch::OpenSearchClient;
pub use types::{BulkItemError, BulkResponse, BulkResponseItem};
