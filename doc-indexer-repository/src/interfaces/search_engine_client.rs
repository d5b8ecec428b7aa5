//! Search engine client trait definition.
//!
//! This module defines the abstract interface the bulk indexer needs from a
//! search engine, allowing for different backend implementations
//! (OpenSearch, Elasticsearch, mocks in tests).

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::types::BulkResponse;

/// Abstract interface for search engine operations.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`; one client is shared by every
/// bulk worker and must be safe for concurrent requests.
///
/// # Error Handling
///
/// A request that reached the server but came back with a non-success HTTP
/// status is reported as `SearchError::Status`. A request that never got an
/// answer is reported as `SearchError::ConnectionError`.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Send one bulk request.
    ///
    /// # Arguments
    ///
    /// * `index` - Default index for the request
    /// * `payloads` - One entry per operation, each the operation's NDJSON
    ///   lines without the trailing newline
    ///
    /// # Returns
    ///
    /// * `Ok(BulkResponse)` - Per-operation results, in request order
    /// * `Err(SearchError)` - If the request as a whole failed
    async fn bulk(&self, index: &str, payloads: Vec<String>) -> Result<BulkResponse, SearchError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the cluster status is green or yellow
    /// * `Ok(false)` - If the cluster is red or reports an unknown status
    /// * `Err(SearchError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchError>;
}
