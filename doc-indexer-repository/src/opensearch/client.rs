//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    BulkParts, OpenSearch,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::types::BulkResponse;

/// OpenSearch client implementation.
///
/// The underlying transport keeps a connection pool and is safe to share
/// between bulk workers.
///
/// # Example
///
/// ```ignore
/// let client = OpenSearchClient::new(&ClientConfig::new("http://localhost:9200"))?;
/// let payload = item.to_bulk_payload()?;
/// let response = client.bulk("books", vec![payload]).await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client for the configured URL.
    ///
    /// No request is sent; use `health_check` to verify the cluster is reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError::ConnectionError)` - If the URL is invalid or the
    ///   transport cannot be built
    pub fn new(config: &ClientConfig) -> Result<Self, SearchError> {
        let parsed_url =
            Url::parse(&config.url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %config.url,
            timeout_ms = config.timeout.as_millis() as u64,
            "Created OpenSearch client"
        );

        Ok(Self { client })
    }
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    #[instrument(skip(self, payloads), fields(operations = payloads.len()))]
    async fn bulk(&self, index: &str, payloads: Vec<String>) -> Result<BulkResponse, SearchError> {
        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(payloads)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        if !status.is_success() {
            error!(status = %status, body = %body, "Bulk request failed");
            return Err(SearchError::status(status.as_u16(), body));
        }

        let parsed = BulkResponse::from_slice(body.as_bytes())?;
        debug!(
            took_ms = parsed.took,
            errors = parsed.errors,
            items = parsed.items.len(),
            "Bulk request completed"
        );

        Ok(parsed)
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchError::health_check(e.to_string()))?;

        let health: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;
        let status = health
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or("unknown");

        info!(status = %status, "OpenSearch cluster status");

        Ok(status == "green" || status == "yellow")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = OpenSearchClient::new(&ClientConfig::new("not a url"));
        assert!(matches!(result, Err(SearchError::ConnectionError(_))));
    }

    #[test]
    fn test_new_does_not_connect() {
        // Port 9 is discard; construction must succeed without a server.
        let result = OpenSearchClient::new(&ClientConfig::new("http://127.0.0.1:9"));
        assert!(result.is_ok());
    }
}
