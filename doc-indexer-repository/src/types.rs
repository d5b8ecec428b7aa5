//! Response types for bulk operations.

use std::collections::HashMap;

use serde::Deserialize;

use crate::errors::SearchError;

/// Body of a `_bulk` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkResponse {
    /// Milliseconds the request took on the server.
    #[serde(default)]
    pub took: u64,
    /// True if at least one item failed.
    #[serde(default)]
    pub errors: bool,
    /// One entry per operation, keyed by the action name.
    #[serde(default)]
    pub items: Vec<HashMap<String, BulkResponseItem>>,
}

/// Result of a single bulk operation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BulkResponseItem {
    #[serde(rename = "_index", default)]
    pub index: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub status: u16,
    /// "created", "updated", "deleted", "noop" or "not_found".
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<BulkItemError>,
}

/// Error detail attached to a failed bulk item.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BulkItemError {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub reason: String,
}

impl BulkResponse {
    /// Parse a bulk response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, SearchError> {
        serde_json::from_slice(body).map_err(|e| SearchError::parse(e.to_string()))
    }

    /// Per-operation results in request order, dropping the action key.
    pub fn into_items(self) -> Vec<BulkResponseItem> {
        self.items
            .into_iter()
            .filter_map(|entry| entry.into_values().next())
            .collect()
    }
}

impl BulkResponseItem {
    /// Whether the operation succeeded (2xx status and no error detail).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && self.error.is_none()
    }

    /// A successful item with the given status and result.
    pub fn success(status: u16, result: impl Into<String>) -> Self {
        Self {
            status,
            result: Some(result.into()),
            ..Self::default()
        }
    }

    /// A failed item with the given status and error detail.
    pub fn failure(status: u16, kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            status,
            error: Some(BulkItemError {
                kind: kind.into(),
                reason: reason.into(),
            }),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_response() {
        let body = br#"{
            "took": 30,
            "errors": true,
            "items": [
                { "index": { "_index": "books", "_id": "1", "status": 201, "result": "created" } },
                { "create": { "_index": "books", "_id": "2", "status": 409,
                    "error": { "type": "version_conflict_engine_exception", "reason": "document already exists" } } },
                { "index": { "_index": "books", "_id": "3", "status": 429,
                    "error": { "type": "es_rejected_execution_exception", "reason": "rejected" } } }
            ]
        }"#;

        let response = BulkResponse::from_slice(body).unwrap();
        assert_eq!(response.took, 30);
        assert!(response.errors);

        let items = response.into_items();
        assert_eq!(items.len(), 3);
        assert!(items[0].is_success());
        assert_eq!(items[0].result.as_deref(), Some("created"));
        assert_eq!(items[0].id.as_deref(), Some("1"));

        assert!(!items[1].is_success());
        assert_eq!(items[1].status, 409);
        let error = items[1].error.as_ref().unwrap();
        assert_eq!(error.kind, "version_conflict_engine_exception");
        assert_eq!(error.reason, "document already exists");

        assert_eq!(items[2].status, 429);
    }

    #[test]
    fn test_parse_invalid_body() {
        let result = BulkResponse::from_slice(b"not json");
        assert!(matches!(result, Err(SearchError::ParseError(_))));
    }
}
