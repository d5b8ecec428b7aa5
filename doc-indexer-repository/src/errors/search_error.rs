//! Search error types.
//!
//! This module defines the error types that can occur while talking to the
//! search engine.

use thiserror::Error;

/// Errors that can occur during search engine operations.
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    /// Failed to build the client or reach the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The search engine answered with a non-success HTTP status.
    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The bulk response does not line up with the request.
    #[error("Bulk index error: {0}")]
    BulkIndexError(String),

    /// Failed to parse response from search engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the search engine.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The cluster health request failed.
    #[error("Health check error: {0}")]
    HealthCheckError(String),
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a status error.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Create a bulk index error.
    pub fn bulk_index(msg: impl Into<String>) -> Self {
        Self::BulkIndexError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a health check error.
    pub fn health_check(msg: impl Into<String>) -> Self {
        Self::HealthCheckError(msg.into())
    }

    /// The HTTP status carried by the error, if the server answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the request never got an answer from the server.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::ConnectionError(_))
    }

    /// Short machine-readable kind, used when reporting failed items.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionError(_) => "connection_error",
            Self::Status { .. } => "http_status_error",
            Self::BulkIndexError(_) => "bulk_index_error",
            Self::ParseError(_) => "parse_error",
            Self::SerializationError(_) => "serialization_error",
            Self::HealthCheckError(_) => "health_check_error",
        }
    }
}
