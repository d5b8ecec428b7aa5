//! Error types for the document indexer pipeline.

use thiserror::Error;

/// Errors that stop the pipeline itself.
///
/// Per-item failures are not errors at this level; they are reported as
/// outcomes through the collector.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The worker queue was closed while batches were still being sent.
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// A bulk worker task panicked or was cancelled.
    #[error("Worker error: {0}")]
    WorkerError(String),
}

impl PipelineError {
    /// Create a channel error.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::ChannelError(msg.into())
    }

    /// Create a worker error.
    pub fn worker(msg: impl Into<String>) -> Self {
        Self::WorkerError(msg.into())
    }
}

/// Reasons a single input line cannot be turned into an indexable item.
///
/// The line is skipped and ingestion continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Not valid JSON, or valid JSON that is not an object.
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// The id field is absent or null.
    #[error("document does not contain a value for the id field '{field}'")]
    MissingId { field: String },

    /// The line holds nothing but whitespace.
    #[error("empty line")]
    EmptyLine,
}

impl DecodeError {
    /// Create an invalid JSON error.
    pub fn invalid_json(msg: impl Into<String>) -> Self {
        Self::InvalidJson(msg.into())
    }

    /// Create a missing id error.
    pub fn missing_id(field: impl Into<String>) -> Self {
        Self::MissingId {
            field: field.into(),
        }
    }
}
