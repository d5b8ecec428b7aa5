//! Per-item outcomes and aggregate run statistics.

use serde::Serialize;

/// Final resolution of one item, reported exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeRecord {
    /// The backend accepted the operation.
    Success {
        id: String,
        status: u16,
        result: String,
    },
    /// The operation failed permanently.
    Failure {
        id: String,
        kind: String,
        message: String,
    },
}

impl OutcomeRecord {
    pub fn success(id: impl Into<String>, status: u16, result: impl Into<String>) -> Self {
        OutcomeRecord::Success {
            id: id.into(),
            status,
            result: result.into(),
        }
    }

    pub fn failure(id: impl Into<String>, kind: impl Into<String>, message: impl Into<String>) -> Self {
        OutcomeRecord::Failure {
            id: id.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// The document ID this outcome belongs to.
    pub fn id(&self) -> &str {
        match self {
            OutcomeRecord::Success { id, .. } | OutcomeRecord::Failure { id, .. } => id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeRecord::Success { .. })
    }
}

/// Counters for one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    /// Items accepted by the batcher.
    pub num_added: u64,
    /// Items the backend accepted.
    pub num_flushed: u64,
    /// Items that failed permanently.
    pub num_failed: u64,
    /// Extra submission attempts beyond the first, summed over items.
    pub num_retried: u64,
    /// Bulk HTTP requests sent.
    pub num_requests: u64,
    pub num_indexed: u64,
    pub num_created: u64,
    pub num_updated: u64,
    pub num_deleted: u64,
}

impl RunStatistics {
    pub fn has_failures(&self) -> bool {
        self.num_failed > 0
    }
}
