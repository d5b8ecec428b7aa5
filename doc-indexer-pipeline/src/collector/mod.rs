//! Outcome collector for the document indexer pipeline.
//!
//! Receives the final outcome of every item from the bulk workers and keeps
//! the run counters.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{error, info, warn};

use doc_indexer_shared::{BulkAction, OutcomeRecord, RunStatistics};

/// Receives per-item notifications from the bulk workers.
///
/// `on_success` or `on_failure` is called exactly once per item, however
/// many times it was sent. Calls arrive concurrently from every worker.
pub trait OutcomeCollector: Send + Sync {
    /// The backend accepted the item.
    fn on_success(&self, id: &str, action: BulkAction, status: u16, result: &str);

    /// The item failed permanently.
    fn on_failure(&self, id: &str, kind: &str, message: &str);

    /// The item failed on `attempt` and will be sent again.
    ///
    /// `status` is `None` when the request got no answer.
    fn on_retry(&self, _id: &str, _attempt: u32, _status: Option<u16>) {}

    /// Counters accumulated so far.
    fn statistics(&self) -> RunStatistics;

    /// Report a resolved item for a `action` operation.
    fn record(&self, action: BulkAction, outcome: OutcomeRecord) {
        match outcome {
            OutcomeRecord::Success { id, status, result } => {
                self.on_success(&id, action, status, &result)
            }
            OutcomeRecord::Failure { id, kind, message } => self.on_failure(&id, &kind, &message),
        }
    }
}

/// Collector that logs every outcome and keeps atomic counters.
#[derive(Debug, Default)]
pub struct StatsCollector {
    num_flushed: AtomicU64,
    num_failed: AtomicU64,
    num_retried: AtomicU64,
    num_indexed: AtomicU64,
    num_created: AtomicU64,
    num_updated: AtomicU64,
    num_deleted: AtomicU64,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutcomeCollector for StatsCollector {
    fn on_success(&self, id: &str, action: BulkAction, status: u16, result: &str) {
        self.num_flushed.fetch_add(1, Ordering::Relaxed);
        let counter = match action {
            BulkAction::Index => &self.num_indexed,
            BulkAction::Create => &self.num_created,
            BulkAction::Update => &self.num_updated,
            BulkAction::Delete => &self.num_deleted,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        info!(
            document_id = %id,
            status = status,
            result = %result,
            "[{}] {} {}",
            status,
            result,
            id
        );
    }

    fn on_failure(&self, id: &str, kind: &str, message: &str) {
        self.num_failed.fetch_add(1, Ordering::Relaxed);
        error!(document_id = %id, "ERROR: {}: {}", kind, message);
    }

    fn on_retry(&self, id: &str, attempt: u32, status: Option<u16>) {
        self.num_retried.fetch_add(1, Ordering::Relaxed);
        warn!(
            document_id = %id,
            attempt = attempt,
            status = ?status,
            "Item failed with a transient error, retrying"
        );
    }

    fn statistics(&self) -> RunStatistics {
        RunStatistics {
            num_flushed: self.num_flushed.load(Ordering::Relaxed),
            num_failed: self.num_failed.load(Ordering::Relaxed),
            num_retried: self.num_retried.load(Ordering::Relaxed),
            num_indexed: self.num_indexed.load(Ordering::Relaxed),
            num_created: self.num_created.load(Ordering::Relaxed),
            num_updated: self.num_updated.load(Ordering::Relaxed),
            num_deleted: self.num_deleted.load(Ordering::Relaxed),
            ..RunStatistics::default()
        }
    }
}
