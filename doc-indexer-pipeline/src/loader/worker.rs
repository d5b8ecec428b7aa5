//! Bulk worker implementation.
//!
//! Each worker takes detached batches off the shared queue and sends them,
//! retrying transient failures item by item.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, instrument, warn};

use crate::collector::OutcomeCollector;
use crate::loader::batch::{Batch, PendingItem};
use crate::retry::RetryPolicy;
use doc_indexer_repository::{BulkResponse, BulkResponseItem, SearchEngineClient, SearchError};
use doc_indexer_shared::OutcomeRecord;

/// Receiving end of the batch queue, shared by every worker.
pub(crate) type BatchQueue = Arc<Mutex<mpsc::Receiver<Batch>>>;

pub(crate) struct BulkWorker {
    pub(crate) id: usize,
    pub(crate) index: String,
    pub(crate) client: Arc<dyn SearchEngineClient>,
    pub(crate) retry: RetryPolicy,
    pub(crate) collector: Arc<dyn OutcomeCollector>,
    pub(crate) num_requests: Arc<AtomicU64>,
}

impl BulkWorker {
    /// Process batches until the queue is closed and drained.
    pub(crate) async fn run(self, queue: BatchQueue) {
        debug!(worker = self.id, "Bulk worker started");

        loop {
            let batch = {
                let mut receiver = queue.lock().await;
                receiver.recv().await
            };

            match batch {
                Some(batch) => self.submit(batch).await,
                None => break,
            }
        }

        debug!(worker = self.id, "Bulk worker stopped");
    }

    /// Send one batch, retrying until every item is resolved.
    #[instrument(skip(self, batch), fields(worker = self.id, items = batch.len(), bytes = batch.size_bytes()))]
    async fn submit(&self, batch: Batch) {
        let mut pending = batch.into_items();
        let mut attempt: u32 = 1;

        loop {
            let payloads = pending.iter().map(|p| p.payload.clone()).collect();
            self.num_requests.fetch_add(1, Ordering::Relaxed);

            let retry = match self.client.bulk(&self.index, payloads).await {
                Ok(response) => self.resolve_items(pending, response, attempt),
                Err(e) => self.resolve_request_error(pending, e, attempt),
            };

            if retry.is_empty() {
                return;
            }

            let delay = self.retry.backoff_delay(attempt);
            warn!(
                attempt = attempt,
                items = retry.len(),
                delay_ms = delay.as_millis() as u64,
                "Bulk request had transient failures, retrying"
            );
            tokio::time::sleep(delay).await;

            attempt += 1;
            pending = retry;
        }
    }

    /// Report every resolved item and return the ones to send again.
    fn resolve_items(
        &self,
        pending: Vec<PendingItem>,
        response: BulkResponse,
        attempt: u32,
    ) -> Vec<PendingItem> {
        let results = response.into_items();

        if results.len() != pending.len() {
            let error = SearchError::bulk_index(format!(
                "bulk response contained {} items for {} operations",
                results.len(),
                pending.len()
            ));
            for p in pending {
                self.report(&p, OutcomeRecord::failure(&p.item.id, error.kind(), error.to_string()));
            }
            return Vec::new();
        }

        let mut retry = Vec::new();
        for (p, result) in pending.into_iter().zip(results) {
            if result.is_success() {
                let outcome = OutcomeRecord::success(
                    &p.item.id,
                    result.status,
                    result.result.as_deref().unwrap_or("ok"),
                );
                self.report(&p, outcome);
            } else if self.retry.should_retry(attempt, result.status) {
                self.collector
                    .on_retry(&p.item.id, attempt, Some(result.status));
                retry.push(p);
            } else {
                let (kind, reason) = item_error(&result);
                let transient = self.retry.is_retryable_status(result.status);
                let message = self.final_message(reason, transient, attempt);
                self.report(&p, OutcomeRecord::failure(&p.item.id, kind, message));
            }
        }

        retry
    }

    /// Apply a whole-request failure to every pending item.
    fn resolve_request_error(
        &self,
        pending: Vec<PendingItem>,
        error: SearchError,
        attempt: u32,
    ) -> Vec<PendingItem> {
        let (transient, retryable) = match error.status_code() {
            Some(status) => (
                self.retry.is_retryable_status(status),
                self.retry.should_retry(attempt, status),
            ),
            None if error.is_transport() => (true, self.retry.should_retry_transport(attempt)),
            None => (false, false),
        };

        if retryable {
            for p in &pending {
                self.collector
                    .on_retry(&p.item.id, attempt, error.status_code());
            }
            return pending;
        }

        let message = self.final_message(error.to_string(), transient, attempt);
        for p in pending {
            self.report(&p, OutcomeRecord::failure(&p.item.id, error.kind(), message.as_str()));
        }
        Vec::new()
    }

    fn report(&self, pending: &PendingItem, outcome: OutcomeRecord) {
        self.collector.record(pending.item.action, outcome);
    }

    fn final_message(&self, reason: String, transient: bool, attempt: u32) -> String {
        if transient {
            format!("{} (gave up after {} attempts)", reason, attempt)
        } else {
            reason
        }
    }
}

/// Error type and reason for a failed item.
fn item_error(result: &BulkResponseItem) -> (String, String) {
    match &result.error {
        Some(error) => (error.kind.clone(), error.reason.clone()),
        None => (
            format!("status_{}", result.status),
            format!(
                "operation returned status {} ({})",
                result.status,
                result.result.as_deref().unwrap_or("no result")
            ),
        ),
    }
}
