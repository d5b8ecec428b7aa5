//! Loader module for the document indexer pipeline.
//!
//! Batches indexable items and submits them to the search engine from a
//! fixed pool of bulk workers.

mod batch;
mod worker;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::collector::OutcomeCollector;
use crate::errors::PipelineError;
use crate::retry::RetryPolicy;
use batch::{Batch, PendingItem};
use doc_indexer_repository::{SearchEngineClient, SearchError};
use doc_indexer_shared::{IndexableItem, OutcomeRecord, RunStatistics};
use worker::BulkWorker;

/// Default number of bulk workers.
pub const DEFAULT_NUM_WORKERS: usize = 4;

/// Default flush threshold in bytes (5 MB).
pub const DEFAULT_FLUSH_BYTES: usize = 5_000_000;

/// Default flush threshold in items.
pub const DEFAULT_FLUSH_ITEMS: usize = 1000;

/// Configuration for the bulk indexer.
#[derive(Debug, Clone)]
pub struct BulkIndexerConfig {
    /// Default index for bulk requests.
    pub index: String,
    /// Number of concurrent bulk workers.
    pub num_workers: usize,
    /// Flush a batch before its body would exceed this many bytes.
    pub flush_bytes: usize,
    /// Flush a batch before it would exceed this many items.
    pub flush_items: usize,
    /// Batches allowed to wait for a worker before `enqueue` blocks.
    /// Defaults to `num_workers` when unset.
    pub queue_depth: Option<usize>,
    /// Retry policy applied by every worker.
    pub retry: RetryPolicy,
}

impl BulkIndexerConfig {
    /// Create a config for the given index with default thresholds.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            num_workers: DEFAULT_NUM_WORKERS,
            flush_bytes: DEFAULT_FLUSH_BYTES,
            flush_items: DEFAULT_FLUSH_ITEMS,
            queue_depth: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    pub fn with_flush_bytes(mut self, flush_bytes: usize) -> Self {
        self.flush_bytes = flush_bytes;
        self
    }

    pub fn with_flush_items(mut self, flush_items: usize) -> Self {
        self.flush_items = flush_items;
        self
    }

    pub fn with_queue_depth(mut self, queue_depth: usize) -> Self {
        self.queue_depth = Some(queue_depth);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Batching submitter backed by a pool of bulk workers.
///
/// The indexer:
/// - Accumulates items into an open batch owned by the caller
/// - Detaches the batch to the worker queue when a threshold would be crossed
/// - Applies backpressure through a bounded queue
/// - Reports every item's outcome to the collector exactly once
///
/// Must be created inside a Tokio runtime; the workers are spawned right away.
pub struct BulkIndexer {
    config: BulkIndexerConfig,
    current: Batch,
    sender: Option<mpsc::Sender<Batch>>,
    workers: Vec<JoinHandle<()>>,
    collector: Arc<dyn OutcomeCollector>,
    num_added: u64,
    num_requests: Arc<AtomicU64>,
}

impl BulkIndexer {
    /// Create a bulk indexer and start its workers.
    pub fn new(
        client: Arc<dyn SearchEngineClient>,
        mut config: BulkIndexerConfig,
        collector: Arc<dyn OutcomeCollector>,
    ) -> Self {
        config.num_workers = config.num_workers.max(1);
        config.flush_items = config.flush_items.max(1);
        let queue_depth = config.queue_depth.unwrap_or(config.num_workers).max(1);

        let (sender, receiver) = mpsc::channel::<Batch>(queue_depth);
        let queue = Arc::new(Mutex::new(receiver));
        let num_requests = Arc::new(AtomicU64::new(0));

        let workers = (0..config.num_workers)
            .map(|id| {
                let worker = BulkWorker {
                    id,
                    index: config.index.clone(),
                    client: Arc::clone(&client),
                    retry: config.retry.clone(),
                    collector: Arc::clone(&collector),
                    num_requests: Arc::clone(&num_requests),
                };
                tokio::spawn(worker.run(Arc::clone(&queue)))
            })
            .collect();

        info!(
            index = %config.index,
            workers = config.num_workers,
            flush_bytes = config.flush_bytes,
            flush_items = config.flush_items,
            queue_depth = queue_depth,
            "Created bulk indexer"
        );

        Self {
            config,
            current: Batch::default(),
            sender: Some(sender),
            workers,
            collector,
            num_added: 0,
            num_requests,
        }
    }

    /// Add an item to the open batch.
    ///
    /// Flushes the open batch first if the item would push it past either
    /// threshold. Blocks while the worker queue is full.
    pub async fn enqueue(&mut self, item: IndexableItem) -> Result<(), PipelineError> {
        self.num_added += 1;

        let payload = match item.to_bulk_payload() {
            Ok(payload) => payload,
            Err(e) => {
                let error = SearchError::serialization(e.to_string());
                self.collector.record(
                    item.action,
                    OutcomeRecord::failure(&item.id, error.kind(), error.to_string()),
                );
                return Ok(());
            }
        };
        let pending = PendingItem::new(item, payload);

        if self
            .current
            .would_overflow(pending.size(), self.config.flush_items, self.config.flush_bytes)
        {
            self.flush().await?;
        }

        self.current.push(pending);

        if self
            .current
            .is_full(self.config.flush_items, self.config.flush_bytes)
        {
            self.flush().await?;
        }

        Ok(())
    }

    /// Hand the open batch to the workers, if it holds anything.
    pub async fn flush(&mut self) -> Result<(), PipelineError> {
        if self.current.is_empty() {
            return Ok(());
        }

        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| PipelineError::channel("bulk indexer is closed"))?;

        let batch = std::mem::take(&mut self.current);
        debug!(
            items = batch.len(),
            bytes = batch.size_bytes(),
            "Flushing batch to bulk workers"
        );

        sender
            .send(batch)
            .await
            .map_err(|_| PipelineError::channel("all bulk workers have stopped"))
    }

    /// Items in the open batch.
    pub fn pending(&self) -> usize {
        self.current.len()
    }

    /// Counters so far, including items still in flight.
    pub fn statistics(&self) -> RunStatistics {
        RunStatistics {
            num_added: self.num_added,
            num_requests: self.num_requests.load(Ordering::Relaxed),
            ..self.collector.statistics()
        }
    }

    /// Flush, wait for every in-flight batch and return the final counters.
    #[instrument(skip(self))]
    pub async fn close(self) -> Result<RunStatistics, PipelineError> {
        self.shutdown(None).await
    }

    /// Like `close`, but abandon batches still running after `grace`.
    ///
    /// The final flush counts against `grace` too, so a full queue cannot
    /// hold up the shutdown. Items in abandoned batches get no outcome.
    #[instrument(skip(self))]
    pub async fn close_with_grace(self, grace: Duration) -> Result<RunStatistics, PipelineError> {
        self.shutdown(Some(grace)).await
    }

    async fn shutdown(mut self, grace: Option<Duration>) -> Result<RunStatistics, PipelineError> {
        match grace {
            None => self.drain().await?,
            Some(grace) => {
                let abort_handles: Vec<_> =
                    self.workers.iter().map(|w| w.abort_handle()).collect();
                match tokio::time::timeout(grace, self.drain()).await {
                    Ok(result) => result?,
                    Err(_) => {
                        warn!(
                            grace_ms = grace.as_millis() as u64,
                            pending = self.current.len(),
                            "Bulk workers did not finish within the grace period, abandoning in-flight batches"
                        );
                        for handle in abort_handles {
                            handle.abort();
                        }
                    }
                }
            }
        }

        let stats = self.statistics();
        info!(
            added = stats.num_added,
            flushed = stats.num_flushed,
            failed = stats.num_failed,
            retried = stats.num_retried,
            requests = stats.num_requests,
            "Bulk indexer closed"
        );

        Ok(stats)
    }

    /// Flush, close the queue and wait for every worker to finish.
    async fn drain(&mut self) -> Result<(), PipelineError> {
        self.flush().await?;
        drop(self.sender.take());

        let workers = std::mem::take(&mut self.workers);
        for result in join_all(workers).await {
            result.map_err(|e| PipelineError::worker(e.to_string()))?;
        }
        Ok(())
    }
}
