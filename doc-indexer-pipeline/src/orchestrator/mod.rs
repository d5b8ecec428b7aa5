//! Orchestrator module for the document indexer pipeline.
//!
//! Reads the input stream, drives the decoder and the bulk indexer, and
//! reports the final statistics.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use crate::collector::{OutcomeCollector, StatsCollector};
use crate::errors::{DecodeError, PipelineError};
use crate::loader::{BulkIndexer, BulkIndexerConfig};
use crate::processor::{DecoderConfig, DocumentDecoder};
use doc_indexer_repository::SearchEngineClient;
use doc_indexer_shared::{IndexableItem, RunStatistics};

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// How input lines become items.
    pub decoder: DecoderConfig,
    /// Batching, workers and retries.
    pub indexer: BulkIndexerConfig,
    /// Flush the open batch periodically at this interval, whether or not
    /// input is still arriving. `None` disables timed flushes.
    pub flush_interval: Option<Duration>,
    /// Time in-flight batches get to finish after a shutdown signal.
    pub shutdown_grace: Duration,
}

impl PipelineConfig {
    /// Create a config for the given index with default settings.
    pub fn new(index: impl Into<String>) -> Self {
        let index = index.into();
        Self {
            decoder: DecoderConfig::new(index.clone()),
            indexer: BulkIndexerConfig::new(index),
            flush_interval: Some(Duration::from_secs(30)),
            shutdown_grace: Duration::from_secs(10),
        }
    }
}

/// Lifecycle of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Reading,
    Draining,
    Reported,
}

/// Final report of a pipeline run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Counters from the bulk indexer.
    pub stats: RunStatistics,
    /// Lines that could not be decoded.
    pub skipped_lines: u64,
    /// Reading stopped because of a shutdown signal.
    pub cancelled: bool,
    /// Reading stopped because the input could not be read.
    pub input_error: Option<String>,
    /// Wall time of the run.
    pub elapsed: Duration,
}

impl RunReport {
    /// True when every item was indexed and the whole input was read.
    pub fn is_success(&self) -> bool {
        !self.stats.has_failures() && !self.cancelled && self.input_error.is_none()
    }

    /// One-line summary of the run.
    pub fn summary(&self) -> String {
        format!(
            "Indexed [{}] documents with [{}] errors",
            self.stats.num_flushed, self.stats.num_failed
        )
    }
}

/// Orchestrator that coordinates the pipeline components.
///
/// The orchestrator:
/// - Reads the input one line at a time
/// - Skips lines that fail to decode
/// - Feeds items to the bulk indexer, flushing on a timer when idle
/// - Stops reading on a shutdown signal
/// - Waits for every batch to settle and reports the statistics
pub struct Orchestrator {
    client: Arc<dyn SearchEngineClient>,
    decoder: DocumentDecoder,
    collector: Arc<dyn OutcomeCollector>,
    config: PipelineConfig,
    state: PipelineState,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl Orchestrator {
    /// Create a new orchestrator that counts outcomes with a `StatsCollector`.
    pub fn new(client: Arc<dyn SearchEngineClient>, config: PipelineConfig) -> Self {
        Self::with_collector(client, config, Arc::new(StatsCollector::new()))
    }

    /// Create a new orchestrator reporting outcomes to `collector`.
    pub fn with_collector(
        client: Arc<dyn SearchEngineClient>,
        config: PipelineConfig,
        collector: Arc<dyn OutcomeCollector>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        Self {
            client,
            decoder: DocumentDecoder::new(config.decoder.clone()),
            collector,
            config,
            state: PipelineState::Idle,
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// A handle that triggers a graceful shutdown when sent to.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Trigger a graceful shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Run the pipeline over `input` until it ends or a shutdown is signalled.
    ///
    /// Per-line and per-item failures never end the run early; they show up
    /// in the report.
    #[instrument(skip(self, input), fields(index = %self.config.decoder.index))]
    pub async fn run<R>(mut self, mut input: R) -> Result<RunReport, PipelineError>
    where
        R: AsyncBufRead + Unpin,
    {
        let started = Instant::now();
        let mut indexer = BulkIndexer::new(
            Arc::clone(&self.client),
            self.config.indexer.clone(),
            Arc::clone(&self.collector),
        );
        let mut ticker = self.config.flush_interval.map(flush_ticker);

        self.transition(PipelineState::Reading);

        let mut buf = Vec::new();
        let mut line_number: u64 = 0;
        let mut skipped_lines: u64 = 0;
        let mut cancelled = false;
        let mut input_error = None;

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.recv() => {
                    info!(lines = line_number, "Received shutdown signal, no longer reading input");
                    cancelled = true;
                    break;
                }
                _ = tick(&mut ticker) => {
                    if indexer.pending() > 0 {
                        debug!(items = indexer.pending(), "Flush interval elapsed");
                        match unless_shutdown(&mut self.shutdown_rx, indexer.flush()).await {
                            Some(result) => result?,
                            None => {
                                info!(lines = line_number, "Received shutdown signal while waiting for a bulk worker");
                                cancelled = true;
                                break;
                            }
                        }
                    }
                }
                read = input.read_until(b'\n', &mut buf) => {
                    match read {
                        Ok(0) if buf.is_empty() => {
                            info!(lines = line_number, "Reached end of input");
                            break;
                        }
                        Ok(_) => {
                            line_number += 1;
                            if let Some(item) = self.decode_line(&buf, line_number, &mut skipped_lines) {
                                match unless_shutdown(&mut self.shutdown_rx, indexer.enqueue(item)).await {
                                    Some(result) => result?,
                                    None => {
                                        info!(lines = line_number, "Received shutdown signal while waiting for a bulk worker");
                                        cancelled = true;
                                        break;
                                    }
                                }
                            }
                            buf.clear();
                        }
                        Err(e) => {
                            error!(line = line_number + 1, error = %e, "Failed to read input, no longer reading");
                            input_error = Some(e.to_string());
                            break;
                        }
                    }
                }
            }
        }

        self.transition(PipelineState::Draining);
        let stats = if cancelled {
            indexer.close_with_grace(self.config.shutdown_grace).await?
        } else {
            indexer.close().await?
        };

        self.transition(PipelineState::Reported);
        let report = RunReport {
            stats,
            skipped_lines,
            cancelled,
            input_error,
            elapsed: started.elapsed(),
        };

        if report.stats.has_failures() {
            warn!(
                flushed = report.stats.num_flushed,
                failed = report.stats.num_failed,
                skipped_lines = report.skipped_lines,
                "Indexed [{}] documents with [{}] errors",
                report.stats.num_flushed,
                report.stats.num_failed
            );
        } else {
            info!(
                flushed = report.stats.num_flushed,
                skipped_lines = report.skipped_lines,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "Successfully indexed [{}] documents",
                report.stats.num_flushed
            );
        }

        Ok(report)
    }

    /// Decode one raw line, logging and counting lines that are skipped.
    fn decode_line(&self, raw: &[u8], line_number: u64, skipped: &mut u64) -> Option<IndexableItem> {
        let decoded = std::str::from_utf8(raw)
            .map_err(|e| DecodeError::invalid_json(e.to_string()))
            .and_then(|line| self.decoder.decode(line.trim_end_matches(['\n', '\r'])));

        match decoded {
            Ok(item) => Some(item),
            Err(DecodeError::EmptyLine) => {
                debug!(line = line_number, "Skipping empty line");
                None
            }
            Err(e) => {
                *skipped += 1;
                warn!(line = line_number, error = %e, "Skipping line");
                None
            }
        }
    }

    fn transition(&mut self, next: PipelineState) {
        debug!(from = ?self.state, to = ?next, "Pipeline state change");
        self.state = next;
    }
}

/// Run `work` unless a shutdown signal arrives first.
async fn unless_shutdown<F: Future>(
    shutdown: &mut broadcast::Receiver<()>,
    work: F,
) -> Option<F::Output> {
    tokio::select! {
        biased;

        _ = shutdown.recv() => None,
        output = work => Some(output),
    }
}

fn flush_ticker(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
