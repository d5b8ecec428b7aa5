//! # Document Indexer Pipeline
//!
//! This crate provides the pipeline components for streaming newline-delimited
//! JSON documents into OpenSearch through the bulk API.
//!
//! ## Architecture
//!
//! The pipeline follows the Processor-Loader pattern driven by an orchestrator:
//!
//! 1. **Processor**: Decodes each input line into an indexable item
//! 2. **Loader**: Batches items and submits them from a pool of bulk workers
//! 3. **Retry**: Decides whether a failed submission is attempted again
//! 4. **Collector**: Receives the final outcome of every item
//! 5. **Orchestrator**: Reads the input, drives the flow and reports statistics

pub mod collector;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod retry;

#[cfg(test)]
pub(crate) mod test_utils;

pub use collector::{OutcomeCollector, StatsCollector};
pub use errors::{DecodeError, PipelineError};
pub use loader::{BulkIndexer, BulkIndexerConfig};
pub use orchestrator::{Orchestrator, PipelineConfig, PipelineState, RunReport};
pub use processor::{DecoderConfig, DocumentDecoder};
pub use retry::RetryPolicy;
