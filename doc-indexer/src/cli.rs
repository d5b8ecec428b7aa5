//! Command line interface.

use clap::{Args, Parser, Subcommand};

use doc_indexer_pipeline::loader::{DEFAULT_FLUSH_BYTES, DEFAULT_FLUSH_ITEMS, DEFAULT_NUM_WORKERS};
use doc_indexer_pipeline::processor::DEFAULT_ID_FIELD;
use doc_indexer_pipeline::retry::{DEFAULT_BACKOFF_UNIT, DEFAULT_MAX_ATTEMPTS};
use doc_indexer_repository::config::DEFAULT_OPENSEARCH_URL;
use doc_indexer_shared::BulkAction;

#[derive(Parser, Debug)]
#[command(name = "opensearch-doc")]
#[command(about = "Load newline-delimited JSON documents into OpenSearch", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// OpenSearch URL
    #[arg(long, env = "OPENSEARCH_URL", default_value = DEFAULT_OPENSEARCH_URL, global = true)]
    pub opensearch_url: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index documents read from stdin, one JSON object per line
    Bulk(BulkArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BulkArgs {
    /// Target index
    #[arg(short, long)]
    pub index: String,

    /// Document field holding the document ID
    #[arg(short = 'f', long, default_value = DEFAULT_ID_FIELD)]
    pub id_field: String,

    /// Bulk action: index, create, update or delete
    #[arg(short, long, default_value = "index")]
    pub action: BulkAction,

    /// Number of concurrent bulk workers
    #[arg(long, default_value_t = DEFAULT_NUM_WORKERS)]
    pub workers: usize,

    /// Flush a batch before its body exceeds this many bytes
    #[arg(long, default_value_t = DEFAULT_FLUSH_BYTES)]
    pub flush_bytes: usize,

    /// Flush a batch before it exceeds this many documents
    #[arg(long, default_value_t = DEFAULT_FLUSH_ITEMS)]
    pub flush_items: usize,

    /// Attempts per document, including the first, on 429/502/503/504
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_retries: u32,

    /// Backoff unit in milliseconds; attempt N waits N times this long
    #[arg(long, default_value_t = DEFAULT_BACKOFF_UNIT.as_millis() as u64)]
    pub retry_backoff_ms: u64,

    /// Flush the open batch every this many seconds (0 disables)
    #[arg(long, default_value_t = 30)]
    pub flush_interval_secs: u64,

    /// Timeout of a single bulk request in seconds
    #[arg(long, default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Seconds in-flight batches get to finish after Ctrl-C
    #[arg(long, default_value_t = 10)]
    pub shutdown_grace_secs: u64,

    /// Do not verify cluster health before reading input
    #[arg(long)]
    pub skip_health_check: bool,
}
