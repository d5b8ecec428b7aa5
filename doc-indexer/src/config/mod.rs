//! Configuration and dependency wiring.

mod dependencies;

pub use dependencies::Dependencies;

use std::time::Duration;

use crate::cli::BulkArgs;
use doc_indexer_pipeline::retry::RetryPolicy;
use doc_indexer_pipeline::PipelineConfig;
use doc_indexer_repository::ClientConfig;

/// Client settings for a bulk run.
pub fn client_config(opensearch_url: &str, args: &BulkArgs) -> ClientConfig {
    ClientConfig::new(opensearch_url).with_timeout(Duration::from_secs(args.request_timeout_secs))
}

/// Pipeline settings for a bulk run.
pub fn pipeline_config(args: &BulkArgs) -> PipelineConfig {
    let retry = RetryPolicy::default()
        .with_max_attempts(args.max_retries)
        .with_linear_backoff(Duration::from_millis(args.retry_backoff_ms));

    let mut config = PipelineConfig::new(&args.index);
    config.decoder = config
        .decoder
        .with_id_field(&args.id_field)
        .with_action(args.action);
    config.indexer = config
        .indexer
        .with_num_workers(args.workers)
        .with_flush_bytes(args.flush_bytes)
        .with_flush_items(args.flush_items)
        .with_retry(retry);
    config.flush_interval = match args.flush_interval_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    config.shutdown_grace = Duration::from_secs(args.shutdown_grace_secs);
    config
}
