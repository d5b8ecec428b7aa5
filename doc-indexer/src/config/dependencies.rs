//! Dependency initialization and wiring for the document indexer.

use std::sync::Arc;
use tracing::info;

use super::{client_config, pipeline_config};
use crate::cli::BulkArgs;
use crate::IndexingError;
use doc_indexer_pipeline::orchestrator::Orchestrator;
use doc_indexer_repository::{OpenSearchClient, SearchEngineClient};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies for a bulk run.
    ///
    /// Fails before any input is read when the client cannot be built or,
    /// unless `--skip-health-check` is given, the cluster is unreachable or
    /// red.
    pub async fn new(opensearch_url: &str, args: &BulkArgs) -> Result<Self, IndexingError> {
        info!(
            opensearch_url = %opensearch_url,
            index = %args.index,
            action = %args.action,
            workers = args.workers,
            "Initializing dependencies"
        );

        let search_client = OpenSearchClient::new(&client_config(opensearch_url, args))
            .map_err(|e| IndexingError::config(format!("Failed to create OpenSearch client: {}", e)))?;

        if args.skip_health_check {
            info!("Skipping OpenSearch health check");
        } else {
            let healthy = search_client
                .health_check()
                .await
                .map_err(|e| IndexingError::config(format!("OpenSearch health check failed: {}", e)))?;

            if !healthy {
                return Err(IndexingError::config("OpenSearch cluster is unhealthy"));
            }

            info!("OpenSearch connection verified");
        }

        let orchestrator = Orchestrator::new(Arc::new(search_client), pipeline_config(args));

        Ok(Self { orchestrator })
    }
}
