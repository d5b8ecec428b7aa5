//! Test doubles shared by the pipeline tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::collector::{OutcomeCollector, StatsCollector};
use doc_indexer_repository::{BulkResponse, BulkResponseItem, SearchEngineClient, SearchError};
use doc_indexer_shared::{BulkAction, OutcomeRecord, RunStatistics};

type Responder =
    Box<dyn Fn(usize, &[String]) -> Result<BulkResponse, SearchError> + Send + Sync>;

/// Mock search client whose replies are computed per call.
///
/// The responder receives the zero-based call number and the payloads of the
/// request. Every request is recorded.
pub(crate) struct MockSearchClient {
    responder: Responder,
    calls: AtomicUsize,
    requests: Mutex<Vec<Vec<String>>>,
}

impl MockSearchClient {
    pub(crate) fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(usize, &[String]) -> Result<BulkResponse, SearchError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every item succeeds with 201 created.
    pub(crate) fn always_ok() -> Self {
        Self::with_responder(|_, payloads| Ok(all_items(payloads.len(), BulkResponseItem::success(201, "created"))))
    }

    /// Every request fails as a whole with `status`.
    pub(crate) fn always_status(status: u16) -> Self {
        Self::with_responder(move |_, _| Err(SearchError::status(status, "{\"error\":\"unavailable\"}")))
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Document IDs per request, in request order.
    pub(crate) fn requested_ids(&self) -> Vec<Vec<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|payloads| payloads.iter().map(|p| payload_id(p)).collect())
            .collect()
    }
}

#[async_trait]
impl SearchEngineClient for MockSearchClient {
    async fn bulk(&self, _index: &str, payloads: Vec<String>) -> Result<BulkResponse, SearchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = (self.responder)(call, &payloads);
        self.requests.lock().unwrap().push(payloads);
        reply
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        Ok(true)
    }
}

/// A response with `count` copies of `item`.
pub(crate) fn all_items(count: usize, item: BulkResponseItem) -> BulkResponse {
    items(vec![item; count])
}

/// A response with the given items, in order.
pub(crate) fn items(items: Vec<BulkResponseItem>) -> BulkResponse {
    BulkResponse {
        took: 1,
        errors: items.iter().any(|i| !i.is_success()),
        items: items
            .into_iter()
            .map(|item| [("index".to_string(), item)].into_iter().collect())
            .collect(),
    }
}

/// The `_id` from a payload's action line.
pub(crate) fn payload_id(payload: &str) -> String {
    let meta: Value = serde_json::from_str(payload.lines().next().unwrap()).unwrap();
    let (_, target) = meta.as_object().unwrap().iter().next().unwrap();
    target["_id"].as_str().unwrap().to_string()
}

/// Collector that records every outcome on top of the usual counters.
#[derive(Default)]
pub(crate) struct RecordingCollector {
    stats: StatsCollector,
    records: Mutex<Vec<OutcomeRecord>>,
}

impl RecordingCollector {
    pub(crate) fn records(&self) -> Vec<OutcomeRecord> {
        self.records.lock().unwrap().clone()
    }

    pub(crate) fn records_for(&self, id: &str) -> Vec<OutcomeRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.id() == id)
            .collect()
    }
}

impl OutcomeCollector for RecordingCollector {
    fn on_success(&self, id: &str, action: BulkAction, status: u16, result: &str) {
        self.stats.on_success(id, action, status, result);
        self.records.lock().unwrap().push(OutcomeRecord::Success {
            id: id.to_string(),
            status,
            result: result.to_string(),
        });
    }

    fn on_failure(&self, id: &str, kind: &str, message: &str) {
        self.stats.on_failure(id, kind, message);
        self.records.lock().unwrap().push(OutcomeRecord::Failure {
            id: id.to_string(),
            kind: kind.to_string(),
            message: message.to_string(),
        });
    }

    fn on_retry(&self, id: &str, attempt: u32, status: Option<u16>) {
        self.stats.on_retry(id, attempt, status);
    }

    fn statistics(&self) -> RunStatistics {
        self.stats.statistics()
    }
}
