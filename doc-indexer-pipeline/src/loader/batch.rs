//! Batches of items waiting for a bulk request.

use doc_indexer_shared::IndexableItem;

/// An item together with its rendered bulk payload.
#[derive(Debug, Clone)]
pub(crate) struct PendingItem {
    pub(crate) item: IndexableItem,
    pub(crate) payload: String,
}

impl PendingItem {
    pub(crate) fn new(item: IndexableItem, payload: String) -> Self {
        Self { item, payload }
    }

    /// Bytes the item adds to the request body, newline included.
    pub(crate) fn size(&self) -> usize {
        self.payload.len() + 1
    }
}

/// Ordered items bound for one bulk request.
///
/// Owned by the producer until flushed, then by exactly one worker.
#[derive(Debug, Default)]
pub(crate) struct Batch {
    items: Vec<PendingItem>,
    size_bytes: usize,
}

impl Batch {
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Whether adding an item of `size` bytes would cross either limit.
    ///
    /// An empty batch always accepts the item, so an oversized item is sent
    /// on its own.
    pub(crate) fn would_overflow(&self, size: usize, max_items: usize, max_bytes: usize) -> bool {
        !self.is_empty() && (self.items.len() + 1 > max_items || self.size_bytes + size > max_bytes)
    }

    /// Whether the batch has reached either limit.
    pub(crate) fn is_full(&self, max_items: usize, max_bytes: usize) -> bool {
        self.items.len() >= max_items || self.size_bytes >= max_bytes
    }

    pub(crate) fn push(&mut self, item: PendingItem) {
        self.size_bytes += item.size();
        self.items.push(item);
    }

    pub(crate) fn into_items(self) -> Vec<PendingItem> {
        self.items
    }
}
