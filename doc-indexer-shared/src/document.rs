//! Document and bulk item types.

use serde_json::{json, Map, Value};

use crate::BulkAction;

/// A decoded JSON object, minus its identifier field.
///
/// Keys serialize in sorted order, so rendering the same document twice
/// yields the same bytes.
pub type Document = Map<String, Value>;

/// One unit of work for the bulk indexer.
///
/// Built by the decoder and moved into the batcher; never shared.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexableItem {
    /// Document ID, coerced to its textual form.
    pub id: String,
    /// Target index name.
    pub index: String,
    /// Bulk operation to perform.
    pub action: BulkAction,
    /// Document body without the identifier field.
    pub document: Document,
}

impl IndexableItem {
    /// Create a new item.
    pub fn new(
        id: impl Into<String>,
        index: impl Into<String>,
        action: BulkAction,
        document: Document,
    ) -> Self {
        Self {
            id: id.into(),
            index: index.into(),
            action,
            document,
        }
    }

    /// Render the item as bulk NDJSON, without the trailing newline.
    ///
    /// The first line is the action metadata. Every action except `delete`
    /// is followed by a source line; `update` sends the body as a partial
    /// document.
    pub fn to_bulk_payload(&self) -> Result<String, serde_json::Error> {
        let mut meta = Map::new();
        meta.insert(
            self.action.as_str().to_string(),
            json!({ "_index": self.index, "_id": self.id }),
        );

        let mut payload = serde_json::to_string(&meta)?;
        match self.action {
            BulkAction::Delete => {}
            BulkAction::Update => {
                payload.push('\n');
                payload.push_str(&serde_json::to_string(&json!({ "doc": self.document }))?);
            }
            BulkAction::Index | BulkAction::Create => {
                payload.push('\n');
                payload.push_str(&serde_json::to_string(&self.document)?);
            }
        }

        Ok(payload)
    }
}
