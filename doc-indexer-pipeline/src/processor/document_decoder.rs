//! Document decoder implementation.
//!
//! Parses one NDJSON input line into an `IndexableItem`, pulling the
//! identifier out of the body.

use serde_json::Value;

use crate::errors::DecodeError;
use doc_indexer_shared::{BulkAction, IndexableItem};

/// Default name of the identifier field.
pub const DEFAULT_ID_FIELD: &str = "_id";

/// Configuration for the document decoder.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Target index for every decoded item.
    pub index: String,
    /// Field holding the document ID; removed from the body.
    pub id_field: String,
    /// Bulk action applied to every decoded item.
    pub action: BulkAction,
}

impl DecoderConfig {
    /// Create a config for the given index with the default id field and action.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id_field: DEFAULT_ID_FIELD.to_string(),
            action: BulkAction::default(),
        }
    }

    /// Set the identifier field.
    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    /// Set the bulk action.
    pub fn with_action(mut self, action: BulkAction) -> Self {
        self.action = action;
        self
    }
}

/// Decoder that turns input lines into indexable items.
///
/// Decoding is pure: the same line always yields the same item.
#[derive(Debug, Clone)]
pub struct DocumentDecoder {
    config: DecoderConfig,
}

impl DocumentDecoder {
    /// Create a new decoder.
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// The field the decoder reads document IDs from.
    pub fn id_field(&self) -> &str {
        &self.config.id_field
    }

    /// Decode one line.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexableItem)` - The body without the id field, plus the id
    /// * `Err(DecodeError::InvalidJson)` - If the line is not a JSON object
    /// * `Err(DecodeError::MissingId)` - If the id field is absent or null
    /// * `Err(DecodeError::EmptyLine)` - If the line is blank
    pub fn decode(&self, line: &str) -> Result<IndexableItem, DecodeError> {
        if line.trim().is_empty() {
            return Err(DecodeError::EmptyLine);
        }

        let value: Value =
            serde_json::from_str(line).map_err(|e| DecodeError::invalid_json(e.to_string()))?;

        let mut document = match value {
            Value::Object(map) => map,
            other => {
                return Err(DecodeError::invalid_json(format!(
                    "expected a JSON object, found {}",
                    json_type(&other)
                )));
            }
        };

        let id = match document.remove(&self.config.id_field) {
            None | Some(Value::Null) => {
                return Err(DecodeError::missing_id(&self.config.id_field));
            }
            Some(value) => coerce_id(value),
        };

        Ok(IndexableItem::new(
            id,
            &self.config.index,
            self.config.action,
            document,
        ))
    }
}

/// Render an identifier value as text.
///
/// Strings are used verbatim; everything else uses its compact JSON form,
/// so integers have no fractional part and booleans read `true`/`false`.
fn coerce_id(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decoder(id_field: &str) -> DocumentDecoder {
        DocumentDecoder::new(DecoderConfig::new("books").with_id_field(id_field))
    }

    #[test]
    fn test_decode_extracts_and_removes_id() {
        let item = decoder("id").decode(r#"{"id":"1","title":"x"}"#).unwrap();

        assert_eq!(item.id, "1");
        assert_eq!(item.index, "books");
        assert_eq!(item.action, BulkAction::Index);
        assert_eq!(Value::Object(item.document), json!({ "title": "x" }));
    }

    #[test]
    fn test_decode_missing_id() {
        let result = decoder("id").decode(r#"{"title":"x"}"#);
        assert_eq!(result, Err(DecodeError::missing_id("id")));
    }

    #[test]
    fn test_decode_null_id_is_missing() {
        let result = decoder("id").decode(r#"{"id":null,"title":"x"}"#);
        assert_eq!(result, Err(DecodeError::missing_id("id")));
    }

    #[test]
    fn test_decode_default_id_field() {
        let decoder = DocumentDecoder::new(DecoderConfig::new("books"));
        let item = decoder.decode(r#"{"_id":"abc","id":"kept"}"#).unwrap();

        assert_eq!(decoder.id_field(), "_id");
        assert_eq!(item.id, "abc");
        assert_eq!(Value::Object(item.document), json!({ "id": "kept" }));
    }

    #[test]
    fn test_decode_coerces_non_string_ids() {
        let decoder = decoder("id");

        assert_eq!(decoder.decode(r#"{"id":42}"#).unwrap().id, "42");
        assert_eq!(decoder.decode(r#"{"id":-7}"#).unwrap().id, "-7");
        assert_eq!(decoder.decode(r#"{"id":1.5}"#).unwrap().id, "1.5");
        assert_eq!(decoder.decode(r#"{"id":true}"#).unwrap().id, "true");
        assert_eq!(decoder.decode(r#"{"id":[1,2]}"#).unwrap().id, "[1,2]");
    }

    #[test]
    fn test_decode_invalid_json() {
        let result = decoder("id").decode(r#"{"id":"1","#);
        assert!(matches!(result, Err(DecodeError::InvalidJson(_))));
    }

    #[test]
    fn test_decode_non_object() {
        let result = decoder("id").decode(r#"["id", 1]"#);
        assert_eq!(
            result,
            Err(DecodeError::invalid_json(
                "expected a JSON object, found an array"
            ))
        );
    }

    #[test]
    fn test_decode_empty_line() {
        assert_eq!(decoder("id").decode("   "), Err(DecodeError::EmptyLine));
    }

    #[test]
    fn test_decode_is_idempotent() {
        let decoder = decoder("id");
        let line = r#"{"id":"9","nested":{"a":[1,2,{"b":null}]},"n":3}"#;

        assert_eq!(decoder.decode(line).unwrap(), decoder.decode(line).unwrap());
    }

    #[test]
    fn test_body_never_contains_id_field() {
        let decoder = decoder("key");
        let lines = [
            r#"{"key":"a","x":1}"#,
            r#"{"x":1,"key":2}"#,
            r#"{"key":{"inner":"key"},"key2":"v"}"#,
        ];

        for line in lines {
            let item = decoder.decode(line).unwrap();
            assert!(!item.document.contains_key("key"), "line: {}", line);
        }
    }

    #[test]
    fn test_decode_applies_action() {
        let decoder = DocumentDecoder::new(
            DecoderConfig::new("books")
                .with_id_field("id")
                .with_action(BulkAction::Delete),
        );
        let item = decoder.decode(r#"{"id":"1"}"#).unwrap();

        assert_eq!(item.action, BulkAction::Delete);
        assert!(item.document.is_empty());
    }
}
