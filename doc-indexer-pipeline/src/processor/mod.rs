//! Processor module for the document indexer pipeline.
//!
//! Turns raw input lines into indexable items.

mod document_decoder;

pub use document_decoder::{DecoderConfig, DocumentDecoder, DEFAULT_ID_FIELD};
