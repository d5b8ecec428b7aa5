//! Error types for the document indexer repository.

mod search_error;

pub use search_error::SearchError;
