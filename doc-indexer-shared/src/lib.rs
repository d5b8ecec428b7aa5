//! # Document Indexer Shared
//!
//! Types shared by the bulk document indexer crates: the decoded document
//! model, the bulk action, per-item outcomes and run statistics.

mod action;
mod document;
mod outcome;

pub use action::{BulkAction, ParseActionError};
pub use document::{Document, IndexableItem};
pub use outcome::{OutcomeRecord, RunStatistics};
