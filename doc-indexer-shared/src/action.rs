//! Bulk action type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The operation a bulk item performs against the target index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    /// Create or replace the document.
    #[default]
    Index,
    /// Create the document, failing if it already exists.
    Create,
    /// Partially update an existing document.
    Update,
    /// Remove the document.
    Delete,
}

impl BulkAction {
    /// All supported actions, in CLI help order.
    pub const ALL: [BulkAction; 4] = [
        BulkAction::Index,
        BulkAction::Create,
        BulkAction::Update,
        BulkAction::Delete,
    ];

    /// The action name used on the bulk metadata line.
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Index => "index",
            BulkAction::Create => "create",
            BulkAction::Update => "update",
            BulkAction::Delete => "delete",
        }
    }

    /// Whether the bulk operation carries a source line.
    pub fn has_source(&self) -> bool {
        !matches!(self, BulkAction::Delete)
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an action name is not one of `index|create|update|delete`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown bulk action '{0}', expected one of: index, create, update, delete")]
pub struct ParseActionError(pub String);

impl FromStr for BulkAction {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BulkAction::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseActionError(s.to_string()))
    }
}
