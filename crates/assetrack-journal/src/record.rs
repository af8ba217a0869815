//! Logged store mutations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One store mutation, as persisted in a record frame.
///
/// Records are replayed in order on open; replaying the full journal
/// reproduces the store state at the time of the last append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum JournalRecord {
    /// A document was inserted.
    Insert {
        /// Target collection.
        collection: String,
        /// Full document, including its `_id`.
        document: Map<String, Value>,
    },
    /// Fields were set on the document with the given `_id`.
    Update {
        /// Target collection.
        collection: String,
        /// String form of the document's `_id`.
        id: String,
        /// Field values written by the update.
        set: Map<String, Value>,
    },
    /// A unique index was declared.
    Index {
        /// Target collection.
        collection: String,
        /// Indexed field.
        field: String,
        /// Serialized partial scope filter.
        scope: Value,
    },
}

impl JournalRecord {
    /// Returns the collection the record applies to.
    pub fn collection(&self) -> &str {
        match self {
            JournalRecord::Insert { collection, .. }
            | JournalRecord::Update { collection, .. }
            | JournalRecord::Index { collection, .. } => collection,
        }
    }
}
