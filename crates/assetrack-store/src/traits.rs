use crate::context::OpContext;
use crate::document::{Document, ObjectId};
use crate::error::StoreError;
use crate::filter::Filter;

/// Result of an [`DocumentStore::update_one`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    /// Number of documents the filter selected (0 or 1).
    pub matched: u64,
    /// Number of documents whose content changed (0 or 1).
    pub modified: u64,
}

impl UpdateOutcome {
    /// True when no document matched the filter.
    pub fn is_not_found(&self) -> bool {
        self.matched == 0
    }
}

/// Gateway to a document store.
///
/// Every call is one blocking round trip. Implementations must call
/// [`OpContext::check`] before touching data and must apply unique-index
/// checks atomically with the write they guard.
pub trait DocumentStore {
    /// Returns the first document in `collection` matching `filter`.
    fn find_one(
        &self,
        ctx: &OpContext,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    /// Returns every document in `collection` matching `filter`, in insertion order.
    fn find_many(
        &self,
        ctx: &OpContext,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError>;

    /// Counts documents in `collection` matching `filter`.
    fn count(&self, ctx: &OpContext, collection: &str, filter: &Filter)
        -> Result<u64, StoreError>;

    /// Inserts `document`, generating an `_id` unless one is supplied.
    ///
    /// Fails with [`StoreError::DuplicateKey`] if a unique index rejects it.
    fn insert_one(
        &self,
        ctx: &OpContext,
        collection: &str,
        document: Document,
    ) -> Result<ObjectId, StoreError>;

    /// Sets the fields of `set` on the first document matching `filter`.
    ///
    /// The `_id` of a document cannot be changed; an `_id` key in `set` is
    /// rejected with [`StoreError::InvalidDocument`].
    fn update_one(
        &self,
        ctx: &OpContext,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Declares a unique index on `field` over documents matching `scope`.
    ///
    /// Idempotent for an identical declaration. Fails with
    /// [`StoreError::DuplicateKey`] if existing documents already collide.
    fn create_unique_index(
        &self,
        ctx: &OpContext,
        collection: &str,
        field: &str,
        scope: Filter,
    ) -> Result<(), StoreError>;
}
