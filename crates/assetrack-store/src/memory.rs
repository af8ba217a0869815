//! In-memory document store.

use crate::context::OpContext;
use crate::document::{Document, ObjectId, ID_FIELD};
use crate::error::StoreError;
use crate::filter::{values_equal, Filter};
use crate::traits::{DocumentStore, UpdateOutcome};
use assetrack_journal::JournalRecord;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
struct UniqueIndex {
    field: String,
    scope: Filter,
}

impl UniqueIndex {
    /// Values the document contributes to the index; arrays contribute each element.
    fn keys<'a>(&self, document: &'a Document) -> Vec<&'a Value> {
        if !self.scope.matches(document) {
            return Vec::new();
        }
        match document.get(&self.field) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().collect(),
            Some(value) => vec![value],
        }
    }

    fn collides(&self, candidate: &Document, documents: &[Document], skip: Option<usize>) -> bool {
        let keys = self.keys(candidate);
        if keys.is_empty() {
            return false;
        }
        documents
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .any(|(_, other)| {
                self.keys(other)
                    .iter()
                    .any(|existing| keys.iter().any(|key| values_equal(existing, key)))
            })
    }
}

#[derive(Debug, Default)]
struct Collection {
    documents: Vec<Document>,
    indexes: Vec<UniqueIndex>,
}

impl Collection {
    fn violated_index(&self, candidate: &Document, skip: Option<usize>) -> Option<&UniqueIndex> {
        self.indexes
            .iter()
            .find(|index| index.collides(candidate, &self.documents, skip))
    }
}

fn duplicate(collection: &str, field: &str) -> StoreError {
    StoreError::DuplicateKey {
        collection: collection.to_string(),
        field: field.to_string(),
    }
}

/// Document store held entirely in memory.
///
/// Collections are created on first write. All mutations take a single write
/// lock, so unique-index checks and the writes they guard are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Collection>>, StoreError> {
        self.collections.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Collection>>, StoreError> {
        self.collections.write().map_err(|_| StoreError::LockPoisoned)
    }

    /// Inserts a document, calling `commit` with the final document after all
    /// checks pass and before it becomes visible. A failing `commit` aborts the insert.
    pub(crate) fn insert_with<F>(
        &self,
        ctx: &OpContext,
        collection: &str,
        mut document: Document,
        commit: F,
    ) -> Result<ObjectId, StoreError>
    where
        F: FnOnce(&Document) -> Result<(), StoreError>,
    {
        ctx.check()?;
        let id = match document.get(ID_FIELD) {
            None | Some(Value::Null) => ObjectId::new(),
            Some(Value::String(s)) => ObjectId::parse(s.as_str())?,
            Some(other) => {
                return Err(StoreError::InvalidDocument(format!(
                    "{} must be a string, got {}",
                    ID_FIELD, other
                )))
            }
        };
        document.insert(ID_FIELD.to_string(), id.into());

        let mut collections = self.write()?;
        let coll = collections.entry(collection.to_string()).or_default();
        if coll
            .documents
            .iter()
            .any(|d| d.get(ID_FIELD) == document.get(ID_FIELD))
        {
            return Err(duplicate(collection, ID_FIELD));
        }
        if let Some(index) = coll.violated_index(&document, None) {
            return Err(duplicate(collection, &index.field));
        }

        commit(&document)?;
        coll.documents.push(document);
        debug!(collection, %id, "inserted document");
        Ok(id)
    }

    /// Applies `set` to the first matching document, calling `commit` with the
    /// document's `_id` and `set` before the change becomes visible. Unchanged
    /// documents are not committed.
    pub(crate) fn update_with<F>(
        &self,
        ctx: &OpContext,
        collection: &str,
        filter: &Filter,
        set: Document,
        commit: F,
    ) -> Result<UpdateOutcome, StoreError>
    where
        F: FnOnce(&str, &Document) -> Result<(), StoreError>,
    {
        ctx.check()?;
        if set.contains_key(ID_FIELD) {
            return Err(StoreError::InvalidDocument(format!(
                "{} cannot be updated",
                ID_FIELD
            )));
        }

        let mut collections = self.write()?;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(UpdateOutcome::default());
        };
        let Some(pos) = coll.documents.iter().position(|d| filter.matches(d)) else {
            return Ok(UpdateOutcome::default());
        };

        let mut updated = coll.documents[pos].clone();
        for (key, value) in &set {
            updated.insert(key.clone(), value.clone());
        }
        if updated == coll.documents[pos] {
            return Ok(UpdateOutcome {
                matched: 1,
                modified: 0,
            });
        }
        if let Some(index) = coll.violated_index(&updated, Some(pos)) {
            return Err(duplicate(collection, &index.field));
        }

        let id = updated
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        commit(&id, &set)?;
        coll.documents[pos] = updated;
        debug!(collection, id = %id, fields = set.len(), "updated document");
        Ok(UpdateOutcome {
            matched: 1,
            modified: 1,
        })
    }

    /// Declares a unique index, calling `commit` before it takes effect.
    /// Returns without committing when an identical index already exists.
    pub(crate) fn create_index_with<F>(
        &self,
        ctx: &OpContext,
        collection: &str,
        field: &str,
        scope: Filter,
        commit: F,
    ) -> Result<(), StoreError>
    where
        F: FnOnce(&str, &Filter) -> Result<(), StoreError>,
    {
        ctx.check()?;
        let index = UniqueIndex {
            field: field.to_string(),
            scope,
        };

        let mut collections = self.write()?;
        let coll = collections.entry(collection.to_string()).or_default();
        if coll.indexes.contains(&index) {
            return Ok(());
        }
        let collision = coll
            .documents
            .iter()
            .enumerate()
            .any(|(i, document)| index.collides(document, &coll.documents, Some(i)));
        if collision {
            return Err(duplicate(collection, field));
        }

        commit(field, &index.scope)?;
        coll.indexes.push(index);
        debug!(collection, field, "created unique index");
        Ok(())
    }

    /// Re-applies a journaled mutation without re-running checks.
    pub(crate) fn replay(&self, record: JournalRecord) -> Result<(), StoreError> {
        let mut collections = self.write()?;
        match record {
            JournalRecord::Insert {
                collection,
                document,
            } => {
                collections
                    .entry(collection)
                    .or_default()
                    .documents
                    .push(document);
            }
            JournalRecord::Update {
                collection,
                id,
                set,
            } => {
                let target = collections.get_mut(&collection).and_then(|coll| {
                    coll.documents
                        .iter_mut()
                        .find(|d| d.get(ID_FIELD).and_then(Value::as_str) == Some(id.as_str()))
                });
                let Some(document) = target else {
                    return Err(StoreError::InvalidDocument(format!(
                        "journal updates unknown document {} in {}",
                        id, collection
                    )));
                };
                document.extend(set);
            }
            JournalRecord::Index {
                collection,
                field,
                scope,
            } => {
                let scope: Filter = serde_json::from_value(scope)?;
                let index = UniqueIndex { field, scope };
                let coll = collections.entry(collection).or_default();
                if !coll.indexes.contains(&index) {
                    coll.indexes.push(index);
                }
            }
        }
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    fn find_one(
        &self,
        ctx: &OpContext,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        ctx.check()?;
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .and_then(|coll| coll.documents.iter().find(|d| filter.matches(d)))
            .cloned())
    }

    fn find_many(
        &self,
        ctx: &OpContext,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        ctx.check()?;
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .map(|coll| {
                coll.documents
                    .iter()
                    .filter(|d| filter.matches(d))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn count(
        &self,
        ctx: &OpContext,
        collection: &str,
        filter: &Filter,
    ) -> Result<u64, StoreError> {
        ctx.check()?;
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .map(|coll| coll.documents.iter().filter(|d| filter.matches(d)).count() as u64)
            .unwrap_or(0))
    }

    fn insert_one(
        &self,
        ctx: &OpContext,
        collection: &str,
        document: Document,
    ) -> Result<ObjectId, StoreError> {
        self.insert_with(ctx, collection, document, |_| Ok(()))
    }

    fn update_one(
        &self,
        ctx: &OpContext,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        self.update_with(ctx, collection, filter, set, |_, _| Ok(()))
    }

    fn create_unique_index(
        &self,
        ctx: &OpContext,
        collection: &str,
        field: &str,
        scope: Filter,
    ) -> Result<(), StoreError> {
        self.create_index_with(ctx, collection, field, scope, |_, _| Ok(()))
    }
}
