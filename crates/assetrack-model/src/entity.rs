//! Generic schema-bounded entity over a document store.

use crate::errors::EntityError;
use crate::schema::{active, EntitySchema, UniquenessScope, DELETED_FIELD};
use assetrack_store::{
    Document, DocumentStore, Filter, ObjectId, OpContext, Pattern, StoreError, ID_FIELD,
};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, info, warn};

/// An entity variant: binds a static [`EntitySchema`] to a type.
pub trait EntityKind {
    /// The variant's schema descriptor.
    fn schema() -> &'static EntitySchema;
}

/// A sparse attribute container bound to one schema and one store.
///
/// Attributes are restricted to the schema's field enumeration; everything
/// else is rejected with [`EntityError::UndeclaredField`]. Setting an
/// attribute to `null` unsets it.
pub struct Entity<'s, K: EntityKind, S: DocumentStore + ?Sized> {
    store: &'s S,
    ctx: OpContext,
    uniqueness: UniquenessScope,
    values: HashMap<&'static str, Value>,
    kind: PhantomData<K>,
}

impl<K: EntityKind, S: DocumentStore + ?Sized> fmt::Debug for Entity<'_, K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("collection", &K::schema().collection)
            .field("values", &self.to_pairs())
            .finish()
    }
}

fn pairs(schema: &EntitySchema, values: &HashMap<&'static str, Value>) -> Vec<(&'static str, Value)> {
    schema
        .field_enumeration()
        .filter_map(|field| {
            let value = values.get(field)?;
            let value = match (field, value) {
                (ID_FIELD, Value::String(_)) => value.clone(),
                (ID_FIELD, other) => Value::String(other.to_string()),
                _ => value.clone(),
            };
            Some((field, value))
        })
        .collect()
}

fn duplicate_item(collection: &str, err: StoreError) -> EntityError {
    match err {
        StoreError::DuplicateKey { field, .. } => EntityError::DuplicateItem {
            collection: collection.to_string(),
            field,
        },
        other => EntityError::Store(other),
    }
}

impl<'s, K: EntityKind, S: DocumentStore + ?Sized> Entity<'s, K, S> {
    /// Creates an empty instance.
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            ctx: OpContext::background(),
            uniqueness: UniquenessScope::default(),
            values: HashMap::new(),
            kind: PhantomData,
        }
    }

    /// Uses `ctx` for every store round trip made by this instance.
    pub fn with_context(mut self, ctx: OpContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// Selects which existing records uniqueness checks consider.
    pub fn with_uniqueness(mut self, scope: UniquenessScope) -> Self {
        self.uniqueness = scope;
        self
    }

    /// The variant's schema descriptor.
    pub fn schema(&self) -> &'static EntitySchema {
        K::schema()
    }

    pub(crate) fn store(&self) -> &'s S {
        self.store
    }

    pub(crate) fn ctx(&self) -> &OpContext {
        &self.ctx
    }

    fn declared(&self, field: &str) -> Result<&'static str, EntityError> {
        K::schema()
            .declared(field)
            .ok_or_else(|| EntityError::UndeclaredField {
                collection: K::schema().collection.to_string(),
                field: field.to_string(),
            })
    }

    /// Returns the attribute value, or `None` if it is unset.
    pub fn get(&self, field: &str) -> Result<Option<&Value>, EntityError> {
        let field = self.declared(field)?;
        Ok(self.values.get(field))
    }

    /// Assigns an attribute. `null` unsets it.
    ///
    /// The store identifier cannot be replaced once set.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<(), EntityError> {
        let field = self.declared(field)?;
        let value = value.into();
        if field == ID_FIELD && self.values.contains_key(ID_FIELD) {
            return Err(EntityError::AlreadyCreated {
                collection: K::schema().collection.to_string(),
            });
        }
        self.assign(field, value);
        Ok(())
    }

    fn assign(&mut self, field: &'static str, value: Value) {
        if value.is_null() {
            self.values.remove(field);
        } else {
            self.values.insert(field, value);
        }
    }

    /// True iff the attribute is declared and currently populated.
    pub fn has(&self, field: &str) -> bool {
        K::schema()
            .declared(field)
            .is_some_and(|f| self.values.contains_key(f))
    }

    /// Store-generated identifier, once created or loaded.
    pub fn id(&self) -> Option<ObjectId> {
        self.values
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .and_then(|s| ObjectId::parse(s).ok())
    }

    /// True if the instance carries the delete marker.
    pub fn is_deleted(&self) -> bool {
        self.values.get(DELETED_FIELD) == Some(&Value::Bool(true))
    }

    /// Populated attributes in declaration order.
    ///
    /// The store identifier is emitted in its string form.
    pub fn to_pairs(&self) -> Vec<(&'static str, Value)> {
        pairs(K::schema(), &self.values)
    }

    /// Populated attributes as a document.
    pub fn to_document(&self) -> Document {
        self.to_pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    /// Full-state field assignments for an update (everything but `_id`).
    pub fn to_update_document(&self) -> Document {
        self.to_pairs()
            .into_iter()
            .filter(|(k, _)| *k != ID_FIELD)
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    /// Loads declared attributes from a stored document; other keys are ignored.
    fn hydrate(&mut self, document: Document) {
        for (key, value) in document {
            if let Some(field) = K::schema().declared(&key) {
                self.assign(field, value);
            }
        }
    }

    /// Creates a record from a request payload.
    ///
    /// Non-null payload values for declared fields are layered over the
    /// instance's attributes (the delete marker is never taken from a
    /// payload), required fields are checked, unique fields are pre-checked
    /// against the store, and the document is inserted. The store's unique
    /// index remains the authoritative guard; a conflict it reports surfaces
    /// as [`EntityError::DuplicateItem`] too.
    ///
    /// The instance is only modified once the insert succeeds. An instance
    /// that already has an identifier, or a payload carrying one, is rejected
    /// with [`EntityError::AlreadyCreated`].
    pub fn create_from_request(&mut self, payload: &Document) -> Result<&mut Self, EntityError> {
        let schema = K::schema();
        let payload_id = payload.get(ID_FIELD).is_some_and(|id| !id.is_null());
        if self.values.contains_key(ID_FIELD) || payload_id {
            return Err(EntityError::AlreadyCreated {
                collection: schema.collection.to_string(),
            });
        }

        let mut staged = self.values.clone();
        for field in schema.field_enumeration() {
            if field == DELETED_FIELD || field == ID_FIELD {
                continue;
            }
            match payload.get(field) {
                Some(value) if !value.is_null() => {
                    staged.insert(field, value.clone());
                }
                _ => {}
            }
        }

        for field in schema.required_fields {
            if !staged.contains_key(field) {
                return Err(EntityError::MissingAttribute(field.to_string()));
            }
        }

        for field in schema.unique_fields {
            let Some(value) = staged.get(field) else {
                continue;
            };
            let Some(filter) = self.uniqueness.collision_filter(field, value) else {
                continue;
            };
            if self
                .store
                .find_one(&self.ctx, schema.collection, &filter)?
                .is_some()
            {
                return Err(EntityError::DuplicateItem {
                    collection: schema.collection.to_string(),
                    field: field.to_string(),
                });
            }
        }

        let document = pairs(schema, &staged)
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let id = self
            .store
            .insert_one(&self.ctx, schema.collection, document)
            .map_err(|e| duplicate_item(schema.collection, e))?;
        staged.insert(ID_FIELD, id.into());
        self.values = staged;
        info!(collection = schema.collection, %id, "created record");
        Ok(self)
    }

    /// Loads the active record whose business identifier equals `value`.
    pub fn lookup(mut self, value: impl Into<Value>) -> Result<Self, EntityError> {
        let schema = K::schema();
        let value = value.into();
        let filter = active(Filter::equals(schema.id_field, value.clone()));
        debug!(collection = schema.collection, field = schema.id_field, %value, "looking up record");
        match self.store.find_one(&self.ctx, schema.collection, &filter)? {
            Some(document) => {
                self.hydrate(document);
                Ok(self)
            }
            None => Err(EntityError::NotFound {
                collection: schema.collection.to_string(),
                field: schema.id_field.to_string(),
                value,
            }),
        }
    }

    /// Loads the first active record matching `filter`, if any.
    pub(crate) fn load_where(mut self, filter: Filter) -> Result<Option<Self>, EntityError> {
        let document = self
            .store
            .find_one(&self.ctx, K::schema().collection, &active(filter))?;
        Ok(document.map(|document| {
            self.hydrate(document);
            self
        }))
    }

    /// Query selecting the stored record this instance refers to.
    ///
    /// Prefers the store identifier; falls back to the active record with the
    /// same business identifier.
    fn target(&self) -> Result<Filter, EntityError> {
        let schema = K::schema();
        if let Some(id) = self.values.get(ID_FIELD) {
            return Ok(Filter::equals(ID_FIELD, id.clone()));
        }
        match self.values.get(schema.id_field) {
            Some(value) => Ok(active(Filter::equals(schema.id_field, value.clone()))),
            None => Err(EntityError::MissingAttribute(ID_FIELD.to_string())),
        }
    }

    fn not_found(&self) -> EntityError {
        let schema = K::schema();
        let (field, value) = match self.values.get(ID_FIELD) {
            Some(id) => (ID_FIELD, id.clone()),
            None => (
                schema.id_field,
                self.values.get(schema.id_field).cloned().unwrap_or(Value::Null),
            ),
        };
        EntityError::NotFound {
            collection: schema.collection.to_string(),
            field: field.to_string(),
            value,
        }
    }

    fn set_on_target(&self, set: Document) -> Result<(), EntityError> {
        let schema = K::schema();
        let filter = self.target()?;
        let outcome = self
            .store
            .update_one(&self.ctx, schema.collection, &filter, set)
            .map_err(|e| duplicate_item(schema.collection, e))?;
        if outcome.is_not_found() {
            return Err(self.not_found());
        }
        Ok(())
    }

    /// Persists the full in-memory state onto the stored record.
    pub fn update_in_db(&self) -> Result<(), EntityError> {
        self.set_on_target(self.to_update_document())?;
        debug!(collection = K::schema().collection, "updated record from instance");
        Ok(())
    }

    /// Applies a request payload to the stored record and to this instance.
    ///
    /// Only declared attributes are written; the identifier, the delete
    /// marker, and unknown keys are dropped.
    pub fn update_from_request(&mut self, payload: &Document) -> Result<(), EntityError> {
        let schema = K::schema();
        self.target()?;

        let mut set = Document::new();
        for (key, value) in payload {
            if schema.is_payload_field(key) {
                set.insert(key.clone(), value.clone());
            } else {
                warn!(collection = schema.collection, field = %key, "ignoring undeclared update field");
            }
        }

        self.set_on_target(set.clone())?;
        for (key, value) in set {
            if let Some(field) = schema.declared(&key) {
                self.assign(field, value);
            }
        }
        Ok(())
    }

    /// Soft-deletes the stored record. Deleting an already deleted record succeeds.
    pub fn delete(&mut self) -> Result<(), EntityError> {
        let schema = K::schema();
        let mut marker = Document::new();
        marker.insert(DELETED_FIELD.to_string(), Value::Bool(true));

        match self.set_on_target(marker) {
            Ok(()) => {}
            Err(EntityError::NotFound { .. }) if !self.values.contains_key(ID_FIELD) => {
                // The active lookup missed; a soft-deleted record with this id is fine.
                let value = self.values.get(schema.id_field).cloned().unwrap_or(Value::Null);
                let any = Filter::equals(schema.id_field, value);
                if self
                    .store
                    .find_one(&self.ctx, schema.collection, &any)?
                    .is_none()
                {
                    return Err(self.not_found());
                }
            }
            Err(e) => return Err(e),
        }

        self.values.insert(DELETED_FIELD, Value::Bool(true));
        info!(collection = schema.collection, "soft-deleted record");
        Ok(())
    }

    /// Declares the store-level unique index for every unique field, scoped
    /// like this instance's uniqueness checks.
    pub fn ensure_indexes(&self) -> Result<(), EntityError> {
        let schema = K::schema();
        for field in schema.unique_fields {
            self.store
                .create_unique_index(
                    &self.ctx,
                    schema.collection,
                    field,
                    self.uniqueness.scope_filter(),
                )
                .map_err(|e| duplicate_item(schema.collection, e))?;
        }
        Ok(())
    }

    /// Every active record.
    pub fn get_all(&self) -> Result<Vec<Document>, EntityError> {
        Ok(self
            .store
            .find_many(&self.ctx, K::schema().collection, &active(Filter::All))?)
    }

    /// Number of active records.
    pub fn count(&self) -> Result<u64, EntityError> {
        Ok(self
            .store
            .count(&self.ctx, K::schema().collection, &active(Filter::All))?)
    }

    /// Active records where any search field matches the regular expression.
    pub fn search(&self, pattern: &str) -> Result<Vec<Document>, EntityError> {
        self.search_with(Pattern::new(pattern)?)
    }

    /// Active records where any search field matches `pattern`.
    pub fn search_with(&self, pattern: Pattern) -> Result<Vec<Document>, EntityError> {
        let schema = K::schema();
        let any_field = Filter::Or(
            schema
                .search_fields
                .iter()
                .map(|field| Filter::regex(*field, pattern.clone()))
                .collect(),
        );
        Ok(self
            .store
            .find_many(&self.ctx, schema.collection, &active(any_field))?)
    }
}
