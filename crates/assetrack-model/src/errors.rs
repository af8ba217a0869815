use assetrack_store::StoreError;
use serde_json::Value;
use thiserror::Error;

/// Errors raised by entity operations.
#[derive(Error, Debug)]
pub enum EntityError {
    /// A required attribute is absent at creation, or no identifier is
    /// available for an update or delete.
    #[error("attribute {0} is required, but not present")]
    MissingAttribute(String),
    /// A unique field collides with an existing record.
    #[error("{collection} with the same {field} is already in the database")]
    DuplicateItem {
        /// Collection of the entity.
        collection: String,
        /// Unique field that collided.
        field: String,
    },
    /// An event with the same timestamp was already received.
    #[error("event with event_timestamp {event_timestamp} is already in the database")]
    DuplicateEvent {
        /// Timestamp of the rejected event.
        event_timestamp: Value,
    },
    /// Lookup by identifier found no active record.
    #[error("object with {field} = {value} in collection {collection} not found")]
    NotFound {
        /// Collection searched.
        collection: String,
        /// Identifier field used for the lookup.
        field: String,
        /// Identifier value.
        value: Value,
    },
    /// Attribute access outside the schema's field enumeration.
    #[error("{field} is not a declared field of {collection}")]
    UndeclaredField {
        /// Collection of the entity.
        collection: String,
        /// Offending field name.
        field: String,
    },
    /// Creation attempted on an instance that already carries an identifier.
    #[error("unable to create {collection} record, _id attribute already set")]
    AlreadyCreated {
        /// Collection of the entity.
        collection: String,
    },
    /// Store gateway failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
