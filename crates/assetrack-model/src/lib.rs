//! Schema-driven entity model for Assetrack.
//!
//! Items, sensors, and events share one generic [`Entity`] implementation
//! parameterised by a static [`EntitySchema`]:
//! - attribute access bounded by the schema's field enumeration
//! - required-field validation and uniqueness checks on creation
//! - soft deletion: records are marked, never removed, and hidden from every read
//! - regex search across each variant's search fields
//! - the event-specific [`EventQuery`] filter and the [`NewEvent`] ingestion path
//!
//! ```rust
//! use assetrack_model::{Entity, Item};
//! use assetrack_store::MemoryStore;
//! use serde_json::json;
//!
//! let store = MemoryStore::new();
//! let payload = json!({"name": "Box", "item_id": "I1", "tags": ["t1"]});
//! let mut item = Entity::<Item, _>::new(&store);
//! item.create_from_request(payload.as_object().unwrap())?;
//! assert!(item.id().is_some());
//! assert_eq!(item.count()?, 1);
//! # Ok::<(), assetrack_model::EntityError>(())
//! ```

#![deny(missing_docs)]

/// Generic entity instance.
pub mod entity;
/// Error taxonomy for entity operations.
pub mod errors;
/// Event filter.
pub mod event_filter;
/// Sensor event ingestion.
pub mod ingest;
/// Common lookups.
pub mod lookup;
/// Schema descriptors and the soft-delete combinator.
pub mod schema;
/// Item, Sensor, and Event variants.
pub mod variants;

pub use entity::{Entity, EntityKind};
pub use errors::EntityError;
pub use event_filter::{EventQuery, Selector};
pub use ingest::{ingest_reading, NewEvent, SensorReading};
pub use lookup::{event_count, item_by_tag, sensor_by_id};
pub use schema::{active, EntitySchema, UniquenessScope, DEFAULT_FIELDS, DELETED_FIELD};
pub use variants::{Event, Item, Sensor};
