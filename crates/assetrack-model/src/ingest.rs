//! Narrow event ingestion path used by sensor readers.

use crate::entity::Entity;
use crate::errors::EntityError;
use crate::lookup::item_by_tag;
use crate::schema::active;
use crate::variants::Event;
use assetrack_store::{Document, DocumentStore, Filter, OpContext, StoreError};
use serde_json::Value;
use tracing::{debug, info};

/// An event as reported by a sensor, before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    /// Reporting sensor.
    pub sensor_id: String,
    /// Observed tag.
    pub tag_id: String,
    /// Item carrying the tag, if known.
    pub item_id: Option<String>,
    /// Time of observation; unique across events.
    pub event_timestamp: Value,
    /// Free-form reading details.
    pub event_details: Value,
    /// Optional alert raised by the reading.
    pub alert: Option<Value>,
}

/// Current UTC time as fractional unix seconds.
fn now_seconds() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

impl<'s, S: DocumentStore + ?Sized> Entity<'s, Event, S> {
    /// Records a sensor event, stamping `received_timestamp` with the current time.
    ///
    /// Fails with [`EntityError::DuplicateEvent`] if an active event with the
    /// same `event_timestamp` exists, whether found by the pre-check or
    /// reported by the store's unique index.
    pub fn add_event(&mut self, event: NewEvent) -> Result<&mut Self, EntityError> {
        let collection = self.schema().collection;
        let duplicate = || EntityError::DuplicateEvent {
            event_timestamp: event.event_timestamp.clone(),
        };

        let existing = Filter::equals("event_timestamp", event.event_timestamp.clone());
        if self
            .store()
            .find_one(self.ctx(), collection, &active(existing))?
            .is_some()
        {
            return Err(duplicate());
        }

        let mut document = Document::new();
        document.insert("received_timestamp".to_string(), Value::from(now_seconds()));
        document.insert("event_timestamp".to_string(), event.event_timestamp.clone());
        document.insert("event_details".to_string(), event.event_details.clone());
        document.insert("sensor_id".to_string(), Value::from(event.sensor_id.clone()));
        document.insert("tag_id".to_string(), Value::from(event.tag_id.clone()));
        if let Some(item_id) = &event.item_id {
            document.insert("item_id".to_string(), Value::from(item_id.clone()));
        }
        if let Some(alert) = &event.alert {
            document.insert("alert".to_string(), alert.clone());
        }

        match self.create_from_request(&document) {
            Ok(_) => {}
            Err(EntityError::DuplicateItem { .. })
            | Err(EntityError::Store(StoreError::DuplicateKey { .. })) => return Err(duplicate()),
            Err(e) => return Err(e),
        }
        info!(
            sensor_id = %event.sensor_id,
            tag_id = %event.tag_id,
            event_timestamp = %event.event_timestamp,
            "recorded event"
        );
        Ok(self)
    }
}

/// A raw tag observation from a sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    /// Reporting sensor.
    pub sensor_id: String,
    /// Observed tag.
    pub tag_id: String,
    /// Time of observation.
    pub event_timestamp: Value,
    /// Free-form reading details.
    pub event_details: Value,
}

/// Records a reading as an event, attributing it to the active item that
/// carries the observed tag, if any.
pub fn ingest_reading<'s, S: DocumentStore + ?Sized>(
    store: &'s S,
    ctx: &OpContext,
    reading: SensorReading,
) -> Result<Entity<'s, Event, S>, EntityError> {
    let item = item_by_tag(store, ctx, &reading.tag_id)?;
    let item_id = item
        .as_ref()
        .and_then(|item| item.get("item_id").ok().flatten())
        .and_then(Value::as_str)
        .map(str::to_string);
    debug!(tag_id = %reading.tag_id, item_id = ?item_id, "resolved tag");

    let mut event = Entity::<Event, S>::new(store).with_context(ctx.clone());
    event.add_event(NewEvent {
        sensor_id: reading.sensor_id,
        tag_id: reading.tag_id,
        item_id,
        event_timestamp: reading.event_timestamp,
        event_details: reading.event_details,
        alert: None,
    })?;
    Ok(event)
}
