//! Concrete entity variants.

use crate::entity::{Entity, EntityKind};
use crate::errors::EntityError;
use crate::schema::EntitySchema;
use assetrack_store::{DocumentStore, Filter};

/// A tracked asset, identified by `item_id` and carrying RFID `tags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item;

/// A reader that observes tags, identified by `sensor_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sensor;

/// One observation of a tag by a sensor, identified by `event_timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event;

static ITEM_SCHEMA: EntitySchema = EntitySchema {
    collection: "item",
    fields: &[
        "description",
        "name",
        "tags",
        "default_storage_location",
        "location_blacklist",
        "location_whitelist",
        "item_id",
    ],
    required_fields: &["name", "item_id", "tags"],
    unique_fields: &["item_id", "tags"],
    search_fields: &["name", "item_id", "description", "tags"],
    id_field: "item_id",
};

static SENSOR_SCHEMA: EntitySchema = EntitySchema {
    collection: "sensor",
    fields: &["description", "name", "sensor_id", "tag", "types"],
    required_fields: &["name", "sensor_id"],
    unique_fields: &["sensor_id"],
    search_fields: &["name", "sensor_id", "description", "tag"],
    id_field: "sensor_id",
};

static EVENT_SCHEMA: EntitySchema = EntitySchema {
    collection: "event",
    fields: &[
        "received_timestamp",
        "event_timestamp",
        "event_details",
        "sensor_id",
        "item_id",
        "tag_id",
        "alert",
    ],
    required_fields: &[
        "received_timestamp",
        "event_timestamp",
        "event_details",
        "sensor_id",
        "tag_id",
    ],
    unique_fields: &["event_timestamp"],
    search_fields: &["event_details", "sensor_id", "item_id", "tag_id"],
    id_field: "event_timestamp",
};

impl EntityKind for Item {
    fn schema() -> &'static EntitySchema {
        &ITEM_SCHEMA
    }
}

impl EntityKind for Sensor {
    fn schema() -> &'static EntitySchema {
        &SENSOR_SCHEMA
    }
}

impl EntityKind for Event {
    fn schema() -> &'static EntitySchema {
        &EVENT_SCHEMA
    }
}

impl<'s, S: DocumentStore + ?Sized> Entity<'s, Item, S> {
    /// Loads the active item carrying `tag_id` among its tags, if any.
    pub fn lookup_by_tag(self, tag_id: &str) -> Result<Option<Self>, EntityError> {
        self.load_where(Filter::equals("tags", tag_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_subsets(schema: &EntitySchema) {
        for field in schema
            .required_fields
            .iter()
            .chain(schema.unique_fields)
            .chain(schema.search_fields)
            .chain(std::iter::once(&schema.id_field))
        {
            assert!(
                schema.fields.contains(field),
                "{} is not declared on {}",
                field,
                schema.collection
            );
        }
    }

    #[test]
    fn variant_field_sets_are_consistent() {
        assert_subsets(Item::schema());
        assert_subsets(Sensor::schema());
        assert_subsets(Event::schema());
    }

    #[test]
    fn variant_identifiers() {
        assert_eq!(Item::schema().id_field, "item_id");
        assert_eq!(Sensor::schema().unique_fields, &["sensor_id"]);
        assert_eq!(Event::schema().collection, "event");
    }
}
