//! Shortcuts for the lookups the ingestion path and the CLI need most.

use crate::entity::Entity;
use crate::errors::EntityError;
use crate::variants::{Event, Item, Sensor};
use assetrack_store::{DocumentStore, Filter, OpContext};

/// The active sensor with the given `sensor_id`, if any.
pub fn sensor_by_id<'s, S: DocumentStore + ?Sized>(
    store: &'s S,
    ctx: &OpContext,
    sensor_id: &str,
) -> Result<Option<Entity<'s, Sensor, S>>, EntityError> {
    Entity::<Sensor, S>::new(store)
        .with_context(ctx.clone())
        .load_where(Filter::equals("sensor_id", sensor_id))
}

/// The active item carrying `tag_id` among its tags, if any.
pub fn item_by_tag<'s, S: DocumentStore + ?Sized>(
    store: &'s S,
    ctx: &OpContext,
    tag_id: &str,
) -> Result<Option<Entity<'s, Item, S>>, EntityError> {
    Entity::<Item, S>::new(store)
        .with_context(ctx.clone())
        .lookup_by_tag(tag_id)
}

/// Number of active events.
pub fn event_count<S: DocumentStore + ?Sized>(
    store: &S,
    ctx: &OpContext,
) -> Result<u64, EntityError> {
    Entity::<Event, S>::new(store)
        .with_context(ctx.clone())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetrack_store::MemoryStore;
    use serde_json::json;

    fn create_sensor<'s>(store: &'s MemoryStore, sensor_id: &str) -> Entity<'s, Sensor, MemoryStore> {
        let mut sensor = Entity::<Sensor, _>::new(store);
        sensor
            .create_from_request(
                json!({"name": "Gate", "sensor_id": sensor_id})
                    .as_object()
                    .unwrap(),
            )
            .unwrap();
        sensor
    }

    #[test]
    fn sensor_by_id_skips_deleted() {
        let store = MemoryStore::new();
        let ctx = OpContext::background();
        let mut sensor = create_sensor(&store, "s1");

        let found = sensor_by_id(&store, &ctx, "s1").unwrap().unwrap();
        assert_eq!(found.id(), sensor.id());

        sensor.delete().unwrap();
        assert!(sensor_by_id(&store, &ctx, "s1").unwrap().is_none());
        assert!(sensor_by_id(&store, &ctx, "s2").unwrap().is_none());
    }

    #[test]
    fn item_by_tag_matches_any_tag() {
        let store = MemoryStore::new();
        let ctx = OpContext::background();
        Entity::<Item, _>::new(&store)
            .create_from_request(
                json!({"name": "Box", "item_id": "I1", "tags": ["a", "b"]})
                    .as_object()
                    .unwrap(),
            )
            .unwrap();

        let item = item_by_tag(&store, &ctx, "b").unwrap().unwrap();
        assert_eq!(item.get("item_id").unwrap(), Some(&json!("I1")));
        assert!(item_by_tag(&store, &ctx, "c").unwrap().is_none());
    }

    #[test]
    fn event_count_starts_empty() {
        let store = MemoryStore::new();
        assert_eq!(event_count(&store, &OpContext::background()).unwrap(), 0);
    }
}
