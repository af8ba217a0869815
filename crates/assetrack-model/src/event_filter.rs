//! Multi-predicate event queries.

use crate::entity::Entity;
use crate::errors::EntityError;
use crate::schema::active;
use crate::variants::Event;
use assetrack_store::{Document, DocumentStore, Filter};
use serde_json::Value;

/// Matches a field against one value or any of several.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Field equals the value.
    One(Value),
    /// Field equals any of the values.
    Any(Vec<Value>),
}

impl Selector {
    /// True for `One(null)`, the JSON spelling of "no selector".
    pub fn is_absent(&self) -> bool {
        matches!(self, Selector::One(Value::Null))
    }

    fn to_filter(&self, field: &str) -> Option<Filter> {
        match self {
            _ if self.is_absent() => None,
            Selector::One(value) => Some(Filter::equals(field, value.clone())),
            Selector::Any(values) => Some(Filter::any_of(field, values.clone())),
        }
    }

    fn present(self) -> Option<Self> {
        (!self.is_absent()).then_some(self)
    }
}

impl From<Value> for Selector {
    /// JSON arrays select by membership, anything else by equality; `null`
    /// converts to an absent selector that adds no predicate.
    fn from(value: Value) -> Self {
        match value {
            Value::Array(values) => Selector::Any(values),
            other => Selector::One(other),
        }
    }
}

impl From<&str> for Selector {
    fn from(value: &str) -> Self {
        Selector::One(Value::from(value))
    }
}

impl From<Vec<&str>> for Selector {
    fn from(values: Vec<&str>) -> Self {
        Selector::Any(values.into_iter().map(Value::from).collect())
    }
}

impl From<Vec<String>> for Selector {
    fn from(values: Vec<String>) -> Self {
        Selector::Any(values.into_iter().map(Value::from).collect())
    }
}

/// Event query: optional sensor, item, and inclusive time-range predicates,
/// combined with AND.
///
/// The time range applies only when both bounds are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventQuery {
    /// Sensor predicate over `sensor_id`.
    pub sensor_id: Option<Selector>,
    /// Item predicate over `item_id`.
    pub item_id: Option<Selector>,
    /// Inclusive lower bound on `event_timestamp`.
    pub start_timestamp: Option<Value>,
    /// Inclusive upper bound on `event_timestamp`.
    pub end_timestamp: Option<Value>,
}

impl EventQuery {
    /// A query matching every active event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to the given sensor(s).
    pub fn sensor(mut self, selector: impl Into<Selector>) -> Self {
        self.sensor_id = selector.into().present();
        self
    }

    /// Restricts to the given item(s).
    pub fn item(mut self, selector: impl Into<Selector>) -> Self {
        self.item_id = selector.into().present();
        self
    }

    /// Restricts to `event_timestamp` within `[start, end]`.
    pub fn between(mut self, start: impl Into<Value>, end: impl Into<Value>) -> Self {
        self.start_timestamp = Some(start.into());
        self.end_timestamp = Some(end.into());
        self
    }

    /// Builds the store query: active events satisfying every supplied predicate.
    pub fn to_filter(&self) -> Filter {
        let mut predicates = Vec::new();
        let selected = [("sensor_id", &self.sensor_id), ("item_id", &self.item_id)];
        for (field, selector) in selected {
            if let Some(filter) = selector.as_ref().and_then(|s| s.to_filter(field)) {
                predicates.push(filter);
            }
        }
        if let (Some(start), Some(end)) = (&self.start_timestamp, &self.end_timestamp) {
            predicates.push(Filter::between("event_timestamp", start.clone(), end.clone()));
        }
        active(Filter::And(predicates))
    }
}

impl<'s, S: DocumentStore + ?Sized> Entity<'s, Event, S> {
    /// Active events matching `query`.
    pub fn filter(&self, query: &EventQuery) -> Result<Vec<Document>, EntityError> {
        Ok(self
            .store()
            .find_many(self.ctx(), self.schema().collection, &query.to_filter())?)
    }
}
