//! Static schema descriptors for entity variants.

use assetrack_store::{Filter, ID_FIELD};
use serde_json::Value;

/// Marker field set on soft-deleted records.
pub const DELETED_FIELD: &str = "__deleted";

/// Fields every entity carries in addition to its declared fields.
pub const DEFAULT_FIELDS: &[&str] = &[ID_FIELD, DELETED_FIELD];

/// Declaration of one entity variant's storage layout.
///
/// `required_fields`, `unique_fields`, and `search_fields` are subsets of
/// `fields`; `id_field` is the variant's business identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    /// Backing collection name.
    pub collection: &'static str,
    /// Declared attributes, in declaration order.
    pub fields: &'static [&'static str],
    /// Attributes that must be set at creation.
    pub required_fields: &'static [&'static str],
    /// Attributes whose values may not collide with another record.
    pub unique_fields: &'static [&'static str],
    /// Attributes matched by free-text search.
    pub search_fields: &'static [&'static str],
    /// Business identifier attribute.
    pub id_field: &'static str,
}

impl EntitySchema {
    /// Default fields followed by declared fields.
    pub fn field_enumeration(&self) -> impl Iterator<Item = &'static str> + '_ {
        DEFAULT_FIELDS.iter().copied().chain(self.fields.iter().copied())
    }

    /// Returns the canonical name of `field` if it is part of the enumeration.
    pub fn declared(&self, field: &str) -> Option<&'static str> {
        self.field_enumeration().find(|f| *f == field)
    }

    /// True if `field` is a declared (non-default) attribute.
    pub fn is_payload_field(&self, field: &str) -> bool {
        self.fields.contains(&field)
    }
}

/// Restricts `filter` to records without the delete marker.
///
/// Every read path builds its query through this function.
pub fn active(filter: Filter) -> Filter {
    match filter {
        Filter::All => Filter::missing(DELETED_FIELD),
        other => Filter::And(vec![Filter::missing(DELETED_FIELD), other]),
    }
}

/// Which existing records a uniqueness check considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UniquenessScope {
    /// Only records without the delete marker.
    #[default]
    Active,
    /// Only soft-deleted records.
    Deleted,
    /// Every record, deleted or not.
    Any,
}

impl UniquenessScope {
    /// Partial filter selecting the records in scope.
    pub fn scope_filter(self) -> Filter {
        match self {
            UniquenessScope::Active => Filter::missing(DELETED_FIELD),
            UniquenessScope::Deleted => Filter::equals(DELETED_FIELD, true),
            UniquenessScope::Any => Filter::All,
        }
    }

    /// Query for an in-scope record sharing `value` in `field`.
    ///
    /// Array values collide on any shared element. Returns `None` when the
    /// value cannot collide (null or an empty array).
    pub fn collision_filter(self, field: &str, value: &Value) -> Option<Filter> {
        let matcher = match value {
            Value::Null => return None,
            Value::Array(items) if items.is_empty() => return None,
            Value::Array(items) => Filter::any_of(field, items.clone()),
            scalar => Filter::equals(field, scalar.clone()),
        };
        Some(match self.scope_filter() {
            Filter::All => matcher,
            scope => Filter::And(vec![scope, matcher]),
        })
    }
}

impl std::str::FromStr for UniquenessScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UniquenessScope::Active),
            "deleted" => Ok(UniquenessScope::Deleted),
            "any" => Ok(UniquenessScope::Any),
            other => Err(format!(
                "unknown uniqueness scope '{}' (expected active, deleted, or any)",
                other
            )),
        }
    }
}
