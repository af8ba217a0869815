//! Query predicates evaluated against stored documents.

use crate::document::Document;
use crate::error::StoreError;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::cmp::Ordering;

/// Compiled regular expression usable inside a [`Filter`].
///
/// Serializes as its source pattern so filters (e.g. unique index scopes) can
/// be written to the journal.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compiles `pattern` as a regular expression.
    pub fn new(pattern: &str) -> Result<Self, StoreError> {
        Ok(Self(Regex::new(pattern)?))
    }

    /// Compiles a pattern matching `text` as a plain substring.
    pub fn literal(text: &str) -> Result<Self, StoreError> {
        Self::new(&regex::escape(text))
    }

    /// Source text of the pattern.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn is_match(&self, haystack: &str) -> bool {
        self.0.is_match(haystack)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Regex::new(&source)
            .map(Pattern)
            .map_err(serde::de::Error::custom)
    }
}

/// Predicate over documents.
///
/// Matching follows document-store conventions: an equality test against an
/// array field matches when any element is equal, ranges only compare values
/// of the same kind, and an absent field never satisfies a value predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// Matches every document.
    All,
    /// Field equals the value (or, for arrays, contains it).
    Eq {
        /// Field name.
        field: String,
        /// Expected value.
        value: Value,
    },
    /// Field equals any of the values.
    In {
        /// Field name.
        field: String,
        /// Candidate values.
        values: Vec<Value>,
    },
    /// Field lies within the inclusive bounds; missing bounds are open.
    Range {
        /// Field name.
        field: String,
        /// Inclusive lower bound.
        gte: Option<Value>,
        /// Inclusive upper bound.
        lte: Option<Value>,
    },
    /// Field is a string (or array with a string element) matching the pattern.
    Regex {
        /// Field name.
        field: String,
        /// Pattern to search for.
        pattern: Pattern,
    },
    /// Field presence test; `null` counts as present.
    Exists {
        /// Field name.
        field: String,
        /// Whether the field must be present.
        exists: bool,
    },
    /// Every inner filter matches. Empty matches everything.
    And(Vec<Filter>),
    /// Some inner filter matches. Empty matches nothing.
    Or(Vec<Filter>),
}

impl Filter {
    /// Equality predicate.
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Set-membership predicate.
    pub fn any_of(field: impl Into<String>, values: Vec<Value>) -> Self {
        Filter::In {
            field: field.into(),
            values,
        }
    }

    /// Inclusive range predicate with both bounds.
    pub fn between(field: impl Into<String>, gte: impl Into<Value>, lte: impl Into<Value>) -> Self {
        Filter::Range {
            field: field.into(),
            gte: Some(gte.into()),
            lte: Some(lte.into()),
        }
    }

    /// Pattern predicate.
    pub fn regex(field: impl Into<String>, pattern: Pattern) -> Self {
        Filter::Regex {
            field: field.into(),
            pattern,
        }
    }

    /// Field must be present.
    pub fn exists(field: impl Into<String>) -> Self {
        Filter::Exists {
            field: field.into(),
            exists: true,
        }
    }

    /// Field must be absent.
    pub fn missing(field: impl Into<String>) -> Self {
        Filter::Exists {
            field: field.into(),
            exists: false,
        }
    }

    /// Returns true if the document satisfies this predicate.
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => document
                .get(field)
                .is_some_and(|stored| contains_equal(stored, value)),
            Filter::In { field, values } => document
                .get(field)
                .is_some_and(|stored| values.iter().any(|v| contains_equal(stored, v))),
            Filter::Range { field, gte, lte } => {
                let Some(stored) = document.get(field) else {
                    return false;
                };
                let above = gte.as_ref().map_or(true, |low| {
                    matches!(compare(stored, low), Some(Ordering::Greater | Ordering::Equal))
                });
                let below = lte.as_ref().map_or(true, |high| {
                    matches!(compare(stored, high), Some(Ordering::Less | Ordering::Equal))
                });
                above && below
            }
            Filter::Regex { field, pattern } => match document.get(field) {
                Some(Value::String(s)) => pattern.is_match(s),
                Some(Value::Array(items)) => items
                    .iter()
                    .any(|item| item.as_str().is_some_and(|s| pattern.is_match(s))),
                _ => false,
            },
            Filter::Exists { field, exists } => document.contains_key(field) == *exists,
            Filter::And(filters) => filters.iter().all(|f| f.matches(document)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(document)),
        }
    }
}

/// Equality with numbers compared by value (`100` equals `100.0`).
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

fn contains_equal(stored: &Value, expected: &Value) -> bool {
    if values_equal(stored, expected) {
        return true;
    }
    match stored {
        Value::Array(items) => items.iter().any(|item| values_equal(item, expected)),
        _ => false,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn eq_matches_scalars_and_array_elements() {
        let d = doc(json!({"sensor_id": "s1", "tags": ["t1", "t2"], "n": 100}));
        assert!(Filter::equals("sensor_id", "s1").matches(&d));
        assert!(!Filter::equals("sensor_id", "s2").matches(&d));
        assert!(Filter::equals("tags", "t2").matches(&d));
        assert!(Filter::equals("tags", json!(["t1", "t2"])).matches(&d));
        assert!(Filter::equals("n", 100.0).matches(&d));
        assert!(!Filter::equals("absent", Value::Null).matches(&d));
    }

    #[test]
    fn in_matches_any_candidate() {
        let d = doc(json!({"sensor_id": "s2"}));
        assert!(Filter::any_of("sensor_id", vec![json!("s1"), json!("s2")]).matches(&d));
        assert!(!Filter::any_of("sensor_id", vec![]).matches(&d));
    }

    #[test]
    fn range_is_inclusive_and_kind_strict() {
        let f = Filter::between("event_timestamp", 100, 200);
        assert!(f.matches(&doc(json!({"event_timestamp": 100}))));
        assert!(f.matches(&doc(json!({"event_timestamp": 200.0}))));
        assert!(!f.matches(&doc(json!({"event_timestamp": 200.5}))));
        assert!(!f.matches(&doc(json!({"event_timestamp": "150"}))));
        assert!(!f.matches(&doc(json!({}))));

        let open = Filter::Range {
            field: "event_timestamp".to_string(),
            gte: None,
            lte: Some(json!(10)),
        };
        assert!(open.matches(&doc(json!({"event_timestamp": -5}))));
    }

    #[test]
    fn regex_searches_strings_and_string_arrays() {
        let pattern = Pattern::new("^Bo").unwrap();
        assert!(Filter::regex("name", pattern.clone()).matches(&doc(json!({"name": "Box"}))));
        assert!(!Filter::regex("name", pattern.clone()).matches(&doc(json!({"name": 7}))));
        assert!(Filter::regex("tags", pattern).matches(&doc(json!({"tags": ["x", "Bolt"]}))));
    }

    #[test]
    fn literal_pattern_escapes_metacharacters() {
        let pattern = Pattern::literal("a.b").unwrap();
        assert!(Filter::regex("name", pattern.clone()).matches(&doc(json!({"name": "xa.by"}))));
        assert!(!Filter::regex("name", pattern).matches(&doc(json!({"name": "axb"}))));
    }

    #[test]
    fn exists_treats_null_as_present() {
        let d = doc(json!({"__deleted": null}));
        assert!(Filter::exists("__deleted").matches(&d));
        assert!(!Filter::missing("__deleted").matches(&d));
        assert!(Filter::missing("__deleted").matches(&doc(json!({}))));
    }

    #[test]
    fn empty_combinators() {
        let d = doc(json!({}));
        assert!(Filter::And(vec![]).matches(&d));
        assert!(!Filter::Or(vec![]).matches(&d));
    }

    #[test]
    fn filters_survive_serialization() {
        let filter = Filter::And(vec![
            Filter::missing("__deleted"),
            Filter::regex("name", Pattern::new("B.x").unwrap()),
        ]);
        let value = serde_json::to_value(&filter).unwrap();
        let back: Filter = serde_json::from_value(value).unwrap();
        assert_eq!(back, filter);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(matches!(Pattern::new("("), Err(StoreError::InvalidPattern(_))));
    }
}
