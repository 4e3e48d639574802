//! Filter types for scoping reads, updates and deletes.
//!
//! Filters are conjunctive: every filter chained on a builder must hold for
//! a document to match. The field name `id` never refers to a stored field;
//! it targets the document identifier ([`FieldRef::DocumentId`]).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Field name that addresses the document identifier.
pub const ID_FIELD: &str = "id";

/// A filter value that can be used in comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
    /// List of values.
    List(Vec<FilterValue>),
    /// Any other JSON value (objects).
    Json(Value),
}

impl FilterValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert into a JSON value for comparison against stored fields.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::String(s) => Value::String(s.clone()),
            Self::List(values) => Value::Array(values.iter().map(Self::to_json).collect()),
            Self::Json(v) => v.clone(),
        }
    }

    /// Interpret this value as a document identifier.
    ///
    /// Identifiers are strings; integers are accepted and rendered in
    /// decimal. Anything else cannot name a document, and neither can an
    /// empty string or one containing a path separator.
    pub fn as_document_id(&self) -> Option<String> {
        match self {
            Self::String(s) if s.is_empty() || s.contains('/') => None,
            Self::String(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            _ => None,
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<&String> for FilterValue {
    fn from(v: &String) -> Self {
        Self::String(v.clone())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

impl From<Value> for FilterValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            other @ Value::Object(_) => Self::Json(other),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// The target of a filter or sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldRef {
    /// The document identifier.
    DocumentId,
    /// A stored field.
    Field(String),
}

impl FieldRef {
    /// Resolve a caller-facing column name.
    pub fn parse(name: impl Into<String>) -> Self {
        let name = name.into();
        if name == ID_FIELD {
            Self::DocumentId
        } else {
            Self::Field(name)
        }
    }

    /// The column name as callers wrote it.
    pub fn name(&self) -> &str {
        match self {
            Self::DocumentId => ID_FIELD,
            Self::Field(name) => name,
        }
    }

    /// Check if this targets the document identifier.
    pub fn is_document_id(&self) -> bool {
        matches!(self, Self::DocumentId)
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals the value.
    Equals(FieldRef, FilterValue),
    /// Field equals one of the values. Never empty once built.
    In(FieldRef, Vec<FilterValue>),
}

impl Filter {
    /// Create an equality filter.
    pub fn equals(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Equals(FieldRef::parse(field), value.into())
    }

    /// Create a membership filter.
    pub fn in_list<T: Into<FilterValue>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Self::In(
            FieldRef::parse(field),
            values.into_iter().map(Into::into).collect(),
        )
    }

    /// The filtered field.
    pub fn field(&self) -> &FieldRef {
        match self {
            Self::Equals(field, _) | Self::In(field, _) => field,
        }
    }
}

/// What an empty `in_()` list means.
///
/// Either way the empty list never reaches the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyInPolicy {
    /// The request matches no documents.
    #[default]
    MatchNothing,
    /// The predicate is dropped and the remaining filters apply.
    NoFilter,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_targets_document_identity() {
        assert_eq!(FieldRef::parse("id"), FieldRef::DocumentId);
        assert_eq!(
            FieldRef::parse("status"),
            FieldRef::Field("status".to_string())
        );
        assert_eq!(FieldRef::DocumentId.name(), "id");
    }

    #[test]
    fn test_unusable_document_ids() {
        assert_eq!(FilterValue::from("c-42").as_document_id(), Some("c-42".to_string()));
        assert_eq!(FilterValue::Int(7).as_document_id(), Some("7".to_string()));
        assert_eq!(FilterValue::from("").as_document_id(), None);
        assert_eq!(FilterValue::from("a/b").as_document_id(), None);
        assert_eq!(FilterValue::from(true).as_document_id(), None);

        match Filter::equals("id", "") {
            Filter::Equals(FieldRef::DocumentId, value) => assert_eq!(value.as_document_id(), None),
            other => panic!("unexpected filter: {:?}", other),
        }
    }

    #[test]
    fn test_filter_value_from_json() {
        assert_eq!(FilterValue::from(json!(3)), FilterValue::Int(3));
        assert_eq!(FilterValue::from(json!(1.5)), FilterValue::Float(1.5));
        assert_eq!(FilterValue::from(json!("Lab")), FilterValue::from("Lab"));
        assert_eq!(
            FilterValue::from(json!([1, "a"])),
            FilterValue::List(vec![FilterValue::Int(1), FilterValue::from("a")])
        );
    }

    #[test]
    fn test_filter_value_to_json() {
        assert_eq!(FilterValue::from(true).to_json(), json!(true));
        assert_eq!(FilterValue::from(Option::<i64>::None).to_json(), json!(null));
        assert_eq!(FilterValue::Float(f64::NAN).to_json(), json!(null));
    }

    #[test]
    fn test_document_id_value() {
        assert_eq!(FilterValue::from("abc").as_document_id(), Some("abc".into()));
        assert_eq!(FilterValue::from(42).as_document_id(), Some("42".into()));
        assert_eq!(FilterValue::from(true).as_document_id(), None);
    }

    #[test]
    fn test_in_list_filter() {
        let filter = Filter::in_list("id", ["a", "b"]);
        assert!(filter.field().is_document_id());
        match filter {
            Filter::In(_, values) => assert_eq!(values.len(), 2),
            _ => panic!("expected In filter"),
        }
    }

    #[test]
    fn test_empty_in_policy_default() {
        assert_eq!(EmptyInPolicy::default(), EmptyInPolicy::MatchNothing);
    }
}
