//! Common types used in query building.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::document::Record;
use crate::error::{QueryError, QueryResult};
use crate::filter::FieldRef;

/// Sort order for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending order (A-Z, 0-9, oldest first).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0, newest first).
    Desc,
}

impl SortOrder {
    /// Build from an `ascending` flag.
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending { Self::Asc } else { Self::Desc }
    }

    /// Check if this is ascending.
    pub fn is_ascending(&self) -> bool {
        matches!(self, Self::Asc)
    }

    /// Reverse an ordering computed for ascending order.
    pub fn apply(&self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("asc"),
            Self::Desc => f.write_str("desc"),
        }
    }
}

/// Options accepted by `order()`, shaped like the `{ ascending }` argument
/// of a PostgREST client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOptions {
    /// Sort ascending (the default).
    #[serde(default = "default_ascending")]
    pub ascending: bool,
}

fn default_ascending() -> bool {
    true
}

impl Default for OrderOptions {
    fn default() -> Self {
        Self { ascending: true }
    }
}

impl From<OrderOptions> for SortOrder {
    fn from(options: OrderOptions) -> Self {
        SortOrder::from_ascending(options.ascending)
    }
}

/// Order by specification for a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByField {
    /// The field to order by.
    pub field: FieldRef,
    /// The sort order.
    pub order: SortOrder,
}

impl OrderByField {
    /// Create a new order by field.
    pub fn new(field: impl Into<String>, order: impl Into<SortOrder>) -> Self {
        Self {
            field: FieldRef::parse(field),
            order: order.into(),
        }
    }

    /// Create an ascending order.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    /// Create a descending order.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }
}

/// Insert or update payload: one record or a list of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// A single record.
    One(Record),
    /// Several records.
    Many(Vec<Record>),
}

impl Payload {
    /// Build a payload from an arbitrary JSON value.
    ///
    /// Objects become [`Payload::One`], arrays of objects [`Payload::Many`].
    pub fn from_value(value: Value) -> QueryResult<Self> {
        match value {
            Value::Object(record) => Ok(Self::One(record)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(record) => Ok(record),
                    other => Err(QueryError::invalid_payload(format!(
                        "expected an object in payload list, found {}",
                        other
                    ))),
                })
                .collect::<QueryResult<Vec<_>>>()
                .map(Self::Many),
            other => Err(QueryError::invalid_payload(format!(
                "expected an object or a list of objects, found {}",
                other
            ))),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(records) => records.len(),
        }
    }

    /// Check if the payload holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into a list of records.
    pub fn into_records(self) -> Vec<Record> {
        match self {
            Self::One(record) => vec![record],
            Self::Many(records) => records,
        }
    }
}

impl From<Record> for Payload {
    fn from(record: Record) -> Self {
        Self::One(record)
    }
}

impl From<Vec<Record>> for Payload {
    fn from(records: Vec<Record>) -> Self {
        Self::Many(records)
    }
}
