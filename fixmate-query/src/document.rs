//! Records and stored documents.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::filter::ID_FIELD;

/// An untyped record as callers see it.
pub type Record = Map<String, Value>;

/// Field stamped on inserted records and new profiles.
pub const CREATED_AT_FIELD: &str = "created_at";

/// A document as held by a store: the identifier is kept apart from the
/// stored fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier.
    pub id: String,
    /// Stored fields.
    pub fields: Record,
}

impl Document {
    /// Create a document.
    pub fn new(id: impl Into<String>, fields: Record) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Look up a stored field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Convert into a caller-facing record; the identifier overrides any
    /// stored `id` field.
    pub fn into_record(self) -> Record {
        let mut record = self.fields;
        record.insert(ID_FIELD.to_string(), Value::String(self.id));
        record
    }
}

/// Current UTC time as an ISO-8601 string with millisecond precision,
/// e.g. `2024-03-01T09:30:00.000Z`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Overlay `updates` onto `base` field by field.
pub fn merge_fields(base: &mut Record, updates: &Record) {
    for (key, value) in updates {
        base.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_record_adds_id() {
        let fields = json!({"title": "Leak", "id": "stale"});
        let doc = Document::new("abc", fields.as_object().cloned().unwrap());
        let record = doc.into_record();
        assert_eq!(record.get("id"), Some(&json!("abc")));
        assert_eq!(record.get("title"), Some(&json!("Leak")));
    }

    #[test]
    fn test_timestamp_format() {
        let ts = timestamp_now();
        assert!(ts.ends_with('Z'));
        // 2024-03-01T09:30:00.000Z
        assert_eq!(ts.len(), 24);
        assert_eq!(&ts[19..20], ".");
    }

    #[test]
    fn test_merge_fields_overlays() {
        let mut base = json!({"a": 1, "b": 2}).as_object().cloned().unwrap();
        let updates = json!({"b": 3, "c": 4}).as_object().cloned().unwrap();
        merge_fields(&mut base, &updates);
        assert_eq!(Value::Object(base), json!({"a": 1, "b": 3, "c": 4}));
    }
}
