//! Conversion between plain JSON and Firestore's typed value encoding.
//!
//! Firestore wraps every value in a single-key object naming its type:
//! `{"stringValue": "Open"}`, `{"integerValue": "3"}`, and so on. Integers
//! travel as decimal strings.

use fixmate_query::{Document, Record};
use serde_json::{Map, Number, Value};

use crate::error::{FirestoreError, FirestoreResult};

/// Encode a JSON value.
pub fn encode_value(value: &Value) -> Value {
    let (kind, inner) = match value {
        Value::Null => ("nullValue", Value::Null),
        Value::Bool(b) => ("booleanValue", Value::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => ("integerValue", Value::String(i.to_string())),
            None => (
                "doubleValue",
                n.as_f64().map(Value::from).unwrap_or(Value::Null),
            ),
        },
        Value::String(s) => ("stringValue", Value::String(s.clone())),
        Value::Array(items) => {
            let mut array = Map::new();
            if !items.is_empty() {
                array.insert(
                    "values".to_string(),
                    Value::Array(items.iter().map(encode_value).collect()),
                );
            }
            ("arrayValue", Value::Object(array))
        }
        Value::Object(fields) => {
            let mut map = Map::new();
            if !fields.is_empty() {
                map.insert("fields".to_string(), Value::Object(encode_fields(fields)));
            }
            ("mapValue", Value::Object(map))
        }
    };

    let mut wrapped = Map::with_capacity(1);
    wrapped.insert(kind.to_string(), inner);
    Value::Object(wrapped)
}

/// Encode every field of a record.
pub fn encode_fields(record: &Record) -> Map<String, Value> {
    record
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect()
}

/// Decode a typed value.
///
/// Timestamps, references and bytes come back as their string forms;
/// geo points as `{"latitude", "longitude"}` objects.
pub fn decode_value(value: &Value) -> FirestoreResult<Value> {
    let obj = value
        .as_object()
        .ok_or_else(|| FirestoreError::decode(format!("expected typed value, got {}", value)))?;
    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| FirestoreError::decode("empty typed value"))?;

    let decoded = match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => Value::Bool(inner.as_bool().unwrap_or_default()),
        "integerValue" => decode_integer(inner)?,
        "doubleValue" => decode_double(inner),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "geoPointValue" => {
            let mut point = Map::new();
            for key in ["latitude", "longitude"] {
                point.insert(
                    key.to_string(),
                    inner.get(key).cloned().unwrap_or_else(|| Value::from(0.0)),
                );
            }
            Value::Object(point)
        }
        "arrayValue" => {
            let items = match inner.get("values").and_then(Value::as_array) {
                Some(values) => values
                    .iter()
                    .map(decode_value)
                    .collect::<FirestoreResult<Vec<_>>>()?,
                None => Vec::new(),
            };
            Value::Array(items)
        }
        "mapValue" => match inner.get("fields").and_then(Value::as_object) {
            Some(fields) => Value::Object(decode_fields(fields)?),
            None => Value::Object(Map::new()),
        },
        other => {
            return Err(FirestoreError::decode(format!(
                "unknown value type '{}'",
                other
            )));
        }
    };
    Ok(decoded)
}

fn decode_integer(inner: &Value) -> FirestoreResult<Value> {
    match inner {
        Value::String(s) => s
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| FirestoreError::decode(format!("bad integerValue '{}': {}", s, e))),
        Value::Number(_) => Ok(inner.clone()),
        other => Err(FirestoreError::decode(format!(
            "bad integerValue {}",
            other
        ))),
    }
}

// NaN and the infinities arrive as strings and have no JSON form.
fn decode_double(inner: &Value) -> Value {
    match inner {
        Value::Number(n) => n
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Decode a `fields` map.
pub fn decode_fields(fields: &Map<String, Value>) -> FirestoreResult<Record> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}

/// Decode a document resource (`{"name", "fields", ...}`).
pub fn decode_document(resource: &Value) -> FirestoreResult<Document> {
    let name = resource
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| FirestoreError::decode("document without name"))?;
    let id = name
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| FirestoreError::decode(format!("bad document name '{}'", name)))?;

    let fields = match resource.get("fields").and_then(Value::as_object) {
        Some(fields) => decode_fields(fields)?,
        None => Record::new(),
    };
    Ok(Document::new(id, fields))
}

/// Pull the document resources out of a `runQuery` response.
///
/// The response is a list of results; entries without a `document` only
/// carry progress metadata such as `readTime`. An empty body means no
/// results.
pub fn query_results(response: Value) -> FirestoreResult<Vec<Value>> {
    let items = match response {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => return Err(FirestoreError::decode(format!("runQuery returned {}", other))),
    };
    Ok(items
        .into_iter()
        .filter_map(|mut item| item.get_mut("document").map(Value::take))
        .collect())
}
