//! Request bodies for `documents:runQuery` and `documents:commit`.

use fixmate_query::{DocumentQuery, FieldRef, Filter, FilterValue, Write};
use serde_json::{Value, json};

use crate::config::FirestoreConfig;
use crate::value::{encode_fields, encode_value};

/// Field path Firestore uses for the document identifier.
pub const DOCUMENT_ID_PATH: &str = "__name__";

/// Quote one path segment if it is not a simple identifier.
pub fn quote_segment(segment: &str) -> String {
    let mut chars = segment.chars();
    let simple = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if simple {
        segment.to_string()
    } else {
        format!("`{}`", segment.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

/// Field path for a filter or sort key. Dots separate nested fields.
pub fn field_path(field: &FieldRef) -> String {
    match field {
        FieldRef::DocumentId => DOCUMENT_ID_PATH.to_string(),
        FieldRef::Field(name) => name
            .split('.')
            .map(quote_segment)
            .collect::<Vec<_>>()
            .join("."),
    }
}

fn reference(config: &FirestoreConfig, collection: &str, id: &str) -> Value {
    json!({"referenceValue": config.document_name(collection, id)})
}

/// Translate one filter. Returns `None` when the filter can never match,
/// e.g. an identifier filter whose values cannot name a document.
fn translate_filter(config: &FirestoreConfig, collection: &str, filter: &Filter) -> Option<Value> {
    let path = json!({"fieldPath": field_path(filter.field())});
    match filter {
        Filter::Equals(FieldRef::DocumentId, value) => {
            let id = value.as_document_id()?;
            Some(json!({"fieldFilter": {
                "field": path,
                "op": "EQUAL",
                "value": reference(config, collection, &id),
            }}))
        }
        Filter::Equals(_, FilterValue::Null) => Some(json!({"unaryFilter": {
            "field": path,
            "op": "IS_NULL",
        }})),
        Filter::Equals(_, value) => Some(json!({"fieldFilter": {
            "field": path,
            "op": "EQUAL",
            "value": encode_value(&value.to_json()),
        }})),
        Filter::In(field, values) => {
            let encoded: Vec<Value> = if field.is_document_id() {
                values
                    .iter()
                    .filter_map(FilterValue::as_document_id)
                    .map(|id| reference(config, collection, &id))
                    .collect()
            } else {
                values.iter().map(|v| encode_value(&v.to_json())).collect()
            };
            if encoded.is_empty() {
                return None;
            }
            Some(json!({"fieldFilter": {
                "field": path,
                "op": "IN",
                "value": {"arrayValue": {"values": encoded}},
            }}))
        }
    }
}

/// Build the `runQuery` body. Returns `None` when the query can match
/// nothing and need not be sent.
pub fn structured_query(config: &FirestoreConfig, query: &DocumentQuery) -> Option<Value> {
    let mut structured = json!({
        "from": [{"collectionId": query.collection}],
    });

    let mut filters = Vec::with_capacity(query.filters.len());
    for filter in &query.filters {
        filters.push(translate_filter(config, &query.collection, filter)?);
    }
    match filters.len() {
        0 => {}
        1 => structured["where"] = filters.remove(0),
        _ => {
            structured["where"] = json!({"compositeFilter": {
                "op": "AND",
                "filters": filters,
            }});
        }
    }

    if !query.order_by.is_empty() {
        structured["orderBy"] = query
            .order_by
            .iter()
            .map(|order| {
                json!({
                    "field": {"fieldPath": field_path(&order.field)},
                    "direction": if order.order.is_ascending() { "ASCENDING" } else { "DESCENDING" },
                })
            })
            .collect();
    }

    if let Some(limit) = query.limit {
        structured["limit"] = json!(limit.min(i32::MAX as u64));
    }

    Some(json!({"structuredQuery": structured}))
}

/// Build the `commit` body for a batch.
pub fn commit_body(config: &FirestoreConfig, writes: &[Write]) -> Value {
    let writes: Vec<Value> = writes.iter().map(|w| encode_write(config, w)).collect();
    json!({"writes": writes})
}

fn encode_write(config: &FirestoreConfig, write: &Write) -> Value {
    let name = config.document_name(write.collection(), write.id());
    match write {
        Write::Set { fields, .. } => json!({
            "update": {"name": name, "fields": encode_fields(fields)},
        }),
        Write::Update { fields, .. } => json!({
            "update": {"name": name, "fields": encode_fields(fields)},
            "updateMask": {"fieldPaths": mask(fields)},
            "currentDocument": {"exists": true},
        }),
        Write::Merge { fields, .. } => json!({
            "update": {"name": name, "fields": encode_fields(fields)},
            "updateMask": {"fieldPaths": mask(fields)},
        }),
        Write::Delete { .. } => json!({"delete": name}),
    }
}

// Keys are literal top-level fields, so each one is a single segment.
fn mask(fields: &fixmate_query::Record) -> Vec<String> {
    fields.keys().map(|key| quote_segment(key)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixmate_query::{OrderByField, Record};
    use pretty_assertions::assert_eq;

    fn config() -> FirestoreConfig {
        FirestoreConfig::builder()
            .project_id("p")
            .api_key("k")
            .build()
            .unwrap()
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_quote_segment() {
        assert_eq!(quote_segment("created_at"), "created_at");
        assert_eq!(quote_segment("full name"), "`full name`");
        assert_eq!(quote_segment("2fa"), "`2fa`");
        assert_eq!(quote_segment("a`b"), "`a\\`b`");
    }

    #[test]
    fn test_single_filter_query() {
        let query = DocumentQuery::new("complaints")
            .filter(Filter::equals("status", "Open"))
            .order_by(OrderByField::desc("created_at"))
            .limit(10);

        assert_eq!(
            structured_query(&config(), &query).unwrap(),
            json!({"structuredQuery": {
                "from": [{"collectionId": "complaints"}],
                "where": {"fieldFilter": {
                    "field": {"fieldPath": "status"},
                    "op": "EQUAL",
                    "value": {"stringValue": "Open"}
                }},
                "orderBy": [{
                    "field": {"fieldPath": "created_at"},
                    "direction": "DESCENDING"
                }],
                "limit": 10
            }})
        );
    }

    #[test]
    fn test_composite_and_id_filters() {
        let query = DocumentQuery::new("complaints")
            .filter(Filter::in_list("id", vec!["c1", "c2"]))
            .filter(Filter::equals("assigned_to", FilterValue::Null));

        let body = structured_query(&config(), &query).unwrap();
        let filters = &body["structuredQuery"]["where"]["compositeFilter"]["filters"];
        assert_eq!(
            filters[0],
            json!({"fieldFilter": {
                "field": {"fieldPath": "__name__"},
                "op": "IN",
                "value": {"arrayValue": {"values": [
                    {"referenceValue": "projects/p/databases/(default)/documents/complaints/c1"},
                    {"referenceValue": "projects/p/databases/(default)/documents/complaints/c2"}
                ]}}
            }})
        );
        assert_eq!(
            filters[1],
            json!({"unaryFilter": {"field": {"fieldPath": "assigned_to"}, "op": "IS_NULL"}})
        );
    }

    #[test]
    fn test_unmatchable_id_filter() {
        let query = DocumentQuery::new("complaints").filter(Filter::equals("id", true));
        assert!(structured_query(&config(), &query).is_none());

        for id in ["", "a/b"] {
            let query = DocumentQuery::new("complaints").filter(Filter::equals("id", id));
            assert!(structured_query(&config(), &query).is_none(), "id {:?}", id);
        }

        let query = DocumentQuery::new("complaints").filter(Filter::in_list("id", vec!["", "x"]));
        let body = structured_query(&config(), &query).unwrap();
        assert_eq!(
            body["structuredQuery"]["where"]["fieldFilter"]["value"],
            json!({"arrayValue": {"values": [
                {"referenceValue": "projects/p/databases/(default)/documents/complaints/x"}
            ]}})
        );
    }

    #[test]
    fn test_commit_body() {
        let writes = vec![
            Write::Set {
                collection: "complaints".to_string(),
                id: "c1".to_string(),
                fields: record(json!({"title": "Leak"})),
            },
            Write::Update {
                collection: "complaints".to_string(),
                id: "c2".to_string(),
                fields: record(json!({"status": "Closed"})),
            },
            Write::Merge {
                collection: "users".to_string(),
                id: "u1".to_string(),
                fields: record(json!({"full name": "Ann"})),
            },
            Write::Delete {
                collection: "complaints".to_string(),
                id: "c3".to_string(),
            },
        ];

        let body = commit_body(&config(), &writes);
        let root = "projects/p/databases/(default)/documents";
        assert_eq!(
            body["writes"][0],
            json!({"update": {
                "name": format!("{}/complaints/c1", root),
                "fields": {"title": {"stringValue": "Leak"}}
            }})
        );
        assert_eq!(body["writes"][1]["currentDocument"], json!({"exists": true}));
        assert_eq!(body["writes"][1]["updateMask"], json!({"fieldPaths": ["status"]}));
        assert_eq!(body["writes"][2]["updateMask"], json!({"fieldPaths": ["`full name`"]}));
        assert!(body["writes"][2].get("currentDocument").is_none());
        assert_eq!(body["writes"][3], json!({"delete": format!("{}/complaints/c3", root)}));
    }
}
