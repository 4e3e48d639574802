//! Query evaluation with Firestore semantics.
//!
//! Values of different types order by type rank: null, booleans, numbers,
//! strings, arrays, maps. Integers and doubles compare numerically, so `1`
//! equals `1.0`. A document lacking a filtered or ordered field never
//! matches. Results are ordered by document id unless sort keys say
//! otherwise, and the id breaks ties.

use std::cmp::Ordering;

use fixmate_query::{
    Document, DocumentQuery, FieldRef, Filter, FilterValue, OrderByField, SortOrder,
};
use serde_json::{Number, Value};

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a.cmp(&b);
    }
    let a = a.as_f64().unwrap_or(f64::NAN);
    let b = b.as_f64().unwrap_or(f64::NAN);
    // NaN sorts before every other number.
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Total order over stored values.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                let ord = compare_values(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            a.len().cmp(&b.len())
        }
        (Value::Object(a), Value::Object(b)) => {
            let mut a: Vec<_> = a.iter().collect();
            let mut b: Vec<_> = b.iter().collect();
            a.sort_by(|x, y| x.0.cmp(y.0));
            b.sort_by(|x, y| x.0.cmp(y.0));
            for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
                let ord = ka.cmp(kb).then_with(|| compare_values(va, vb));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            a.len().cmp(&b.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Equality as a query filter sees it.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    compare_values(a, b) == Ordering::Equal
}

fn id_matches(doc: &Document, value: &FilterValue) -> bool {
    value.as_document_id().is_some_and(|id| id == doc.id)
}

fn field_matches(doc: &Document, field: &str, value: &FilterValue) -> bool {
    doc.get(field)
        .is_some_and(|stored| values_equal(stored, &value.to_json()))
}

/// Check a single filter against a document.
pub fn matches(doc: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::Equals(FieldRef::DocumentId, value) => id_matches(doc, value),
        Filter::Equals(FieldRef::Field(field), value) => field_matches(doc, field, value),
        Filter::In(FieldRef::DocumentId, values) => values.iter().any(|v| id_matches(doc, v)),
        Filter::In(FieldRef::Field(field), values) => {
            values.iter().any(|v| field_matches(doc, field, v))
        }
    }
}

fn has_sort_field(doc: &Document, order: &OrderByField) -> bool {
    match &order.field {
        FieldRef::DocumentId => true,
        FieldRef::Field(field) => doc.fields.contains_key(field),
    }
}

fn compare_by(a: &Document, b: &Document, order: &OrderByField) -> Ordering {
    let ord = match &order.field {
        FieldRef::DocumentId => a.id.cmp(&b.id),
        FieldRef::Field(field) => match (a.get(field), b.get(field)) {
            (Some(x), Some(y)) => compare_values(x, y),
            _ => Ordering::Equal,
        },
    };
    order.order.apply(ord)
}

/// Run a query over documents in id order.
pub fn evaluate(docs: impl IntoIterator<Item = Document>, query: &DocumentQuery) -> Vec<Document> {
    let mut result: Vec<Document> = docs
        .into_iter()
        .filter(|doc| query.filters.iter().all(|f| matches(doc, f)))
        .filter(|doc| query.order_by.iter().all(|o| has_sort_field(doc, o)))
        .collect();

    if !query.order_by.is_empty() {
        let tie_break = query
            .order_by
            .last()
            .map(|o| o.order)
            .unwrap_or(SortOrder::Asc);
        result.sort_by(|a, b| {
            query
                .order_by
                .iter()
                .map(|o| compare_by(a, b, o))
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or_else(|| tie_break.apply(a.id.cmp(&b.id)))
        });
    }

    if let Some(limit) = query.limit {
        result.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn doc(id: &str, fields: Value) -> Document {
        Document::new(id, fields.as_object().cloned().unwrap_or_default())
    }

    fn ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_type_order() {
        let ordered = [
            json!(null),
            json!(false),
            json!(true),
            json!(-1),
            json!(2.5),
            json!(10),
            json!("A"),
            json!("a"),
            json!([1]),
            json!({"a": 1}),
        ];
        for pair in ordered.windows(2) {
            assert_eq!(compare_values(&pair[0], &pair[1]), Ordering::Less, "{:?}", pair);
        }
    }

    #[test]
    fn test_int_equals_double() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(!values_equal(&json!(1), &json!("1")));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let d = doc("a", json!({"status": null}));
        assert!(matches(&d, &Filter::equals("status", FilterValue::Null)));
        assert!(!matches(&d, &Filter::equals("priority", FilterValue::Null)));
    }

    #[test]
    fn test_document_id_filters() {
        let d = doc("c1", json!({}));
        assert!(matches(&d, &Filter::equals("id", "c1")));
        assert!(!matches(&d, &Filter::equals("id", "c2")));
        assert!(matches(&d, &Filter::in_list("id", ["c0", "c1"])));
        assert!(!matches(&d, &Filter::equals("id", true)));
    }

    #[test]
    fn test_order_excludes_missing_field() {
        let docs = vec![
            doc("a", json!({"priority": 2})),
            doc("b", json!({})),
            doc("c", json!({"priority": 1})),
        ];
        let query = DocumentQuery::new("x").order_by(OrderByField::asc("priority"));
        assert_eq!(ids(&evaluate(docs, &query)), vec!["c", "a"]);
    }

    #[test]
    fn test_order_desc_with_id_tie_break() {
        let docs = vec![
            doc("a", json!({"n": 1})),
            doc("b", json!({"n": 2})),
            doc("c", json!({"n": 2})),
        ];
        let query = DocumentQuery::new("x").order_by(OrderByField::desc("n"));
        assert_eq!(ids(&evaluate(docs, &query)), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_multiple_sort_keys_and_limit() {
        let docs = vec![
            doc("a", json!({"cat": "Lab", "n": 3})),
            doc("b", json!({"cat": "Hostel", "n": 1})),
            doc("c", json!({"cat": "Lab", "n": 1})),
        ];
        let query = DocumentQuery::new("x")
            .order_by(OrderByField::asc("cat"))
            .order_by(OrderByField::asc("n"))
            .limit(2);
        assert_eq!(ids(&evaluate(docs, &query)), vec!["b", "c"]);
    }
}
