//! Resolution of a builder chain into backend calls.
//!
//! One operation type per pending operation:
//! - `SelectOperation` - Read matching documents
//! - `InsertOperation` - Create documents in one batch
//! - `UpdateOperation` - Merge a payload into matching documents
//! - `DeleteOperation` - Delete matching documents
//!
//! Reads always happen before writes, and every write set is committed as
//! one atomic batch.

mod delete;
mod insert;
mod select;
mod update;

pub use delete::DeleteOperation;
pub use insert::InsertOperation;
pub use select::SelectOperation;
pub use update::UpdateOperation;

use crate::client::Client;
use crate::document::Document;
use crate::error::QueryResult;
use crate::filter::{FieldRef, Filter};
use crate::traits::DocumentQuery;

/// The documents a read, update or delete applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Provably no documents; the backend is not consulted.
    Nothing,
    /// Documents matched by a query.
    Query(DocumentQuery),
}

impl Target {
    /// Check if the target has at least one filter.
    pub fn is_scoped(&self) -> bool {
        match self {
            Self::Nothing => true,
            Self::Query(query) => !query.filters.is_empty(),
        }
    }
}

/// Resolve a target to documents.
///
/// A lone identifier equality without ordering is served by a point read.
pub(crate) async fn fetch(client: &Client, target: &Target) -> QueryResult<Vec<Document>> {
    let query = match target {
        Target::Nothing => return Ok(Vec::new()),
        Target::Query(query) => query,
    };

    if query.limit == Some(0) {
        return Ok(Vec::new());
    }

    if let Some(id) = point_read_id(query) {
        let store = client.store();
        let doc = client.call("get", store.get(&query.collection, &id)).await?;
        return Ok(doc.into_iter().collect());
    }

    let store = client.store();
    client.call("run_query", store.run_query(query)).await
}

fn point_read_id(query: &DocumentQuery) -> Option<String> {
    if !query.order_by.is_empty() {
        return None;
    }
    match query.filters.as_slice() {
        [Filter::Equals(FieldRef::DocumentId, value)] => value.as_document_id(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderByField;

    #[test]
    fn test_point_read_detection() {
        let query = DocumentQuery::new("complaints").filter(Filter::equals("id", "abc"));
        assert_eq!(point_read_id(&query), Some("abc".to_string()));

        let ordered = query.clone().order_by(OrderByField::asc("created_at"));
        assert_eq!(point_read_id(&ordered), None);

        let two = query.filter(Filter::equals("status", "Open"));
        assert_eq!(point_read_id(&two), None);

        let by_field = DocumentQuery::new("complaints").filter(Filter::equals("status", "Open"));
        assert_eq!(point_read_id(&by_field), None);

        let empty = DocumentQuery::new("complaints").filter(Filter::equals("id", ""));
        assert_eq!(point_read_id(&empty), None);
    }

    #[test]
    fn test_target_scope() {
        assert!(Target::Nothing.is_scoped());
        assert!(!Target::Query(DocumentQuery::new("users")).is_scoped());
        assert!(
            Target::Query(DocumentQuery::new("users").filter(Filter::equals("role", "staff")))
                .is_scoped()
        );
    }
}
