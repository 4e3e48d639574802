//! Backend seams.
//!
//! A backend implements [`DocumentStore`], [`AuthProvider`] and
//! [`ObjectStorage`], and optionally [`UserProvisioner`]. The facades in
//! this crate translate caller-facing chains into calls on these traits.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::document::{Document, Record};
use crate::error::QueryResult;
use crate::filter::Filter;
use crate::types::OrderByField;

/// A collection query: conjunctive filters, sort keys and a limit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentQuery {
    /// Collection name.
    pub collection: String,
    /// Filters; all must hold.
    pub filters: Vec<Filter>,
    /// Sort keys in priority order.
    pub order_by: Vec<OrderByField>,
    /// Maximum number of documents.
    pub limit: Option<u64>,
}

impl DocumentQuery {
    /// Query every document of a collection.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Default::default()
        }
    }

    /// Add a filter.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add a sort key.
    pub fn order_by(mut self, order: OrderByField) -> Self {
        self.order_by.push(order);
        self
    }

    /// Set the limit.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One write of an atomic batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Create or overwrite a document.
    Set {
        /// Collection name.
        collection: String,
        /// Document identifier.
        id: String,
        /// Full field set.
        fields: Record,
    },
    /// Merge fields into an existing document; fails the batch if the
    /// document does not exist.
    Update {
        /// Collection name.
        collection: String,
        /// Document identifier.
        id: String,
        /// Fields to overlay.
        fields: Record,
    },
    /// Merge fields into a document, creating it if missing.
    Merge {
        /// Collection name.
        collection: String,
        /// Document identifier.
        id: String,
        /// Fields to overlay.
        fields: Record,
    },
    /// Delete a document; deleting a missing document succeeds.
    Delete {
        /// Collection name.
        collection: String,
        /// Document identifier.
        id: String,
    },
}

impl Write {
    /// The collection written to.
    pub fn collection(&self) -> &str {
        match self {
            Self::Set { collection, .. }
            | Self::Update { collection, .. }
            | Self::Merge { collection, .. }
            | Self::Delete { collection, .. } => collection,
        }
    }

    /// The document written to.
    pub fn id(&self) -> &str {
        match self {
            Self::Set { id, .. }
            | Self::Update { id, .. }
            | Self::Merge { id, .. }
            | Self::Delete { id, .. } => id,
        }
    }
}

/// Document storage.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read.
    async fn get(&self, collection: &str, id: &str) -> QueryResult<Option<Document>>;

    /// Run a collection query.
    async fn run_query(&self, query: &DocumentQuery) -> QueryResult<Vec<Document>>;

    /// Apply every write or none.
    async fn commit(&self, writes: Vec<Write>) -> QueryResult<()>;

    /// Allocate an identifier for a new document.
    fn allocate_id(&self, _collection: &str) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// A principal as tracked by an auth backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// User identifier.
    pub uid: String,
    /// E-mail address.
    pub email: String,
    /// Display name, if set.
    pub display_name: Option<String>,
    /// Current bearer token.
    pub access_token: String,
}

impl AuthUser {
    /// Display name, falling back to the local part of the e-mail address.
    pub fn full_name(&self) -> String {
        match &self.display_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Credential authentication with a single current session.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The current principal once the auth state has settled.
    async fn current_user(&self) -> QueryResult<Option<AuthUser>>;

    /// Authenticate and make the principal current.
    async fn sign_in(&self, email: &str, password: &str) -> QueryResult<AuthUser>;

    /// Create a credential and make it current.
    async fn sign_up(&self, email: &str, password: &str) -> QueryResult<AuthUser>;

    /// End the current session.
    async fn sign_out(&self) -> QueryResult<()>;

    /// Rotate the current principal's password.
    async fn update_password(&self, password: &str) -> QueryResult<()>;

    /// Set the current principal's display name.
    async fn update_display_name(&self, display_name: &str) -> QueryResult<()>;
}

/// Object storage.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store bytes at `path` and return the stored object's full path.
    async fn put(&self, path: &str, bytes: Vec<u8>) -> QueryResult<String>;
}

/// Privileged user creation that leaves the acting session untouched.
#[async_trait]
pub trait UserProvisioner: Send + Sync {
    /// Create a credential.
    async fn create_user(&self, email: &str, password: &str) -> QueryResult<AuthUser>;
}

/// A complete backend: the three required seams plus optional provisioning.
pub trait Backend {
    /// Document storage.
    fn document_store(&self) -> Arc<dyn DocumentStore>;

    /// Authentication.
    fn auth_provider(&self) -> Arc<dyn AuthProvider>;

    /// Object storage.
    fn object_storage(&self) -> Arc<dyn ObjectStorage>;

    /// Privileged user creation, if supported.
    fn user_provisioner(&self) -> Option<Arc<dyn UserProvisioner>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(display_name: Option<&str>) -> AuthUser {
        AuthUser {
            uid: "u1".to_string(),
            email: "jane.doe@campus.edu".to_string(),
            display_name: display_name.map(str::to_string),
            access_token: "token".to_string(),
        }
    }

    #[test]
    fn test_full_name_fallback() {
        assert_eq!(user(Some("Jane Doe")).full_name(), "Jane Doe");
        assert_eq!(user(None).full_name(), "jane.doe");
        assert_eq!(user(Some("")).full_name(), "jane.doe");
    }

    #[test]
    fn test_document_query_builder() {
        let query = DocumentQuery::new("complaints")
            .filter(Filter::equals("status", "Open"))
            .order_by(OrderByField::desc("created_at"))
            .limit(5);
        assert_eq!(query.collection, "complaints");
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.limit, Some(5));
    }

    #[test]
    fn test_write_accessors() {
        let write = Write::Delete {
            collection: "users".to_string(),
            id: "u1".to_string(),
        };
        assert_eq!(write.collection(), "users");
        assert_eq!(write.id(), "u1");
    }
}
