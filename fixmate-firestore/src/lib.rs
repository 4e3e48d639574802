//! # fixmate-firestore
//!
//! Firebase REST backend for the FixMate adapter.
//!
//! This crate provides:
//! - [`FirestoreStore`]: documents through `documents:runQuery`,
//!   `documents:commit` and point reads
//! - [`IdentityAuth`]: e-mail/password accounts through the Identity
//!   Toolkit `accounts:*` methods
//! - [`FirebaseStorage`]: media uploads to the configured bucket
//!
//! All three share one [`FirestoreClient`]; after a sign-in its ID token
//! authorizes document and storage calls.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fixmate_firestore::{FirestoreBackend, FirestoreConfig};
//! use fixmate_query::Client;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FirestoreConfig::builder()
//!     .project_id("fixmate-campus")
//!     .api_key("AIza...")
//!     .storage_bucket("fixmate-campus.appspot.com")
//!     .build()?;
//! let backend = FirestoreBackend::new(config)?;
//! let client = Client::builder().backend(&backend).build()?;
//!
//! let open = client
//!     .from("complaints")
//!     .select("*")
//!     .eq("status", "Open")
//!     .execute()
//!     .await;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod storage;
pub mod store;
pub mod value;

use std::sync::Arc;

use fixmate_query::{
    AdapterConfig, AuthProvider, Backend, DocumentStore, ObjectStorage, UserProvisioner,
};

pub use auth::IdentityAuth;
pub use client::FirestoreClient;
pub use config::{FirestoreConfig, FirestoreConfigBuilder};
pub use error::{FirestoreError, FirestoreResult};
pub use storage::FirebaseStorage;
pub use store::FirestoreStore;

/// The three Firebase services bundled as one backend.
#[derive(Debug, Clone)]
pub struct FirestoreBackend {
    client: FirestoreClient,
}

impl FirestoreBackend {
    /// Create a backend for a project.
    pub fn new(config: FirestoreConfig) -> FirestoreResult<Self> {
        Ok(Self {
            client: FirestoreClient::new(config)?,
        })
    }

    /// Create a backend from the `[firebase]` and `[endpoints]` sections
    /// of an adapter configuration.
    pub fn from_adapter_config(config: &AdapterConfig) -> FirestoreResult<Self> {
        Self::new(FirestoreConfig::from_adapter(config))
    }

    /// The shared client.
    pub fn client(&self) -> &FirestoreClient {
        &self.client
    }
}

impl Backend for FirestoreBackend {
    fn document_store(&self) -> Arc<dyn DocumentStore> {
        Arc::new(FirestoreStore::new(self.client.clone()))
    }

    fn auth_provider(&self) -> Arc<dyn AuthProvider> {
        Arc::new(IdentityAuth::new(self.client.clone()))
    }

    fn object_storage(&self) -> Arc<dyn ObjectStorage> {
        Arc::new(FirebaseStorage::new(self.client.clone()))
    }

    fn user_provisioner(&self) -> Option<Arc<dyn UserProvisioner>> {
        Some(Arc::new(IdentityAuth::new(self.client.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixmate_query::Client;

    #[test]
    fn test_backend_from_adapter_config() {
        let mut adapter = AdapterConfig::default();
        adapter.firebase.project_id = "campus".to_string();
        adapter.firebase.api_key = "key".to_string();

        let backend = FirestoreBackend::from_adapter_config(&adapter).unwrap();
        assert_eq!(backend.client().config().project_id, "campus");

        let client = Client::builder()
            .backend(&backend)
            .config(adapter)
            .build()
            .unwrap();
        assert!(client.admin().is_supported());
    }

    #[test]
    fn test_backend_requires_project() {
        assert!(FirestoreBackend::from_adapter_config(&AdapterConfig::default()).is_err());
    }
}
