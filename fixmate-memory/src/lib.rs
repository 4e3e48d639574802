//! # fixmate-memory
//!
//! Process-local backend for the FixMate adapter.
//!
//! This crate provides:
//! - [`MemoryStore`]: a document store with Firestore query semantics
//!   (document-id ordering, sort keys exclude documents lacking the field,
//!   atomic batches, updates require an existing document)
//! - [`MemoryAuth`]: e-mail/password accounts with one current session,
//!   plus provisioning that leaves the session alone
//! - [`MemoryStorage`]: an object store
//!
//! It backs the test suites and local development.
//!
//! ## Example
//!
//! ```rust
//! use fixmate_memory::MemoryBackend;
//! use fixmate_query::Client;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let backend = MemoryBackend::new();
//! backend.store().seed("complaints", "c1", json!({"status": "Open"}));
//!
//! let client = Client::builder().backend(&backend).build().unwrap();
//! let response = client
//!     .from("complaints")
//!     .select("*")
//!     .eq("id", "c1")
//!     .single()
//!     .execute()
//!     .await;
//!
//! assert!(response.error.is_none());
//! # });
//! ```

pub mod auth;
pub mod error;
pub mod filter;
pub mod storage;
pub mod store;

use std::sync::Arc;

use fixmate_query::{AuthProvider, Backend, DocumentStore, ObjectStorage, UserProvisioner};
use tracing::info;

pub use auth::MemoryAuth;
pub use error::{MemoryError, MemoryResult};
pub use storage::MemoryStorage;
pub use store::MemoryStore;

/// The three in-memory services bundled as one backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    store: MemoryStore,
    auth: MemoryAuth,
    storage: MemoryStorage,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        info!("In-memory backend created");
        Self::default()
    }

    /// Create a backend from existing services.
    pub fn from_parts(store: MemoryStore, auth: MemoryAuth, storage: MemoryStorage) -> Self {
        Self {
            store,
            auth,
            storage,
        }
    }

    /// The document store.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// The auth service.
    pub fn auth(&self) -> &MemoryAuth {
        &self.auth
    }

    /// The object store.
    pub fn storage(&self) -> &MemoryStorage {
        &self.storage
    }
}

impl Backend for MemoryBackend {
    fn document_store(&self) -> Arc<dyn DocumentStore> {
        Arc::new(self.store.clone())
    }

    fn auth_provider(&self) -> Arc<dyn AuthProvider> {
        Arc::new(self.auth.clone())
    }

    fn object_storage(&self) -> Arc<dyn ObjectStorage> {
        Arc::new(self.storage.clone())
    }

    fn user_provisioner(&self) -> Option<Arc<dyn UserProvisioner>> {
        Some(Arc::new(self.auth.clone()))
    }
}
