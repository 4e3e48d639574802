//! The client handle.
//!
//! A [`Client`] is built once at startup and passed to every caller. It is
//! cheap to clone; all clones share the same backends and configuration.
//!
//! ```rust,ignore
//! let client = Client::builder()
//!     .backend(&backend)
//!     .config(AdapterConfig::from_file("fixmate.toml")?)
//!     .build()?;
//!
//! let open = client.from("complaints").select("*").eq("status", "Open").execute().await;
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

use crate::admin::Admin;
use crate::auth::Auth;
use crate::config::AdapterConfig;
use crate::error::{QueryError, QueryResult};
use crate::query::QueryBuilder;
use crate::storage::Storage;
use crate::traits::{AuthProvider, Backend, DocumentStore, ObjectStorage, UserProvisioner};

struct ClientInner {
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn AuthProvider>,
    storage: Arc<dyn ObjectStorage>,
    provisioner: Option<Arc<dyn UserProvisioner>>,
    config: AdapterConfig,
}

/// Handle to a configured backend.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("project_id", &self.inner.config.firebase.project_id)
            .field("provisioning", &self.inner.provisioner.is_some())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Start a query against a collection.
    pub fn from(&self, table: impl Into<String>) -> QueryBuilder {
        QueryBuilder::new(self.clone(), table)
    }

    /// Auth facade.
    pub fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    /// Storage facade.
    pub fn storage(&self) -> Storage<'_> {
        Storage::new(self)
    }

    /// Privileged user provisioning.
    pub fn admin(&self) -> Admin<'_> {
        Admin::new(self)
    }

    /// The active configuration.
    pub fn config(&self) -> &AdapterConfig {
        &self.inner.config
    }

    pub(crate) fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    pub(crate) fn auth_provider(&self) -> &dyn AuthProvider {
        self.inner.auth.as_ref()
    }

    pub(crate) fn object_storage(&self) -> &dyn ObjectStorage {
        self.inner.storage.as_ref()
    }

    pub(crate) fn provisioner(&self) -> Option<&dyn UserProvisioner> {
        self.inner.provisioner.as_deref()
    }

    /// Run one backend call under the configured timeout.
    pub(crate) async fn call<T, F>(&self, operation: &'static str, fut: F) -> QueryResult<T>
    where
        F: Future<Output = QueryResult<T>>,
    {
        match self.inner.config.timeout() {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => {
                    let ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                    debug!(operation, timeout_ms = ms, "Backend call timed out");
                    Err(QueryError::timeout(ms).with_context(operation))
                }
            },
            None => fut.await,
        }
    }
}

/// Builder for [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    store: Option<Arc<dyn DocumentStore>>,
    auth: Option<Arc<dyn AuthProvider>>,
    storage: Option<Arc<dyn ObjectStorage>>,
    provisioner: Option<Arc<dyn UserProvisioner>>,
    config: Option<AdapterConfig>,
}

impl ClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every seam from a backend.
    pub fn backend(mut self, backend: &impl Backend) -> Self {
        self.store = Some(backend.document_store());
        self.auth = Some(backend.auth_provider());
        self.storage = Some(backend.object_storage());
        self.provisioner = backend.user_provisioner();
        self
    }

    /// Set the document store.
    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the auth provider.
    pub fn auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set the object storage.
    pub fn storage(mut self, storage: Arc<dyn ObjectStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set the user provisioner.
    pub fn provisioner(mut self, provisioner: Arc<dyn UserProvisioner>) -> Self {
        self.provisioner = Some(provisioner);
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: AdapterConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the client.
    pub fn build(self) -> QueryResult<Client> {
        let store = self
            .store
            .ok_or_else(|| QueryError::configuration("no document store configured"))?;
        let auth = self
            .auth
            .ok_or_else(|| QueryError::configuration("no auth provider configured"))?;
        let storage = self
            .storage
            .ok_or_else(|| QueryError::configuration("no object storage configured"))?;
        let config = self.config.unwrap_or_default();

        info!(
            project_id = %config.firebase.project_id,
            provisioning = self.provisioner.is_some(),
            timeout_ms = ?config.query.timeout_ms,
            "Adapter client initialized"
        );

        Ok(Client {
            inner: Arc::new(ClientInner {
                store,
                auth,
                storage,
                provisioner: self.provisioner,
                config,
            }),
        })
    }
}
