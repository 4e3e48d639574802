//! Firebase REST backend configuration.

use std::time::Duration;

use fixmate_query::AdapterConfig;
use url::Url;

use crate::error::{FirestoreError, FirestoreResult};

/// Connection settings for the Firebase REST APIs.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// Project identifier.
    pub project_id: String,
    /// Web API key.
    pub api_key: String,
    /// Firestore database.
    pub database_id: String,
    /// Default storage bucket.
    pub storage_bucket: String,
    /// Firestore REST API root.
    pub firestore_endpoint: String,
    /// Identity Toolkit REST API root.
    pub identity_endpoint: String,
    /// Storage REST API root.
    pub storage_endpoint: String,
    /// HTTP request timeout.
    pub request_timeout: Option<Duration>,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        let endpoints = fixmate_query::EndpointsConfig::default();
        Self {
            project_id: String::new(),
            api_key: String::new(),
            database_id: "(default)".to_string(),
            storage_bucket: String::new(),
            firestore_endpoint: endpoints.firestore,
            identity_endpoint: endpoints.identity_toolkit,
            storage_endpoint: endpoints.storage,
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl FirestoreConfig {
    /// Take the `[firebase]` and `[endpoints]` sections of an adapter
    /// configuration.
    pub fn from_adapter(config: &AdapterConfig) -> Self {
        Self {
            project_id: config.firebase.project_id.clone(),
            api_key: config.firebase.api_key.clone(),
            database_id: config.firebase.database_id.clone(),
            storage_bucket: config.firebase.storage_bucket.clone(),
            firestore_endpoint: config.endpoints.firestore.clone(),
            identity_endpoint: config.endpoints.identity_toolkit.clone(),
            storage_endpoint: config.endpoints.storage.clone(),
            ..Self::default()
        }
    }

    /// Create a builder for configuration.
    pub fn builder() -> FirestoreConfigBuilder {
        FirestoreConfigBuilder::new()
    }

    /// Check required settings and endpoint syntax.
    pub fn validate(&self) -> FirestoreResult<()> {
        if self.project_id.is_empty() {
            return Err(FirestoreError::config("project_id is required"));
        }
        if self.api_key.is_empty() {
            return Err(FirestoreError::config("api_key is required"));
        }
        for endpoint in [
            &self.firestore_endpoint,
            &self.identity_endpoint,
            &self.storage_endpoint,
        ] {
            Url::parse(endpoint).map_err(|e| {
                FirestoreError::config(format!("invalid endpoint '{}': {}", endpoint, e))
            })?;
        }
        Ok(())
    }

    /// `projects/{project}/databases/{database}/documents`
    pub fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database_id
        )
    }

    /// Full resource name of a document.
    pub fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_root(), collection, id)
    }

    pub(crate) fn firestore_url(&self, path: &str) -> String {
        format!("{}/{}", self.firestore_endpoint.trim_end_matches('/'), path)
    }

    pub(crate) fn identity_url(&self, method: &str) -> String {
        format!(
            "{}/accounts:{}",
            self.identity_endpoint.trim_end_matches('/'),
            method
        )
    }

    pub(crate) fn upload_url(&self) -> String {
        format!(
            "{}/v0/b/{}/o",
            self.storage_endpoint.trim_end_matches('/'),
            self.storage_bucket
        )
    }
}

/// Builder for Firebase REST configuration.
#[derive(Debug, Default)]
pub struct FirestoreConfigBuilder {
    config: FirestoreConfig,
}

impl FirestoreConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the project.
    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.config.project_id = project_id.into();
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = api_key.into();
        self
    }

    /// Set the database.
    pub fn database_id(mut self, database_id: impl Into<String>) -> Self {
        self.config.database_id = database_id.into();
        self
    }

    /// Set the storage bucket.
    pub fn storage_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.config.storage_bucket = bucket.into();
        self
    }

    /// Point every service at one emulator host, e.g. `http://localhost:9099`
    /// style roots for each API.
    pub fn emulators(
        mut self,
        firestore: impl Into<String>,
        identity: impl Into<String>,
        storage: impl Into<String>,
    ) -> Self {
        self.config.firestore_endpoint = firestore.into();
        self.config.identity_endpoint = identity.into();
        self.config.storage_endpoint = storage.into();
        self
    }

    /// Set the HTTP request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> FirestoreResult<FirestoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
