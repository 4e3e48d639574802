//! HTTP client shared by the Firestore, Identity Toolkit and Storage seams.

use std::sync::Arc;

use fixmate_query::SessionState;
use reqwest::{RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::config::FirestoreConfig;
use crate::error::{FirestoreError, FirestoreResult};
use crate::value::query_results;

/// Which error body format a service speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Service {
    Firestore,
    Identity,
    Storage,
}

/// A REST client for one Firebase project.
///
/// Clones share the HTTP connection pool and the session, so a sign-in
/// through the auth seam authorizes later document and storage calls.
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    http: reqwest::Client,
    config: Arc<FirestoreConfig>,
    session: SessionState,
}

impl FirestoreClient {
    /// Create a client. Nobody is signed in.
    pub fn new(config: FirestoreConfig) -> FirestoreResult<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        info!(
            project_id = %config.project_id,
            database_id = %config.database_id,
            "Firebase REST client created"
        );

        Ok(Self {
            http,
            config: Arc::new(config),
            session: SessionState::signed_out(),
        })
    }

    /// The configuration.
    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    /// The session channel.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    fn token(&self) -> Option<String> {
        self.session.snapshot().map(|user| user.access_token)
    }

    async fn send(&self, service: Service, request: RequestBuilder) -> FirestoreResult<Response> {
        let request = match (service, self.token()) {
            (Service::Firestore, Some(token)) => request.bearer_auth(token),
            (Service::Storage, Some(token)) => {
                request.header("Authorization", format!("Firebase {}", token))
            }
            _ => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), ?service, "Request failed");
        Err(match service {
            Service::Identity => FirestoreError::from_auth_body(status.as_u16(), &body),
            Service::Firestore | Service::Storage => {
                FirestoreError::from_api_body(status.as_u16(), &body)
            }
        })
    }

    async fn send_json(&self, service: Service, request: RequestBuilder) -> FirestoreResult<Value> {
        let response = self.send(service, request).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| FirestoreError::decode(e.to_string()))
    }

    fn document_url(&self, collection: &str, id: &str) -> FirestoreResult<Url> {
        let mut url = Url::parse(&self.config.firestore_endpoint)?;
        url.path_segments_mut()
            .map_err(|_| FirestoreError::config("firestore endpoint cannot be a base URL"))?
            .pop_if_empty()
            .extend([
                "projects",
                self.config.project_id.as_str(),
                "databases",
                self.config.database_id.as_str(),
                "documents",
                collection,
                id,
            ]);
        Ok(url)
    }

    /// Fetch a document resource; `None` if it does not exist.
    ///
    /// An empty id would address the collection itself, so it names no
    /// document.
    pub async fn get_document(&self, collection: &str, id: &str) -> FirestoreResult<Option<Value>> {
        if id.is_empty() {
            return Ok(None);
        }
        debug!(collection, id, "GET document");
        let url = self.document_url(collection, id)?;
        match self
            .send_json(Service::Firestore, self.http.get(url))
            .await
        {
            Ok(resource) => Ok(Some(resource)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Run a structured query and return the document resources.
    pub async fn run_query(&self, body: &Value) -> FirestoreResult<Vec<Value>> {
        let url = self
            .config
            .firestore_url(&format!("{}:runQuery", self.config.documents_root()));
        debug!(%url, "POST runQuery");

        let response = self
            .send_json(Service::Firestore, self.http.post(url).json(body))
            .await?;
        query_results(response)
    }

    /// Apply a batch of writes atomically.
    pub async fn commit(&self, body: &Value) -> FirestoreResult<()> {
        let url = self
            .config
            .firestore_url(&format!("{}:commit", self.config.documents_root()));
        debug!(%url, "POST commit");
        self.send_json(Service::Firestore, self.http.post(url).json(body))
            .await?;
        Ok(())
    }

    /// Call an Identity Toolkit `accounts:*` method.
    pub async fn identity(&self, method: &str, body: &Value) -> FirestoreResult<Value> {
        debug!(method, "POST identity toolkit");
        let request = self
            .http
            .post(self.config.identity_url(method))
            .query(&[("key", self.config.api_key.as_str())])
            .json(body);
        self.send_json(Service::Identity, request).await
    }

    /// Upload an object and return its stored name.
    pub async fn upload(&self, path: &str, bytes: Vec<u8>) -> FirestoreResult<String> {
        debug!(path, size = bytes.len(), "Upload object");
        let request = self
            .http
            .post(self.config.upload_url())
            .query(&[("uploadType", "media"), ("name", path)])
            .header("Content-Type", "application/octet-stream")
            .body(bytes);

        let object = self.send_json(Service::Storage, request).await?;
        Ok(object
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(path)
            .to_string())
    }
}
