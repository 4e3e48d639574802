//! Document store over the Firestore REST API.

use async_trait::async_trait;
use fixmate_query::{Document, DocumentQuery, DocumentStore, QueryResult, Write};
use tracing::debug;

use crate::client::FirestoreClient;
use crate::query::{commit_body, structured_query};
use crate::value::decode_document;

/// Firestore documents.
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    client: FirestoreClient,
}

impl FirestoreStore {
    /// Create a store on a client.
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(&self, collection: &str, id: &str) -> QueryResult<Option<Document>> {
        match self.client.get_document(collection, id).await? {
            Some(resource) => Ok(Some(decode_document(&resource)?)),
            None => Ok(None),
        }
    }

    async fn run_query(&self, query: &DocumentQuery) -> QueryResult<Vec<Document>> {
        let Some(body) = structured_query(self.client.config(), query) else {
            debug!(collection = %query.collection, "Query cannot match, skipping request");
            return Ok(Vec::new());
        };

        let resources = self.client.run_query(&body).await?;
        let documents = resources
            .iter()
            .map(decode_document)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(documents)
    }

    async fn commit(&self, writes: Vec<Write>) -> QueryResult<()> {
        if writes.is_empty() {
            return Ok(());
        }
        let body = commit_body(self.client.config(), &writes);
        self.client.commit(&body).await?;
        Ok(())
    }
}
