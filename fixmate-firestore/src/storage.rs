//! Object storage over the Firebase Storage REST API.

use async_trait::async_trait;
use fixmate_query::{ObjectStorage, QueryError, QueryResult};

use crate::client::FirestoreClient;

/// Objects in the configured bucket.
#[derive(Debug, Clone)]
pub struct FirebaseStorage {
    client: FirestoreClient,
}

impl FirebaseStorage {
    /// Create a storage seam on a client.
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStorage for FirebaseStorage {
    async fn put(&self, path: &str, bytes: Vec<u8>) -> QueryResult<String> {
        if self.client.config().storage_bucket.is_empty() {
            return Err(QueryError::configuration("storage_bucket is not configured"));
        }
        Ok(self.client.upload(path, bytes).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FirestoreConfig;
    use fixmate_query::ErrorCode;

    #[tokio::test]
    async fn test_put_requires_bucket() {
        let config = FirestoreConfig::builder()
            .project_id("fixmate")
            .api_key("key")
            .build()
            .unwrap();
        let storage = FirebaseStorage::new(FirestoreClient::new(config).unwrap());
        let err = storage.put("a/b.png", vec![1, 2]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    }
}
