//! Delete operation for removing matched documents.

use tracing::debug;

use super::{Target, fetch};
use crate::client::Client;
use crate::error::QueryResult;
use crate::traits::Write;

/// Deletion of every matched document in one batch.
///
/// Reports nothing about how many documents were removed.
#[derive(Debug)]
pub struct DeleteOperation<'a> {
    client: &'a Client,
    collection: String,
    target: Target,
}

impl<'a> DeleteOperation<'a> {
    /// Create a new delete operation.
    pub fn new(client: &'a Client, collection: impl Into<String>, target: Target) -> Self {
        Self {
            client,
            collection: collection.into(),
            target,
        }
    }

    /// Execute the delete.
    pub async fn exec(self) -> QueryResult<()> {
        let docs = fetch(self.client, &self.target).await?;
        if docs.is_empty() {
            return Ok(());
        }

        let count = docs.len();
        let writes = docs
            .into_iter()
            .map(|doc| Write::Delete {
                collection: self.collection.clone(),
                id: doc.id,
            })
            .collect();

        let store = self.client.store();
        self.client.call("commit", store.commit(writes)).await?;
        debug!(collection = %self.collection, deleted = count, "Delete committed");
        Ok(())
    }
}
