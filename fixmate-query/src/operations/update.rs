//! Update operation for merging a payload into matched documents.

use tracing::debug;

use super::{Target, fetch};
use crate::client::Client;
use crate::document::{Record, merge_fields};
use crate::error::QueryResult;
use crate::filter::ID_FIELD;
use crate::response::Data;
use crate::traits::Write;

/// A field-level merge applied to every matched document in one batch.
///
/// The returned records are built from the fields read before the write
/// plus the overlay; they are not read back from the store.
#[derive(Debug)]
pub struct UpdateOperation<'a> {
    client: &'a Client,
    collection: String,
    target: Target,
    updates: Record,
    single: bool,
}

impl<'a> UpdateOperation<'a> {
    /// Create a new update operation.
    pub fn new(
        client: &'a Client,
        collection: impl Into<String>,
        target: Target,
        mut updates: Record,
    ) -> Self {
        // The identifier is not a stored field.
        updates.remove(ID_FIELD);
        Self {
            client,
            collection: collection.into(),
            target,
            updates,
            single: false,
        }
    }

    /// Return the first updated record instead of a list.
    pub fn single(mut self, single: bool) -> Self {
        self.single = single;
        self
    }

    /// Execute the update and return the merged records.
    pub async fn exec(self) -> QueryResult<Data> {
        let docs = fetch(self.client, &self.target).await?;
        if docs.is_empty() {
            debug!(collection = %self.collection, "Update matched nothing");
            return Ok(Data::Many(Vec::new()));
        }

        let writes = docs
            .iter()
            .map(|doc| Write::Update {
                collection: self.collection.clone(),
                id: doc.id.clone(),
                fields: self.updates.clone(),
            })
            .collect();

        let store = self.client.store();
        self.client.call("commit", store.commit(writes)).await?;
        debug!(collection = %self.collection, updated = docs.len(), "Update committed");

        let mut merged: Vec<Record> = docs
            .into_iter()
            .map(|mut doc| {
                merge_fields(&mut doc.fields, &self.updates);
                doc.into_record()
            })
            .collect();

        if self.single {
            return Ok(Data::One(merged.swap_remove(0)));
        }
        Ok(Data::Many(merged))
    }
}
