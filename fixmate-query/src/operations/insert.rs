//! Insert operation for creating documents.

use serde_json::Value;
use tracing::debug;

use crate::client::Client;
use crate::document::{CREATED_AT_FIELD, Record, timestamp_now};
use crate::error::{QueryError, QueryResult};
use crate::filter::ID_FIELD;
use crate::response::Data;
use crate::traits::Write;
use crate::types::Payload;

/// Creation of one or more documents.
///
/// Records carrying a non-empty string `id` are written at that identifier
/// (create or overwrite); the others get a store-allocated identifier. An
/// `id` containing `/` is rejected before anything is written. Every
/// record is stamped with `created_at` unless it already has one. All
/// records go into a single atomic batch.
#[derive(Debug)]
pub struct InsertOperation<'a> {
    client: &'a Client,
    collection: String,
    payload: Payload,
}

impl<'a> InsertOperation<'a> {
    /// Create a new insert operation.
    pub fn new(client: &'a Client, collection: impl Into<String>, payload: Payload) -> Self {
        Self {
            client,
            collection: collection.into(),
            payload,
        }
    }

    /// Execute the insert and return the created records.
    pub async fn exec(self) -> QueryResult<Data> {
        let single = matches!(self.payload, Payload::One(_));
        let store = self.client.store();

        let mut writes = Vec::with_capacity(self.payload.len());
        let mut created = Vec::with_capacity(self.payload.len());

        for mut fields in self.payload.into_records() {
            if fields.get(CREATED_AT_FIELD).is_none_or(Value::is_null) {
                fields.insert(CREATED_AT_FIELD.to_string(), Value::String(timestamp_now()));
            }

            let id = match fields.remove(ID_FIELD) {
                Some(Value::String(id)) if id.contains('/') => {
                    return Err(QueryError::invalid_payload(format!(
                        "document id '{}' cannot contain '/'",
                        id
                    ))
                    .with_collection(&self.collection)
                    .with_field(ID_FIELD));
                }
                Some(Value::String(id)) if !id.is_empty() => id,
                _ => store.allocate_id(&self.collection),
            };

            let mut record: Record = fields.clone();
            record.insert(ID_FIELD.to_string(), Value::String(id.clone()));
            created.push(record);

            writes.push(Write::Set {
                collection: self.collection.clone(),
                id,
                fields,
            });
        }

        if !writes.is_empty() {
            self.client.call("commit", store.commit(writes)).await?;
        }
        debug!(collection = %self.collection, inserted = created.len(), "Insert committed");

        if single {
            if let Some(record) = created.pop() {
                return Ok(Data::One(record));
            }
        }
        Ok(Data::Many(created))
    }
}
