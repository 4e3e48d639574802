//! Select operation for reading documents.

use tracing::debug;

use super::{Target, fetch};
use crate::client::Client;
use crate::document::Document;
use crate::error::{QueryError, QueryResult};
use crate::response::Data;

/// A read of the documents matched by a target.
///
/// In single-row mode the first match is returned on its own and an empty
/// match is reported as not found.
#[derive(Debug)]
pub struct SelectOperation<'a> {
    client: &'a Client,
    collection: String,
    target: Target,
    single: bool,
}

impl<'a> SelectOperation<'a> {
    /// Create a new select operation.
    pub fn new(client: &'a Client, collection: impl Into<String>, target: Target) -> Self {
        Self {
            client,
            collection: collection.into(),
            target,
            single: false,
        }
    }

    /// Return one record instead of a list.
    pub fn single(mut self, single: bool) -> Self {
        self.single = single;
        self
    }

    /// Execute the read.
    pub async fn exec(self) -> QueryResult<Data> {
        let docs = fetch(self.client, &self.target).await?;
        debug!(collection = %self.collection, matched = docs.len(), single = self.single, "Select resolved");

        if self.single {
            return docs
                .into_iter()
                .next()
                .map(|doc| Data::One(doc.into_record()))
                .ok_or_else(|| QueryError::not_found(&self.collection));
        }

        Ok(Data::Many(docs.into_iter().map(Document::into_record).collect()))
    }
}
