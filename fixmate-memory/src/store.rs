//! In-memory document store.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fixmate_query::{Document, DocumentQuery, DocumentStore, QueryResult, Record, Write};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::debug;

use crate::error::{MemoryError, MemoryResult};
use crate::filter::evaluate;

type Collection = BTreeMap<String, Record>;

#[derive(Default)]
struct StoreInner {
    collections: RwLock<HashMap<String, Collection>>,
    latency: Option<Duration>,
    next_failure: Mutex<Option<MemoryError>>,
}

/// Process-local document store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("collections", &self.collection_names())
            .field("latency", &self.inner.latency)
            .finish()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that delays every call.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                latency: Some(latency),
                ..Default::default()
            }),
        }
    }

    /// Put a document in place, replacing any existing one.
    ///
    /// An `id` key in `fields` is ignored.
    pub fn seed(&self, collection: &str, id: &str, fields: Value) {
        let mut fields = match fields {
            Value::Object(map) => map,
            _ => Record::new(),
        };
        fields.remove("id");
        self.inner
            .collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    /// Read a document without going through the async API.
    pub fn document(&self, collection: &str, id: &str) -> Option<Document> {
        self.inner
            .collections
            .read()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone()))
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.inner
            .collections
            .read()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Names of every collection holding at least one document.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .collections
            .read()
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Make the next store call fail with the given backend code.
    pub fn fail_next(&self, code: impl Into<String>, message: impl Into<String>) {
        *self.inner.next_failure.lock() = Some(MemoryError::injected(code, message));
    }

    /// Remove every document.
    pub fn clear(&self) {
        self.inner.collections.write().clear();
    }

    async fn enter(&self) -> MemoryResult<()> {
        if let Some(latency) = self.inner.latency {
            tokio::time::sleep(latency).await;
        }
        match self.inner.next_failure.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn apply(&self, writes: Vec<Write>) -> MemoryResult<()> {
        let mut collections = self.inner.collections.write();

        // Validate the whole batch before touching anything.
        let mut created: HashSet<(&str, &str)> = HashSet::new();
        let mut deleted: HashSet<(&str, &str)> = HashSet::new();
        for write in &writes {
            let key = (write.collection(), write.id());
            match write {
                Write::Set { .. } | Write::Merge { .. } => {
                    created.insert(key);
                    deleted.remove(&key);
                }
                Write::Delete { .. } => {
                    deleted.insert(key);
                    created.remove(&key);
                }
                Write::Update { collection, id, .. } => {
                    let stored = collections
                        .get(collection.as_str())
                        .is_some_and(|docs| docs.contains_key(id.as_str()));
                    let exists = created.contains(&key) || (stored && !deleted.contains(&key));
                    if !exists {
                        return Err(MemoryError::MissingDocument(format!("{}/{}", collection, id)));
                    }
                }
            }
        }

        for write in writes {
            match write {
                Write::Set {
                    collection,
                    id,
                    fields,
                } => {
                    collections.entry(collection).or_default().insert(id, fields);
                }
                Write::Update {
                    collection,
                    id,
                    fields,
                }
                | Write::Merge {
                    collection,
                    id,
                    fields,
                } => {
                    let doc = collections.entry(collection).or_default().entry(id).or_default();
                    for (key, value) in fields {
                        doc.insert(key, value);
                    }
                }
                Write::Delete { collection, id } => {
                    if let Some(docs) = collections.get_mut(&collection) {
                        docs.remove(&id);
                    }
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> QueryResult<Option<Document>> {
        self.enter().await?;
        Ok(self.document(collection, id))
    }

    async fn run_query(&self, query: &DocumentQuery) -> QueryResult<Vec<Document>> {
        self.enter().await?;
        let docs: Vec<Document> = self
            .inner
            .collections
            .read()
            .get(&query.collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let result = evaluate(docs, query);
        debug!(collection = %query.collection, matched = result.len(), "Memory query");
        Ok(result)
    }

    async fn commit(&self, writes: Vec<Write>) -> QueryResult<()> {
        self.enter().await?;
        let count = writes.len();
        self.apply(writes)?;
        debug!(writes = count, "Memory batch committed");
        Ok(())
    }
}
