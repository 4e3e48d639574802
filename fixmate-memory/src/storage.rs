//! In-memory object storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use fixmate_query::{ObjectStorage, QueryResult};
use parking_lot::RwLock;

/// Objects keyed by full path. Clones share the same objects.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    /// Create an empty object store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an object.
    pub fn object(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.read().get(path).cloned()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Check if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put(&self, path: &str, bytes: Vec<u8>) -> QueryResult<String> {
        self.objects.write().insert(path.to_string(), bytes);
        Ok(path.to_string())
    }
}
