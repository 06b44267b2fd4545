use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use shikyou_types::DocumentId;

use crate::document::{Document, Fields, Filter};
use crate::error::{StoreError, StoreResult};
use crate::traits::DocumentStore;

/// Length of generated ids, matching Firestore auto-ids.
const AUTO_ID_LEN: usize = 20;

type Collections = HashMap<String, HashMap<DocumentId, Fields>>;

/// In-memory, HashMap-based document store.
///
/// Intended for tests and embedding. Collections spring into existence on
/// first write. Query results come back in `HashMap` iteration order, which
/// is as unordered as the real backend.
pub struct InMemoryDocumentStore {
    collections: RwLock<Collections>,
}

impl InMemoryDocumentStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.read_guard()
            .map(|c| c.get(collection).map_or(0, HashMap::len))
            .unwrap_or(0)
    }

    /// Returns `true` if no collection holds any document.
    pub fn is_empty(&self) -> bool {
        self.read_guard()
            .map(|c| c.values().all(HashMap::is_empty))
            .unwrap_or(true)
    }

    /// Remove every document from every collection.
    pub fn clear(&self) {
        if let Ok(mut c) = self.write_guard() {
            c.clear();
        }
    }

    fn read_guard(&self) -> StoreResult<RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))
    }

    fn write_guard(&self) -> StoreResult<RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))
    }

    fn generate_id() -> DocumentId {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(AUTO_ID_LEN)
            .map(char::from)
            .collect();
        DocumentId::new(id)
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn add(&self, collection: &str, fields: Fields) -> StoreResult<DocumentId> {
        let mut all = self.write_guard()?;
        let docs = all.entry(collection.to_string()).or_default();
        let mut id = Self::generate_id();
        while docs.contains_key(&id) {
            id = Self::generate_id();
        }
        docs.insert(id.clone(), fields);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &DocumentId) -> StoreResult<Option<Document>> {
        let all = self.read_guard()?;
        Ok(all
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id.clone(), fields.clone())))
    }

    async fn update(&self, collection: &str, id: &DocumentId, fields: Fields) -> StoreResult<()> {
        let mut all = self.write_guard()?;
        let existing = all
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        existing.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &DocumentId) -> StoreResult<()> {
        let mut all = self.write_guard()?;
        if let Some(docs) = all.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn increment(
        &self,
        collection: &str,
        id: &DocumentId,
        field: &str,
        by: i64,
    ) -> StoreResult<()> {
        let mut all = self.write_guard()?;
        let doc = all
            .entry(collection.to_string())
            .or_default()
            .entry(id.clone())
            .or_default();
        let current = doc.get(field).and_then(Value::as_i64).unwrap_or(0);
        doc.insert(field.to_string(), Value::from(current.saturating_add(by)));
        Ok(())
    }

    async fn query(&self, collection: &str, filter: Option<&Filter>) -> StoreResult<Vec<Document>> {
        let all = self.read_guard()?;
        let Some(docs) = all.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .filter(|(_, fields)| filter.map_or(true, |f| f.matches(fields)))
            .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
            .collect())
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<String, usize> = self
            .read_guard()
            .map(|c| c.iter().map(|(k, v)| (k.clone(), v.len())).collect())
            .unwrap_or_default();
        f.debug_struct("InMemoryDocumentStore")
            .field("collections", &counts)
            .finish()
    }
}
