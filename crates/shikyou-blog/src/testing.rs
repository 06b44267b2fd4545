//! Failure injection around the in-memory store.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shikyou_store::{
    Document, DocumentStore, Fields, Filter, InMemoryDocumentStore, StoreError, StoreResult,
};
use shikyou_types::{DocumentId, ManualClock, Timestamp};

use crate::Blog;

#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryDocumentStore,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_deletes_of: Mutex<HashSet<DocumentId>>,
    pub delete_calls: AtomicUsize,
}

impl FlakyStore {
    fn read_gate(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected read failure".into()));
        }
        Ok(())
    }

    fn write_gate(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn add(&self, collection: &str, fields: Fields) -> StoreResult<DocumentId> {
        self.write_gate()?;
        self.inner.add(collection, fields).await
    }

    async fn get(&self, collection: &str, id: &DocumentId) -> StoreResult<Option<Document>> {
        self.read_gate()?;
        self.inner.get(collection, id).await
    }

    async fn update(&self, collection: &str, id: &DocumentId, fields: Fields) -> StoreResult<()> {
        self.write_gate()?;
        self.inner.update(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &DocumentId) -> StoreResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.write_gate()?;
        if self.fail_deletes_of.lock().unwrap().contains(id) {
            return Err(StoreError::Unavailable(format!("injected delete failure for {id}")));
        }
        self.inner.delete(collection, id).await
    }

    async fn increment(
        &self,
        collection: &str,
        id: &DocumentId,
        field: &str,
        by: i64,
    ) -> StoreResult<()> {
        self.write_gate()?;
        self.inner.increment(collection, id, field, by).await
    }

    async fn query(&self, collection: &str, filter: Option<&Filter>) -> StoreResult<Vec<Document>> {
        self.read_gate()?;
        self.inner.query(collection, filter).await
    }
}

pub const ALICE: &str = "0x1234567890123456789012345678901234567890";
pub const BOB: &str = "0x2345678901234567890123456789012345678901";

pub fn memory_blog() -> (Blog<InMemoryDocumentStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Timestamp::from_millis(1_700_000_000_000)));
    (Blog::with_clock(InMemoryDocumentStore::new(), clock.clone()), clock)
}

pub fn flaky_blog() -> Blog<FlakyStore> {
    Blog::new(FlakyStore::default())
}
