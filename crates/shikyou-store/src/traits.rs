use async_trait::async_trait;
use shikyou_types::DocumentId;

use crate::document::{Document, Fields, Filter};
use crate::error::StoreResult;

/// Schema-less document store.
///
/// All implementations must satisfy these invariants:
/// - Every call is a single round trip to the backend; nothing is cached.
/// - Identifiers returned by `add` are unique within the collection.
/// - `query` promises no ordering.
/// - No call is retried; backend errors surface as-is.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document with a store-assigned id and return that id.
    async fn add(&self, collection: &str, fields: Fields) -> StoreResult<DocumentId>;

    /// Read a document by id.
    ///
    /// Returns `Ok(None)` if the document does not exist.
    async fn get(&self, collection: &str, id: &DocumentId) -> StoreResult<Option<Document>>;

    /// Merge `fields` into an existing document, replacing each named
    /// top-level field and leaving the others alone.
    ///
    /// Fails with [`StoreError::NotFound`](crate::StoreError::NotFound) if
    /// the document does not exist.
    async fn update(&self, collection: &str, id: &DocumentId, fields: Fields) -> StoreResult<()>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete(&self, collection: &str, id: &DocumentId) -> StoreResult<()>;

    /// Add `by` to an integer field, creating the document and the field as
    /// needed (merge-create). A missing or non-integer field counts as 0.
    async fn increment(
        &self,
        collection: &str,
        id: &DocumentId,
        field: &str,
        by: i64,
    ) -> StoreResult<()>;

    /// Every document of the collection matching `filter`, or all documents
    /// when `filter` is `None`.
    async fn query(&self, collection: &str, filter: Option<&Filter>) -> StoreResult<Vec<Document>>;

    /// Returns `true` if the document exists.
    async fn exists(&self, collection: &str, id: &DocumentId) -> StoreResult<bool> {
        Ok(self.get(collection, id).await?.is_some())
    }
}
