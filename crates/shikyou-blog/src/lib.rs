//! Shikyou blog records over a schema-less document store.
//!
//! [`Blog`] is the entry point. It is generic over any
//! [`DocumentStore`](shikyou_store::DocumentStore) and groups three concerns:
//!
//! - **Record store** ([`records`]) -- create/update/delete of posts and comments
//! - **Queries** ([`query`]) -- category, author and post scoped reads, search,
//!   comment threads, and the batch comment purge
//! - **View counter** ([`views`]) -- best-effort per-post view counts
//!
//! Failed writes surface as [`BlogError::StoreWrite`], failed reads as
//! [`BlogError::StoreRead`]. Nothing is retried. The view counter never
//! fails.

pub mod blog;
pub mod codec;
pub mod error;
pub mod query;
pub mod records;
pub mod views;

#[cfg(test)]
mod testing;

pub use blog::Blog;
pub use error::{BlogError, BlogResult};
pub use query::{CommentThread, PostWithViews};

// Re-export key types
pub use shikyou_store::{DocumentStore, FirestoreConfig, FirestoreStore, InMemoryDocumentStore};
pub use shikyou_types::{
    Clock, Comment, CommentPatch, ContentRef, DocumentId, NewComment, NewPost, Post, PostPatch,
    Session, SystemClock, Timestamp, WalletAddress,
};
