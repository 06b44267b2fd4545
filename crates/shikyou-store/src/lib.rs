//! Schema-less document storage for Shikyou.
//!
//! Records live in named collections of documents, each document a flat
//! key/value map addressed by a [`DocumentId`](shikyou_types::DocumentId).
//! This crate knows nothing about posts or comments; it moves maps in and
//! out of a backend.
//!
//! # Collections
//!
//! - [`collections::POSTS`] -- blog posts
//! - [`collections::COMMENTS`] -- comments, filtered by `postId` / `author`
//! - [`collections::POST_VIEWS`] -- one view counter per post id
//!
//! # Storage Backends
//!
//! All backends implement the [`DocumentStore`] trait:
//!
//! - [`InMemoryDocumentStore`] -- `HashMap`-based store for tests and embedding
//! - [`FirestoreStore`] -- Firestore REST v1 over HTTPS
//!
//! # Design Rules
//!
//! 1. Every trait call is one backend round trip.
//! 2. Nothing is cached; reads always re-fetch.
//! 3. No ordering is promised for query results.
//! 4. Deleting a missing document succeeds.
//! 5. Backend errors are propagated unmodified, never retried.

pub mod config;
pub mod document;
pub mod error;
pub mod firestore;
pub mod memory;
pub mod traits;

pub use config::{ConfigError, FirestoreConfig};
pub use document::{collections, Document, Fields, Filter};
pub use error::{StoreError, StoreResult};
pub use firestore::FirestoreStore;
pub use memory::InMemoryDocumentStore;
pub use traits::DocumentStore;
