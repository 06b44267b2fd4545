//! Foundation types for Shikyou.
//!
//! Every other Shikyou crate depends on `shikyou-types`. The types here are
//! plain records; they carry no storage logic.
//!
//! # Key Types
//!
//! - [`Post`] / [`NewPost`] / [`PostPatch`] -- blog posts and their write shapes
//! - [`Comment`] / [`NewComment`] / [`CommentPatch`] -- comments, optionally threaded
//! - [`DocumentId`] -- store-assigned document key
//! - [`ContentRef`] -- opaque content-addressed reference (cid)
//! - [`WalletAddress`] -- author identifier
//! - [`Timestamp`] / [`Clock`] -- millisecond wall-clock time
//! - [`Session`] -- explicit connected-wallet context

pub mod address;
pub mod comment;
pub mod error;
pub mod ids;
pub mod post;
pub mod session;
pub mod temporal;

pub use address::WalletAddress;
pub use comment::{Comment, CommentPatch, NewComment};
pub use error::TypeError;
pub use ids::{ContentRef, DocumentId};
pub use post::{NewPost, Post, PostPatch};
pub use session::Session;
pub use temporal::{Clock, ManualClock, SystemClock, Timestamp};
