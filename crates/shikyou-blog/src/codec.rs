//! Mapping between typed records and store documents.

use serde_json::Value;
use shikyou_store::document::to_fields;
use shikyou_store::{Document, Fields, StoreResult};
use shikyou_types::{Comment, Post, Timestamp};

pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";
pub const POST_ID: &str = "postId";
pub const AUTHOR: &str = "author";
pub const CATEGORY: &str = "category";
pub const VIEWS: &str = "views";

/// Decode a post, accepting documents written without timestamps.
///
/// A missing `updatedAt` reads as `createdAt`.
pub fn decode_post(doc: Document) -> StoreResult<Post> {
    let mut post: Post = doc.decode()?;
    if !doc.fields.contains_key(UPDATED_AT) {
        post.updated_at = post.created_at;
    }
    post.id = doc.id;
    Ok(post)
}

pub fn decode_comment(doc: Document) -> StoreResult<Comment> {
    let mut comment: Comment = doc.decode()?;
    comment.id = doc.id;
    Ok(comment)
}

/// Patch fields plus a fresh `updatedAt`.
pub fn stamped_patch<T: serde::Serialize>(patch: &T, at: Timestamp) -> StoreResult<Fields> {
    let mut fields = to_fields(patch)?;
    fields.insert(UPDATED_AT.to_string(), Value::from(at.as_millis()));
    Ok(fields)
}
