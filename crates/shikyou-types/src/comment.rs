use serde::{Deserialize, Serialize};

use crate::address::WalletAddress;
use crate::ids::{ContentRef, DocumentId};
use crate::session::Session;
use crate::temporal::Timestamp;

/// A stored comment on a post.
///
/// A reply names its parent through `parent_comment_id`. Replies may
/// themselves be replied to; readers that thread comments fold such chains
/// into the thread of the top-level ancestor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(skip)]
    pub id: DocumentId,
    pub post_id: DocumentId,
    pub comment_cid: ContentRef,
    pub author: WalletAddress,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<DocumentId>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_comment_id.is_some()
    }
}

/// Input to comment creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub post_id: DocumentId,
    pub comment_cid: ContentRef,
    pub author: WalletAddress,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<DocumentId>,
}

impl NewComment {
    pub fn new(
        post_id: DocumentId,
        comment_cid: ContentRef,
        author: WalletAddress,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            post_id,
            comment_cid,
            author,
            timestamp,
            parent_comment_id: None,
        }
    }

    /// A comment from the session's connected wallet.
    pub fn by(
        session: &Session,
        post_id: DocumentId,
        comment_cid: ContentRef,
        timestamp: Timestamp,
    ) -> Self {
        Self::new(post_id, comment_cid, session.address.clone(), timestamp)
    }

    pub fn reply_to(mut self, parent: DocumentId) -> Self {
        self.parent_comment_id = Some(parent);
        self
    }

    pub fn into_comment(self, id: DocumentId) -> Comment {
        Comment {
            id,
            post_id: self.post_id,
            comment_cid: self.comment_cid,
            author: self.author,
            timestamp: self.timestamp,
            parent_comment_id: self.parent_comment_id,
        }
    }
}

/// Edit of an existing comment: a new body reference and/or timestamp.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_cid: Option<ContentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

impl CommentPatch {
    /// The usual edit: new body, new timestamp.
    pub fn edit(comment_cid: ContentRef, timestamp: Timestamp) -> Self {
        Self {
            comment_cid: Some(comment_cid),
            timestamp: Some(timestamp),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.comment_cid.is_none() && self.timestamp.is_none()
    }
}
