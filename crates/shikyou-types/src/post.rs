use serde::{Deserialize, Serialize};

use crate::address::WalletAddress;
use crate::ids::{ContentRef, DocumentId};
use crate::session::Session;
use crate::temporal::Timestamp;

/// A stored blog post.
///
/// `id` is the document key and is never serialized as a field. All other
/// fields use the camelCase names shared with every other client of the
/// `posts` collection. Older clients wrote posts without timestamps; those
/// read back as the epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(skip)]
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    pub author: WalletAddress,
    pub cid: ContentRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_cid: Option<ContentRef>,
    pub category: String,
    #[serde(default)]
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Timestamp,
}

impl Post {
    /// The fields the caller originally supplied, without id or timestamps.
    pub fn to_new(&self) -> NewPost {
        NewPost {
            title: self.title.clone(),
            content: self.content.clone(),
            author: self.author.clone(),
            cid: self.cid.clone(),
            image_cid: self.image_cid.clone(),
            category: self.category.clone(),
        }
    }
}

/// Input to post creation: a post without identifier or timestamps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: WalletAddress,
    pub cid: ContentRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_cid: Option<ContentRef>,
    pub category: String,
}

impl NewPost {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author: WalletAddress,
        cid: ContentRef,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            author,
            cid,
            image_cid: None,
            category: category.into(),
        }
    }

    /// A post authored by the session's connected wallet.
    pub fn by(
        session: &Session,
        title: impl Into<String>,
        content: impl Into<String>,
        cid: ContentRef,
        category: impl Into<String>,
    ) -> Self {
        Self::new(title, content, session.address.clone(), cid, category)
    }

    pub fn with_image(mut self, image_cid: ContentRef) -> Self {
        self.image_cid = Some(image_cid);
        self
    }

    /// Attach the store-assigned id and creation time.
    pub fn into_post(self, id: DocumentId, at: Timestamp) -> Post {
        Post {
            id,
            title: self.title,
            content: self.content,
            author: self.author,
            cid: self.cid,
            image_cid: self.image_cid,
            category: self.category,
            created_at: at,
            updated_at: at,
        }
    }
}

/// Partial update of a post. Unset fields are left untouched.
///
/// There is no `createdAt` field; `updatedAt` is stamped by the store
/// layer on every update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<WalletAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<ContentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_cid: Option<ContentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl PostPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn cid(mut self, cid: ContentRef) -> Self {
        self.cid = Some(cid);
        self
    }

    pub fn image_cid(mut self, image_cid: ContentRef) -> Self {
        self.image_cid = Some(image_cid);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
