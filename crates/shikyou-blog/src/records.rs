//! Create, update and delete of posts and comments.

use shikyou_store::collections::{COMMENTS, POSTS};
use shikyou_store::document::to_fields;
use shikyou_store::{DocumentStore, StoreError};
use shikyou_types::{CommentPatch, DocumentId, NewComment, NewPost, PostPatch};

use crate::blog::Blog;
use crate::codec::stamped_patch;
use crate::error::{BlogError, BlogResult};

impl<S: DocumentStore> Blog<S> {
    /// Store a new post with `createdAt == updatedAt == now` and return its id.
    pub async fn create_post(&self, post: NewPost) -> BlogResult<DocumentId> {
        let now = self.clock.now();
        let record = post.into_post(DocumentId::default(), now);
        let fields = to_fields(&record).map_err(BlogError::StoreWrite)?;
        let id = self
            .store
            .add(POSTS, fields)
            .await
            .map_err(BlogError::StoreWrite)?;
        tracing::debug!(%id, category = %record.category, "post created");
        Ok(id)
    }

    /// Merge `patch` into an existing post and bump `updatedAt`.
    ///
    /// `createdAt` is never touched. Fails if the post does not exist.
    pub async fn update_post(&self, id: &DocumentId, patch: PostPatch) -> BlogResult<()> {
        let fields = stamped_patch(&patch, self.clock.now()).map_err(BlogError::StoreWrite)?;
        self.store
            .update(POSTS, id, fields)
            .await
            .map_err(BlogError::StoreWrite)?;
        tracing::debug!(%id, "post updated");
        Ok(())
    }

    /// Delete a post. Its comments are left alone; see
    /// [`delete_post_with_comments`](Self::delete_post_with_comments).
    pub async fn delete_post(&self, id: &DocumentId) -> BlogResult<()> {
        self.store
            .delete(POSTS, id)
            .await
            .map_err(BlogError::StoreWrite)?;
        tracing::debug!(%id, "post deleted");
        Ok(())
    }

    /// Purge a post's comments, then the post itself.
    ///
    /// If the purge fails the post is kept, though some comments may already
    /// be gone.
    pub async fn delete_post_with_comments(&self, id: &DocumentId) -> BlogResult<usize> {
        let purged = self.delete_all_comments_for_post(id).await?;
        self.delete_post(id).await?;
        Ok(purged)
    }

    /// Store a new comment and return its id.
    ///
    /// The referenced post must exist; otherwise nothing is written and the
    /// call fails with a not-found write error. A reply's parent comment is
    /// not checked.
    pub async fn create_comment(&self, comment: NewComment) -> BlogResult<DocumentId> {
        let post_exists = self
            .store
            .exists(POSTS, &comment.post_id)
            .await
            .map_err(BlogError::StoreWrite)?;
        if !post_exists {
            return Err(BlogError::StoreWrite(StoreError::not_found(
                POSTS,
                &comment.post_id,
            )));
        }

        let fields = to_fields(&comment).map_err(BlogError::StoreWrite)?;
        let id = self
            .store
            .add(COMMENTS, fields)
            .await
            .map_err(BlogError::StoreWrite)?;
        tracing::debug!(%id, post_id = %comment.post_id, "comment created");
        Ok(id)
    }

    pub async fn update_comment(&self, id: &DocumentId, patch: CommentPatch) -> BlogResult<()> {
        let fields = to_fields(&patch).map_err(BlogError::StoreWrite)?;
        self.store
            .update(COMMENTS, id, fields)
            .await
            .map_err(BlogError::StoreWrite)?;
        tracing::debug!(%id, "comment updated");
        Ok(())
    }

    pub async fn delete_comment(&self, id: &DocumentId) -> BlogResult<()> {
        self.store
            .delete(COMMENTS, id)
            .await
            .map_err(BlogError::StoreWrite)?;
        tracing::debug!(%id, "comment deleted");
        Ok(())
    }
}
