//! Best-effort per-post view counters.
//!
//! View tracking sits on the page-render path, so nothing here can fail:
//! backend errors are dropped where they occur.

use shikyou_store::collections::POST_VIEWS;
use shikyou_store::DocumentStore;
use shikyou_types::DocumentId;

use crate::blog::Blog;
use crate::codec::VIEWS;

impl<S: DocumentStore> Blog<S> {
    /// Add one view to `post_id`, creating its counter on first use.
    ///
    /// Never fails; a lost view is acceptable.
    pub async fn record_view(&self, post_id: &DocumentId) {
        if let Err(err) = self.store.increment(POST_VIEWS, post_id, VIEWS, 1).await {
            tracing::debug!(%post_id, error = %err, "view not recorded");
        }
    }

    /// Stored view count, or 0 when the counter is missing or unreadable.
    pub async fn get_view_count(&self, post_id: &DocumentId) -> u64 {
        match self.store.get(POST_VIEWS, post_id).await {
            Ok(Some(doc)) => doc
                .get_i64(VIEWS)
                .and_then(|n| u64::try_from(n).ok())
                .unwrap_or(0),
            Ok(None) => 0,
            Err(err) => {
                tracing::debug!(%post_id, error = %err, "view count unavailable");
                0
            }
        }
    }
}
