//! Filtered reads, search, comment threads and the batch comment purge.
//!
//! Results come back in whatever order the backend produced. The batch purge
//! and [`Blog::list_posts_with_views`] are the only calls that fan out.

use std::collections::{HashMap, HashSet};

use futures::future::join_all;
use shikyou_store::collections::{COMMENTS, POSTS};
use shikyou_store::{DocumentStore, Filter};
use shikyou_types::{Comment, DocumentId, Post, Session, WalletAddress};

use crate::blog::Blog;
use crate::codec::{decode_comment, decode_post, AUTHOR, CATEGORY, POST_ID};
use crate::error::{BlogError, BlogResult};

/// A top-level comment and its direct replies, both oldest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// A post paired with its view count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostWithViews {
    pub post: Post,
    pub views: u64,
}

impl<S: DocumentStore> Blog<S> {
    /// All posts, or only those whose category equals `category` exactly
    /// (case-sensitive).
    pub async fn list_posts(&self, category: Option<&str>) -> BlogResult<Vec<Post>> {
        let filter = category.map(|c| Filter::eq(CATEGORY, c));
        self.posts_where(filter.as_ref()).await
    }

    pub async fn list_posts_by_author(&self, author: &WalletAddress) -> BlogResult<Vec<Post>> {
        self.posts_where(Some(&Filter::eq(AUTHOR, author.as_str())))
            .await
    }

    /// Posts written by the session's wallet.
    pub async fn my_posts(&self, session: &Session) -> BlogResult<Vec<Post>> {
        self.list_posts_by_author(&session.address).await
    }

    /// The post with this id, or `None` if there is none.
    pub async fn get_post(&self, id: &DocumentId) -> BlogResult<Option<Post>> {
        let doc = self
            .store
            .get(POSTS, id)
            .await
            .map_err(BlogError::StoreRead)?;
        doc.map(decode_post).transpose().map_err(BlogError::StoreRead)
    }

    pub async fn list_comments(&self, post_id: &DocumentId) -> BlogResult<Vec<Comment>> {
        self.comments_where(&Filter::eq(POST_ID, post_id.as_str()))
            .await
    }

    pub async fn list_comments_by_author(
        &self,
        author: &WalletAddress,
    ) -> BlogResult<Vec<Comment>> {
        self.comments_where(&Filter::eq(AUTHOR, author.as_str()))
            .await
    }

    /// Comments written by the session's wallet.
    pub async fn my_comments(&self, session: &Session) -> BlogResult<Vec<Comment>> {
        self.list_comments_by_author(&session.address).await
    }

    pub async fn count_comments(&self, post_id: &DocumentId) -> BlogResult<usize> {
        Ok(self.list_comments(post_id).await?.len())
    }

    /// Posts whose title or content contains `term`, ignoring case.
    ///
    /// Fetches the whole collection and filters locally: cost is linear in
    /// the number of posts on every call. No ranking is applied. An empty
    /// term matches everything.
    pub async fn search_posts(&self, term: &str) -> BlogResult<Vec<Post>> {
        let needle = term.to_lowercase();
        let posts = self.list_posts(None).await?;
        let total = posts.len();
        let hits: Vec<Post> = posts
            .into_iter()
            .filter(|p| matches_term(p, &needle))
            .collect();
        tracing::debug!(scanned = total, hits = hits.len(), "post search");
        Ok(hits)
    }

    /// Delete every comment of a post and return how many were deleted.
    ///
    /// All deletes are issued at once and awaited together. If any of them
    /// fails the call fails with the first error, after the others have
    /// settled; the comments already deleted stay deleted.
    pub async fn delete_all_comments_for_post(&self, post_id: &DocumentId) -> BlogResult<usize> {
        let filter = Filter::eq(POST_ID, post_id.as_str());
        let docs = self
            .store
            .query(COMMENTS, Some(&filter))
            .await
            .map_err(BlogError::StoreRead)?;

        let results = join_all(docs.iter().map(|d| self.store.delete(COMMENTS, &d.id))).await;
        let total = results.len();
        let mut errors = results.into_iter().filter_map(Result::err);
        if let Some(first) = errors.next() {
            let failed = 1 + errors.count();
            tracing::warn!(
                %post_id,
                deleted = total - failed,
                failed,
                "comment purge partially failed"
            );
            return Err(BlogError::StoreWrite(first));
        }
        tracing::debug!(%post_id, deleted = total, "comments purged");
        Ok(total)
    }

    /// A post's comments grouped into top-level comments and their replies.
    ///
    /// Replies to replies join the thread of their top-level ancestor. A
    /// reply whose parent is not among the post's comments is shown as a
    /// top-level comment. Threads and replies are ordered by timestamp, then
    /// id.
    pub async fn list_comment_threads(&self, post_id: &DocumentId) -> BlogResult<Vec<CommentThread>> {
        Ok(build_threads(self.list_comments(post_id).await?))
    }

    /// Posts with their view counts, fetched concurrently.
    ///
    /// Unreadable counters count as 0, as in [`Blog::get_view_count`].
    pub async fn list_posts_with_views(
        &self,
        category: Option<&str>,
    ) -> BlogResult<Vec<PostWithViews>> {
        let posts = self.list_posts(category).await?;
        let views = join_all(posts.iter().map(|p| self.get_view_count(&p.id))).await;
        Ok(posts
            .into_iter()
            .zip(views)
            .map(|(post, views)| PostWithViews { post, views })
            .collect())
    }

    async fn posts_where(&self, filter: Option<&Filter>) -> BlogResult<Vec<Post>> {
        let docs = self
            .store
            .query(POSTS, filter)
            .await
            .map_err(BlogError::StoreRead)?;
        docs.into_iter()
            .map(decode_post)
            .collect::<Result<_, _>>()
            .map_err(BlogError::StoreRead)
    }

    async fn comments_where(&self, filter: &Filter) -> BlogResult<Vec<Comment>> {
        let docs = self
            .store
            .query(COMMENTS, Some(filter))
            .await
            .map_err(BlogError::StoreRead)?;
        docs.into_iter()
            .map(decode_comment)
            .collect::<Result<_, _>>()
            .map_err(BlogError::StoreRead)
    }
}

/// `needle` must already be lowercase.
fn matches_term(post: &Post, needle: &str) -> bool {
    post.title.to_lowercase().contains(needle) || post.content.to_lowercase().contains(needle)
}

fn build_threads(mut comments: Vec<Comment>) -> Vec<CommentThread> {
    comments.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

    let parents: HashMap<DocumentId, Option<DocumentId>> = comments
        .iter()
        .map(|c| (c.id.clone(), c.parent_comment_id.clone()))
        .collect();

    // Walk up parent links until a comment with no known parent.
    let root_of = |id: &DocumentId| -> DocumentId {
        let mut current = id.clone();
        let mut seen = HashSet::new();
        while let Some(Some(parent)) = parents.get(&current) {
            if !parents.contains_key(parent) || !seen.insert(current.clone()) {
                break;
            }
            current = parent.clone();
        }
        current
    };

    let mut threads: Vec<CommentThread> = Vec::new();
    let mut index: HashMap<DocumentId, usize> = HashMap::new();
    let mut replies: Vec<(DocumentId, Comment)> = Vec::new();

    for comment in comments {
        let root = root_of(&comment.id);
        if root == comment.id {
            index.insert(comment.id.clone(), threads.len());
            threads.push(CommentThread {
                comment,
                replies: Vec::new(),
            });
        } else {
            replies.push((root, comment));
        }
    }

    for (root, reply) in replies {
        match index.get(&root) {
            Some(&i) => threads[i].replies.push(reply),
            None => threads.push(CommentThread {
                comment: reply,
                replies: Vec::new(),
            }),
        }
    }
    threads.sort_by(|a, b| {
        a.comment
            .timestamp
            .cmp(&b.comment.timestamp)
            .then_with(|| a.comment.id.cmp(&b.comment.id))
    });
    threads
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::atomic::Ordering;

    use proptest::prelude::*;
    use shikyou_types::{ContentRef, NewComment, NewPost, Timestamp};

    use crate::testing::*;

    use super::*;

    fn post(title: &str, content: &str, author: &str, category: &str) -> NewPost {
        NewPost::new(
            title,
            content,
            WalletAddress::new(author),
            ContentRef::digest(content.as_bytes()),
            category,
        )
    }

    fn comment(post_id: &DocumentId, author: &str, at: i64) -> NewComment {
        NewComment::new(
            post_id.clone(),
            ContentRef::new(format!("bafy-{at}")),
            WalletAddress::new(author),
            Timestamp::from_millis(at),
        )
    }

    fn ids<'a>(posts: impl IntoIterator<Item = &'a Post>) -> BTreeSet<DocumentId> {
        posts.into_iter().map(|p| p.id.clone()).collect()
    }

    // -----------------------------------------------------------------------
    // Posts
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn list_posts_by_category_is_exact_subset() {
        let (blog, _) = memory_blog();
        let nft1 = blog.create_post(post("a", "x", ALICE, "NFT")).await.unwrap();
        let nft2 = blog.create_post(post("b", "x", BOB, "NFT")).await.unwrap();
        blog.create_post(post("c", "x", ALICE, "nft")).await.unwrap();
        blog.create_post(post("d", "x", ALICE, "DeFi")).await.unwrap();

        let nft = blog.list_posts(Some("NFT")).await.unwrap();
        assert_eq!(ids(&nft), BTreeSet::from([nft1, nft2]));

        let all = blog.list_posts(None).await.unwrap();
        assert_eq!(all.len(), 4);
        assert!(blog.list_posts(Some("Gaming")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_posts_by_author_and_session() {
        let (blog, _) = memory_blog();
        let mine = blog.create_post(post("a", "x", ALICE, "Web3")).await.unwrap();
        blog.create_post(post("b", "x", BOB, "Web3")).await.unwrap();

        let by_alice = blog
            .list_posts_by_author(&WalletAddress::new(ALICE))
            .await
            .unwrap();
        assert_eq!(ids(&by_alice), BTreeSet::from([mine.clone()]));

        let session = Session::new(WalletAddress::new(ALICE));
        assert_eq!(ids(&blog.my_posts(&session).await.unwrap()), BTreeSet::from([mine]));
    }

    #[tokio::test]
    async fn get_missing_post_is_none() {
        let (blog, _) = memory_blog();
        assert!(blog.get_post(&DocumentId::new("missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_failures_surface_as_read_errors() {
        let blog = flaky_blog();
        blog.store().fail_reads.store(true, Ordering::SeqCst);
        assert!(blog.get_post(&DocumentId::new("x")).await.unwrap_err().is_read());
        assert!(blog.list_posts(None).await.unwrap_err().is_read());
        assert!(blog.search_posts("x").await.unwrap_err().is_read());
    }

    #[tokio::test]
    async fn undecodable_document_is_a_read_error() {
        let (blog, _) = memory_blog();
        let junk = serde_json::json!({ "title": 42 }).as_object().cloned().unwrap();
        let id = blog.store().add(POSTS, junk).await.unwrap();
        let err = blog.get_post(&id).await.unwrap_err();
        assert!(err.is_read());
    }

    #[tokio::test]
    async fn posts_without_timestamps_are_listed_and_searchable() {
        let (blog, _) = memory_blog();
        let current = blog
            .create_post(post("Current", "fresh", ALICE, "Web3"))
            .await
            .unwrap();
        let legacy = serde_json::json!({
            "title": "Legacy Web3 Notes",
            "content": "written before timestamps",
            "author": ALICE,
            "cid": "bafy-legacy",
            "category": "Web3",
        });
        let legacy = blog
            .store()
            .add(POSTS, legacy.as_object().cloned().unwrap())
            .await
            .unwrap();

        let all: BTreeSet<_> = blog
            .list_posts(None)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(all, BTreeSet::from([current.clone(), legacy.clone()]));

        let by_author = blog
            .list_posts_by_author(&WalletAddress::new(ALICE))
            .await
            .unwrap();
        assert_eq!(by_author.len(), 2);

        let hits = blog.search_posts("legacy").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, legacy);
        assert_eq!(hits[0].created_at, Timestamp::default());
        assert_eq!(hits[0].updated_at, hits[0].created_at);
    }

    #[tokio::test]
    async fn missing_updated_at_reads_as_created_at() {
        let (blog, _) = memory_blog();
        let doc = serde_json::json!({
            "title": "t",
            "content": "c",
            "author": BOB,
            "cid": "bafy",
            "category": "NFT",
            "createdAt": 1_650_000_000_000_i64,
        });
        let id = blog
            .store()
            .add(POSTS, doc.as_object().cloned().unwrap())
            .await
            .unwrap();
        let post = blog.get_post(&id).await.unwrap().unwrap();
        assert_eq!(post.updated_at, Timestamp::from_millis(1_650_000_000_000));
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn search_is_case_insensitive_over_title_and_content() {
        let (blog, _) = memory_blog();
        let t = blog
            .create_post(post("Getting Started with WEB3", "intro", ALICE, "Web3"))
            .await
            .unwrap();
        let c = blog
            .create_post(post("DeFi basics", "built on web3 rails", BOB, "DeFi"))
            .await
            .unwrap();
        blog.create_post(post("Rust tips", "ownership", BOB, "Tech"))
            .await
            .unwrap();
        // Category alone does not match.
        blog.create_post(post("NFT art", "jpegs", ALICE, "Web3"))
            .await
            .unwrap();

        let hits = blog.search_posts("web3").await.unwrap();
        assert_eq!(ids(&hits), BTreeSet::from([t, c]));
    }

    #[tokio::test]
    async fn empty_term_matches_everything() {
        let (blog, _) = memory_blog();
        blog.create_post(post("a", "b", ALICE, "x")).await.unwrap();
        blog.create_post(post("c", "d", ALICE, "x")).await.unwrap();
        assert_eq!(blog.search_posts("").await.unwrap().len(), 2);
    }

    // -----------------------------------------------------------------------
    // Comments
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn list_comments_by_post_and_author() {
        let (blog, _) = memory_blog();
        let p1 = blog.create_post(post("a", "x", ALICE, "Web3")).await.unwrap();
        let p2 = blog.create_post(post("b", "x", ALICE, "Web3")).await.unwrap();
        blog.create_comment(comment(&p1, BOB, 1)).await.unwrap();
        blog.create_comment(comment(&p1, ALICE, 2)).await.unwrap();
        blog.create_comment(comment(&p2, BOB, 3)).await.unwrap();

        assert_eq!(blog.list_comments(&p1).await.unwrap().len(), 2);
        assert_eq!(blog.count_comments(&p2).await.unwrap(), 1);

        let bobs = blog
            .list_comments_by_author(&WalletAddress::new(BOB))
            .await
            .unwrap();
        assert_eq!(bobs.len(), 2);
        assert!(bobs.iter().all(|c| c.author.as_str() == BOB));

        let session = Session::new(WalletAddress::new(ALICE));
        assert_eq!(blog.my_comments(&session).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn purge_empties_comments_for_zero_one_and_many() {
        for n in [0usize, 1, 7] {
            let (blog, _) = memory_blog();
            let target = blog.create_post(post("a", "x", ALICE, "Web3")).await.unwrap();
            let other = blog.create_post(post("b", "x", ALICE, "Web3")).await.unwrap();
            for i in 0..n {
                blog.create_comment(comment(&target, BOB, i as i64)).await.unwrap();
            }
            blog.create_comment(comment(&other, BOB, 100)).await.unwrap();

            let deleted = blog.delete_all_comments_for_post(&target).await.unwrap();
            assert_eq!(deleted, n);
            assert!(blog.list_comments(&target).await.unwrap().is_empty());
            assert_eq!(blog.list_comments(&other).await.unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn purge_partial_failure_keeps_successful_deletes() {
        let blog = flaky_blog();
        let p = blog.create_post(post("a", "x", ALICE, "Web3")).await.unwrap();
        let mut created = Vec::new();
        for i in 0..5 {
            created.push(blog.create_comment(comment(&p, BOB, i)).await.unwrap());
        }
        blog.store()
            .fail_deletes_of
            .lock()
            .unwrap()
            .insert(created[2].clone());

        let err = blog.delete_all_comments_for_post(&p).await.unwrap_err();
        assert!(err.is_write());
        // Every delete was attempted, not just those before the failure.
        assert_eq!(blog.store().delete_calls.load(Ordering::SeqCst), 5);

        let left = blog.list_comments(&p).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, created[2]);
    }

    #[tokio::test]
    async fn threads_group_replies_under_their_root() {
        let (blog, _) = memory_blog();
        let p = blog.create_post(post("a", "x", ALICE, "Web3")).await.unwrap();
        let first = blog.create_comment(comment(&p, BOB, 10)).await.unwrap();
        let second = blog.create_comment(comment(&p, ALICE, 20)).await.unwrap();
        let reply = blog
            .create_comment(comment(&p, ALICE, 30).reply_to(first.clone()))
            .await
            .unwrap();
        let nested = blog
            .create_comment(comment(&p, BOB, 40).reply_to(reply.clone()))
            .await
            .unwrap();
        let orphan = blog
            .create_comment(comment(&p, BOB, 15).reply_to(DocumentId::new("deleted")))
            .await
            .unwrap();

        let threads = blog.list_comment_threads(&p).await.unwrap();
        let roots: Vec<_> = threads.iter().map(|t| t.comment.id.clone()).collect();
        assert_eq!(roots, vec![first.clone(), orphan, second]);

        let replies: Vec<_> = threads[0].replies.iter().map(|c| c.id.clone()).collect();
        assert_eq!(replies, vec![reply, nested]);
        assert!(threads[1].replies.is_empty());
    }

    #[test]
    fn threads_survive_parent_cycles() {
        let mk = |id: &str, parent: &str, at: i64| Comment {
            id: DocumentId::new(id),
            post_id: DocumentId::new("p"),
            comment_cid: ContentRef::new("c"),
            author: WalletAddress::new(BOB),
            timestamp: Timestamp::from_millis(at),
            parent_comment_id: Some(DocumentId::new(parent)),
        };
        let top = Comment {
            parent_comment_id: None,
            ..mk("x", "", 3)
        };
        let threads = build_threads(vec![top, mk("a", "b", 2), mk("b", "a", 1)]);
        let total: usize = threads.iter().map(|t| 1 + t.replies.len()).sum();
        assert_eq!(total, 3);

        let order: Vec<&str> = threads.iter().map(|t| t.comment.id.as_str()).collect();
        let mut sorted = threads
            .iter()
            .map(|t| (t.comment.timestamp, t.comment.id.as_str()))
            .collect::<Vec<_>>();
        sorted.sort();
        assert_eq!(order, sorted.iter().map(|(_, id)| *id).collect::<Vec<_>>());
        assert_eq!(order.last(), Some(&"x"));
    }

    // -----------------------------------------------------------------------
    // Views fan-out
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn posts_with_views_pairs_counts() {
        let (blog, _) = memory_blog();
        let a = blog.create_post(post("a", "x", ALICE, "NFT")).await.unwrap();
        let b = blog.create_post(post("b", "x", ALICE, "NFT")).await.unwrap();
        blog.create_post(post("c", "x", ALICE, "DeFi")).await.unwrap();
        for _ in 0..3 {
            blog.record_view(&a).await;
        }

        let listed = blog.list_posts_with_views(Some("NFT")).await.unwrap();
        let counts: HashMap<_, _> = listed.iter().map(|p| (p.post.id.clone(), p.views)).collect();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[&a], 3);
        assert_eq!(counts[&b], 0);
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime")
    }

    proptest! {
        #[test]
        fn category_filter_returns_exactly_matching_posts(
            categories in prop::collection::vec(
                prop::sample::select(vec!["NFT", "nft", "DeFi", "Web3", "NFT "]),
                0..12,
            ),
        ) {
            let (all, nft, expected) = runtime().block_on(async {
                let (blog, _) = memory_blog();
                let mut expected = BTreeSet::new();
                for (i, cat) in categories.iter().enumerate() {
                    let id = blog
                        .create_post(post(&format!("t{i}"), "x", ALICE, cat))
                        .await
                        .unwrap();
                    if *cat == "NFT" {
                        expected.insert(id);
                    }
                }
                let all = blog.list_posts(None).await.unwrap();
                let nft = blog.list_posts(Some("NFT")).await.unwrap();
                (all, nft, expected)
            });
            prop_assert_eq!(all.len(), categories.len());
            prop_assert_eq!(ids(&nft), expected);
        }

        #[test]
        fn search_returns_exactly_case_insensitive_matches(
            entries in prop::collection::vec(
                (
                    prop::sample::select(vec!["Web3 intro", "WEB3", "hello", "a weB3 story", "Rust", ""]),
                    prop::sample::select(vec!["about web3", "nothing", "W e b 3", "WEB3!", ""]),
                ),
                0..10,
            ),
        ) {
            let (hits, expected) = runtime().block_on(async {
                let (blog, _) = memory_blog();
                let mut expected = BTreeSet::new();
                for (title, content) in &entries {
                    let id = blog
                        .create_post(post(title, content, BOB, "Web3"))
                        .await
                        .unwrap();
                    if title.to_lowercase().contains("web3") || content.to_lowercase().contains("web3") {
                        expected.insert(id);
                    }
                }
                (blog.search_posts("web3").await.unwrap(), expected)
            });
            prop_assert_eq!(ids(&hits), expected);
        }
    }
}
