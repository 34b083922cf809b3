use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::trigger::ThreadId;
use crate::error::{AppError, AppResult};
use crate::services::ThreadStore;

/// Hidden tag identifying the report comment this tool owns.
pub const DEFAULT_MARKER: &str = "<!-- apidiff-action -->";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(u64),
    Updated(u64),
}

/// Keeps a single marked report comment per thread.
pub struct CommentReconciler {
    store: Arc<dyn ThreadStore>,
}

impl CommentReconciler {
    pub fn new(store: Arc<dyn ThreadStore>) -> Self {
        Self { store }
    }

    /// Publishes `body`, replacing an earlier marked post if there is one.
    /// Failures are logged and never returned.
    pub async fn upsert(&self, thread: &ThreadId, body: &str, marker: &str) {
        match self.try_upsert(thread, body, marker).await {
            Ok(UpsertOutcome::Created(id)) => info!(%thread, id, "created new comment"),
            Ok(UpsertOutcome::Updated(id)) => info!(%thread, id, "updated existing comment"),
            Err(err) => warn!(%thread, "{err}"),
        }
    }

    pub async fn try_upsert(
        &self,
        thread: &ThreadId,
        body: &str,
        marker: &str,
    ) -> AppResult<UpsertOutcome> {
        // A blank marker is contained in every body.
        if marker.trim().is_empty() {
            return Err(AppError::Reconciliation(
                "comment marker must not be blank".to_string(),
            ));
        }

        let payload = format!("{marker}\n{body}");
        let posts = self.store.list_posts(thread).await?;

        match posts.iter().find(|post| post.body.contains(marker)) {
            Some(existing) => {
                let post = self.store.update_post(thread, existing.id, &payload).await?;
                Ok(UpsertOutcome::Updated(post.id))
            }
            None => {
                let post = self.store.create_post(thread, &payload).await?;
                Ok(UpsertOutcome::Created(post.id))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::post::Post;

    /// Thread store backed by a vector; ids are assigned sequentially.
    #[derive(Default)]
    pub(crate) struct MemoryThreadStore {
        posts: Mutex<Vec<Post>>,
        fail: bool,
    }

    impl MemoryThreadStore {
        pub fn with_posts(posts: Vec<Post>) -> Self {
            Self {
                posts: Mutex::new(posts),
                fail: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                posts: Mutex::default(),
                fail: true,
            }
        }

        pub fn posts(&self) -> Vec<Post> {
            self.posts.lock().unwrap().clone()
        }

        fn check(&self) -> AppResult<()> {
            if self.fail {
                return Err(AppError::Reconciliation("thread store offline".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ThreadStore for MemoryThreadStore {
        async fn list_posts(&self, _thread: &ThreadId) -> AppResult<Vec<Post>> {
            self.check()?;
            Ok(self.posts())
        }

        async fn create_post(&self, _thread: &ThreadId, body: &str) -> AppResult<Post> {
            self.check()?;
            let mut posts = self.posts.lock().unwrap();
            let id = posts.iter().map(|p| p.id).max().unwrap_or(0) + 1;
            let post = Post {
                id,
                body: body.to_string(),
            };
            posts.push(post.clone());
            Ok(post)
        }

        async fn update_post(&self, _thread: &ThreadId, post_id: u64, body: &str) -> AppResult<Post> {
            self.check()?;
            let mut posts = self.posts.lock().unwrap();
            let post = posts
                .iter_mut()
                .find(|p| p.id == post_id)
                .ok_or_else(|| AppError::Reconciliation(format!("no comment {post_id}")))?;
            post.body = body.to_string();
            Ok(post.clone())
        }
    }

    pub(crate) fn thread() -> ThreadId {
        ThreadId {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            number: 12,
        }
    }

    fn post(id: u64, body: &str) -> Post {
        Post {
            id,
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn creates_marked_post_when_absent() {
        let store = Arc::new(MemoryThreadStore::with_posts(vec![post(1, "LGTM")]));
        let reconciler = CommentReconciler::new(store.clone());

        let outcome = reconciler
            .try_upsert(&thread(), "report", DEFAULT_MARKER)
            .await
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::Created(2));
        assert_eq!(
            store.posts()[1].body,
            format!("{DEFAULT_MARKER}\nreport")
        );
    }

    #[tokio::test]
    async fn repeated_upserts_leave_one_marked_post() {
        let store = Arc::new(MemoryThreadStore::default());
        let reconciler = CommentReconciler::new(store.clone());

        reconciler.upsert(&thread(), "first", DEFAULT_MARKER).await;
        reconciler.upsert(&thread(), "second", DEFAULT_MARKER).await;

        let marked: Vec<Post> = store
            .posts()
            .into_iter()
            .filter(|p| p.body.contains(DEFAULT_MARKER))
            .collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].body, format!("{DEFAULT_MARKER}\nsecond"));
    }

    #[tokio::test]
    async fn updates_existing_post_in_place() {
        let store = Arc::new(MemoryThreadStore::with_posts(vec![
            post(10, "first review"),
            post(11, &format!("{DEFAULT_MARKER}\nold report")),
            post(12, "later reply"),
        ]));
        let reconciler = CommentReconciler::new(store.clone());

        let outcome = reconciler
            .try_upsert(&thread(), "new report", DEFAULT_MARKER)
            .await
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::Updated(11));
        let posts = store.posts();
        let ids: Vec<u64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, [10, 11, 12]);
        assert_eq!(posts[1].body, format!("{DEFAULT_MARKER}\nnew report"));
    }

    #[tokio::test]
    async fn updates_only_first_marked_post() {
        let store = Arc::new(MemoryThreadStore::with_posts(vec![
            post(1, &format!("{DEFAULT_MARKER}\na")),
            post(2, &format!("{DEFAULT_MARKER}\nb")),
        ]));
        let reconciler = CommentReconciler::new(store.clone());

        reconciler.upsert(&thread(), "c", DEFAULT_MARKER).await;

        let posts = store.posts();
        assert_eq!(posts[0].body, format!("{DEFAULT_MARKER}\nc"));
        assert_eq!(posts[1].body, format!("{DEFAULT_MARKER}\nb"));
    }

    #[tokio::test]
    async fn custom_marker_ignores_default_marked_posts() {
        let store = Arc::new(MemoryThreadStore::with_posts(vec![post(
            1,
            &format!("{DEFAULT_MARKER}\nother tool"),
        )]));
        let reconciler = CommentReconciler::new(store.clone());

        let outcome = reconciler
            .try_upsert(&thread(), "mine", "<!-- apidiff-action:sub -->")
            .await
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::Created(2));
    }

    #[tokio::test]
    async fn store_failures_do_not_escape() {
        let store = Arc::new(MemoryThreadStore::failing());
        let reconciler = CommentReconciler::new(store.clone());

        reconciler.upsert(&thread(), "report", DEFAULT_MARKER).await;

        let err = reconciler
            .try_upsert(&thread(), "report", DEFAULT_MARKER)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Reconciliation(_)));
    }

    #[tokio::test]
    async fn blank_marker_leaves_existing_posts_alone() {
        let store = Arc::new(MemoryThreadStore::with_posts(vec![post(1, "human review comment")]));
        let reconciler = CommentReconciler::new(store.clone());

        for marker in ["", "  \n"] {
            let err = reconciler
                .try_upsert(&thread(), "report", marker)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Reconciliation(_)));
        }

        assert_eq!(store.posts(), vec![post(1, "human review comment")]);
    }
}
