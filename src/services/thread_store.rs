use async_trait::async_trait;

use crate::domain::post::Post;
use crate::domain::trigger::ThreadId;
use crate::error::AppResult;

#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn list_posts(&self, thread: &ThreadId) -> AppResult<Vec<Post>>;
    async fn create_post(&self, thread: &ThreadId, body: &str) -> AppResult<Post>;
    async fn update_post(&self, thread: &ThreadId, post_id: u64, body: &str) -> AppResult<Post>;
}
