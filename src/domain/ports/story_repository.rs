use crate::domain::entities::Story;
use crate::infrastructure::http::middleware::error::ApiResult;

/// Repository for story rows
#[async_trait::async_trait]
pub trait StoryRepository: Send + Sync {
    async fn create_story(&self, id: i64) -> ApiResult<Story>;

    async fn get_story_by_id(&self, id: i64) -> ApiResult<Option<Story>>;

    /// Delete a story. Returns `false` when no row matched.
    async fn delete_story(&self, id: i64) -> ApiResult<bool>;
}
