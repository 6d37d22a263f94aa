use crate::domain::entities::PostRecord;
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

/// Batch lookup of full post records owned by the post service.
#[async_trait]
pub trait PostDirectory: Send + Sync {
    /// Fetch all `post_ids` in one request. Ids unknown to the post service
    /// are simply absent from the result; order is not guaranteed.
    async fn get_posts(&self, post_ids: &[i64]) -> ApiResult<Vec<PostRecord>>;
}
