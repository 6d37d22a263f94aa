use crate::domain::entities::{Hashtag, TaggingOutcome};
use crate::infrastructure::http::middleware::error::ApiResult;

/// Repository for hashtags and their post links
#[async_trait::async_trait]
pub trait HashtagRepository: Send + Sync {
    /// Link a post to every name in `names` inside one transaction.
    ///
    /// Missing hashtags are created, existing links are left alone, and each
    /// newly created link increments its hashtag's `post_count` exactly once.
    /// Any failure rolls the whole call back.
    async fn attach_hashtags(&self, post_id: i64, names: &[String]) -> ApiResult<TaggingOutcome>;

    /// Get hashtag by exact (case-sensitive) name
    async fn get_hashtag_by_name(&self, name: &str) -> ApiResult<Option<Hashtag>>;

    /// Hashtags ordered by post count, highest first
    async fn get_trending_hashtags(&self, limit: i64) -> ApiResult<Vec<Hashtag>>;

    /// Post ids linked to a hashtag, most recently linked first
    async fn get_post_ids_for_hashtag(
        &self,
        hashtag_id: i64,
        limit: i64,
        offset: i64,
    ) -> ApiResult<Vec<i64>>;
}
